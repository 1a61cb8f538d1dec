use std::collections::BTreeSet;

use crate::grid::GridSpec;
use crate::pattern::Pattern;

/// Timed stage of a running trial
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Stage {
    #[strum(serialize = "get-ready")]
    GetReady,
    #[strum(serialize = "showing")]
    Showing,
    #[strum(serialize = "waiting")]
    Waiting,
    #[strum(serialize = "feedback")]
    Feedback,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// How-to-play screen before a session starts
    Instructions,
    Running(Stage),
    /// `suspended` is the stage to return to; `help` is the how-to-play
    /// overlay opened from the pause menu.
    Paused {
        suspended: Option<Stage>,
        help: bool,
    },
    Finished,
}

impl Phase {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Phase::Running(stage) => Some(*stage),
            _ => None,
        }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Phase::Paused { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Instructions => "instructions",
            Phase::Running(Stage::GetReady) => "get-ready",
            Phase::Running(Stage::Showing) => "showing",
            Phase::Running(Stage::Waiting) => "waiting",
            Phase::Running(Stage::Feedback) => "feedback",
            Phase::Paused { help: true, .. } => "help",
            Phase::Paused { .. } => "paused",
            Phase::Finished => "finished",
        }
    }
}

/// Outcome of a cell pick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pick {
    Correct,
    Incorrect,
    /// Wrong phase, cell already resolved, or off the board
    Ignored,
}

/// One round of memorize-and-recall
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrialRecord {
    pub trial_number: u32,
    pub grid: GridSpec,
    pub target_size: usize,
    pub pattern: Pattern,
    pub correct: BTreeSet<usize>,
    pub incorrect: BTreeSet<usize>,
    /// Set once feedback is computed; the record is frozen from then on
    pub score: Option<u32>,
}

impl TrialRecord {
    pub fn new(trial_number: u32, grid: GridSpec, pattern: Pattern) -> Self {
        Self {
            trial_number,
            grid,
            target_size: pattern.len(),
            pattern,
            correct: BTreeSet::new(),
            incorrect: BTreeSet::new(),
            score: None,
        }
    }

    pub fn resolved(&self) -> usize {
        self.correct.len() + self.incorrect.len()
    }

    pub fn remaining_picks(&self) -> usize {
        self.target_size.saturating_sub(self.resolved())
    }

    pub fn mistakes(&self) -> usize {
        self.incorrect.len()
    }

    pub fn is_resolved(&self, index: usize) -> bool {
        self.correct.contains(&index) || self.incorrect.contains(&index)
    }

    pub fn is_complete(&self) -> bool {
        self.resolved() >= self.target_size
    }

    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }

    /// Classify a pick. Resolved cells and picks after scoring are ignored.
    pub fn pick(&mut self, index: usize) -> Pick {
        if self.is_scored() || index >= self.grid.cells() || self.is_resolved(index) {
            return Pick::Ignored;
        }

        if self.pattern.contains(index) {
            self.correct.insert(index);
            Pick::Correct
        } else {
            self.incorrect.insert(index);
            Pick::Incorrect
        }
    }

    pub fn clear_selections(&mut self) {
        self.correct.clear();
        self.incorrect.clear();
    }
}

/// Everything about the live session, owned by the game
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub phase: Phase,
    pub score: u32,
    pub trial_number: u32,
    pub grid_level: usize,
    pub target_size: usize,
    pub countdown: u32,
    pub current_trial: Option<TrialRecord>,
    /// Bumped on every start, restart and quit; timers carry it
    pub session_id: u64,
}

impl SessionState {
    pub fn idle(session_id: u64, target_size: usize) -> Self {
        Self {
            phase: Phase::Instructions,
            score: 0,
            trial_number: 0,
            grid_level: 0,
            target_size,
            countdown: 0,
            current_trial: None,
            session_id,
        }
    }

    /// True between `start` and `quit`, including a finished session
    pub fn in_session(&self) -> bool {
        self.current_trial.is_some()
    }
}
