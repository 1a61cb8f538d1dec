use std::time::Duration;

use crate::clock::{ClockEvent, TrialClock};
use crate::grid::GridSpec;
use crate::session::{Phase, SessionState, Stage};
use crate::settings::GameSettings;

/// How a cell should be drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum CellMark {
    #[strum(serialize = "idle")]
    Idle,
    #[strum(serialize = "shown")]
    Shown,
    #[strum(serialize = "correct")]
    Correct,
    #[strum(serialize = "incorrect")]
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellView {
    pub in_pattern: bool,
    pub mark: CellMark,
}

/// Read-only view of a session, enough to draw every screen of the game
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub phase: Phase,
    pub score: u32,
    pub trial_number: u32,
    pub total_trials: u32,
    pub grid: GridSpec,
    pub target_size: usize,
    pub countdown: u32,
    pub remaining_picks: usize,
    /// Time left to memorize the pattern, only while it is shown
    pub display_left: Option<Duration>,
    pub cells: Vec<CellView>,
}

impl Snapshot {
    pub fn capture(state: &SessionState, settings: &GameSettings, clock: &TrialClock) -> Self {
        let grid = state
            .current_trial
            .as_ref()
            .map_or_else(|| settings.difficulty.grid(state.grid_level), |t| t.grid);

        let cells = match state.current_trial.as_ref() {
            Some(trial) => (0..grid.cells())
                .map(|index| {
                    let in_pattern = trial.pattern.contains(index);
                    let mark = cell_mark(
                        state.phase,
                        in_pattern,
                        trial.correct.contains(&index),
                        trial.incorrect.contains(&index),
                    );
                    CellView { in_pattern, mark }
                })
                .collect(),
            None => vec![
                CellView {
                    in_pattern: false,
                    mark: CellMark::Idle,
                };
                grid.cells()
            ],
        };

        Self {
            phase: state.phase,
            score: state.score,
            trial_number: state.trial_number,
            total_trials: settings.total_trials,
            grid,
            target_size: state.target_size,
            countdown: state.countdown,
            remaining_picks: state
                .current_trial
                .as_ref()
                .map_or(0, |t| t.remaining_picks()),
            display_left: match state.phase {
                Phase::Running(Stage::Showing) => clock.remaining(ClockEvent::DisplayElapsed),
                _ => None,
            },
            cells,
        }
    }
}

fn cell_mark(phase: Phase, in_pattern: bool, correct: bool, incorrect: bool) -> CellMark {
    match phase {
        Phase::Running(Stage::Showing) if in_pattern => CellMark::Shown,
        Phase::Running(Stage::GetReady | Stage::Waiting) | Phase::Paused { .. } => {
            if correct {
                CellMark::Correct
            } else if incorrect {
                CellMark::Incorrect
            } else {
                CellMark::Idle
            }
        }
        // the answer is revealed during feedback
        Phase::Running(Stage::Feedback) if in_pattern => CellMark::Correct,
        Phase::Running(Stage::Feedback) if incorrect => CellMark::Incorrect,
        _ => CellMark::Idle,
    }
}
