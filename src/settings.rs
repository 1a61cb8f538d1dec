use std::time::Duration;

use crate::difficulty::{DifficultyController, BOOTSTRAP_TARGET, CARRY_OVER_DROP, MIN_TARGET};
use crate::error::ConfigError;
use crate::grid::GridProgression;
use crate::scoring::Scoring;

pub const TOTAL_TRIALS: u32 = 12;
pub const COUNTDOWN_TICKS: u32 = 3;
pub const COUNTDOWN_TICK_MS: u64 = 1000;
pub const SHOW_DURATION_MS: u64 = 1500;
pub const FEEDBACK_DELAY_MS: u64 = 2000;

/// Phase durations of a trial
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Countdown value each trial starts from
    pub countdown_ticks: u32,
    pub countdown_tick: Duration,
    pub display: Duration,
    pub feedback: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            countdown_ticks: COUNTDOWN_TICKS,
            countdown_tick: Duration::from_millis(COUNTDOWN_TICK_MS),
            display: Duration::from_millis(SHOW_DURATION_MS),
            feedback: Duration::from_millis(FEEDBACK_DELAY_MS),
        }
    }
}

/// Validated rules for a game, built from [`crate::config::Config`] or by hand
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSettings {
    pub difficulty: DifficultyController,
    pub scoring: Scoring,
    pub timing: Timing,
    pub total_trials: u32,
}

impl GameSettings {
    pub fn new(
        progression: GridProgression,
        min_target: usize,
        bootstrap_target: usize,
        carry_over_drop: usize,
        scoring: Scoring,
        timing: Timing,
        total_trials: u32,
    ) -> Result<Self, ConfigError> {
        if total_trials == 0 {
            return Err(ConfigError::NoTrials);
        }
        if timing.countdown_ticks == 0 {
            return Err(ConfigError::NoCountdown);
        }
        if min_target == 0 {
            return Err(ConfigError::ZeroMinTarget);
        }
        let cells = progression.first().cells();
        if min_target > cells {
            return Err(ConfigError::MinTargetTooLarge { min_target, cells });
        }

        Ok(Self {
            difficulty: DifficultyController::new(
                progression,
                min_target,
                bootstrap_target,
                carry_over_drop,
            ),
            scoring,
            timing,
            total_trials,
        })
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyController::new(
                GridProgression::default(),
                MIN_TARGET,
                BOOTSTRAP_TARGET,
                CARRY_OVER_DROP,
            ),
            scoring: Scoring::default(),
            timing: Timing::default(),
            total_trials: TOTAL_TRIALS,
        }
    }
}
