use tracing::debug;

use crate::grid::{GridProgression, GridSpec};

pub const MIN_TARGET: usize = 3;
pub const BOOTSTRAP_TARGET: usize = 3;
pub const CARRY_OVER_DROP: usize = 3;

/// Difficulty for the next trial, as decided after the previous one
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifficultyStep {
    pub grid_level: usize,
    pub target_size: usize,
    pub grid_changed: bool,
}

/// Adapts grid size and target size from the number of wrong picks
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DifficultyController {
    progression: GridProgression,
    min_target: usize,
    bootstrap_target: usize,
    carry_over_drop: usize,
}

impl DifficultyController {
    /// `min_target` must fit the first grid of the progression; `GameSettings`
    /// validates that before a controller is built from configuration.
    pub fn new(
        progression: GridProgression,
        min_target: usize,
        bootstrap_target: usize,
        carry_over_drop: usize,
    ) -> Self {
        Self {
            progression,
            min_target,
            bootstrap_target,
            carry_over_drop,
        }
    }

    pub fn progression(&self) -> &GridProgression {
        &self.progression
    }

    pub fn grid(&self, level: usize) -> GridSpec {
        self.progression.grid(level)
    }

    pub fn min_target(&self) -> usize {
        self.min_target
    }

    /// Decide the next trial's difficulty from the last trial's mistakes.
    ///
    /// A clean trial grows the grid, two or more mistakes shrink it. When the
    /// grid changes the target re-baselines to the new grid's shorter side
    /// plus one; otherwise it moves by one in the same direction. A single
    /// mistake holds both.
    pub fn advance(&self, grid_level: usize, target_size: usize, mistakes: usize) -> DifficultyStep {
        let max_level = self.progression.max_level();

        let (next_level, grid_changed) = if mistakes == 0 && grid_level < max_level {
            (grid_level + 1, true)
        } else if mistakes >= 2 && grid_level > 0 {
            (grid_level - 1, true)
        } else {
            (grid_level.min(max_level), false)
        };

        let grid = self.progression.grid(next_level);
        let next_target = if grid_changed {
            grid.shorter_side() + 1
        } else {
            match mistakes {
                0 => target_size + 1,
                1 => target_size,
                _ => target_size.saturating_sub(1),
            }
        };

        let step = DifficultyStep {
            grid_level: next_level,
            target_size: self.clamp_target(next_target, grid),
            grid_changed,
        };
        debug!(
            mistakes,
            from_level = grid_level,
            from_target = target_size,
            to_level = step.grid_level,
            to_target = step.target_size,
            grid_changed,
            "difficulty step"
        );
        step
    }

    /// Opening target size for a new session given the last finished one
    pub fn opening_target(&self, last_session_target: Option<usize>) -> usize {
        match last_session_target {
            Some(last) => self
                .min_target
                .max(last.saturating_sub(self.carry_over_drop)),
            None => self.bootstrap_target,
        }
    }

    pub fn clamp_target(&self, target_size: usize, grid: GridSpec) -> usize {
        target_size.max(self.min_target).min(grid.cells())
    }
}

impl Default for DifficultyController {
    fn default() -> Self {
        Self::new(
            GridProgression::default(),
            MIN_TARGET,
            BOOTSTRAP_TARGET,
            CARRY_OVER_DROP,
        )
    }
}
