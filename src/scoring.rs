use serde::{Deserialize, Serialize};

pub const POINTS_PER_CELL: u32 = 250;
pub const BONUS_PER_CELL: u32 = 100;

/// Point values used to score a finished trial
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoring {
    pub points_per_cell: u32,
    pub bonus_per_cell: u32,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            points_per_cell: POINTS_PER_CELL,
            bonus_per_cell: BONUS_PER_CELL,
        }
    }
}

impl Scoring {
    /// Points for every correct cell, plus a per-cell bonus only when the
    /// whole pattern was found without a single wrong pick.
    ///
    /// Point values come from the config file unchecked, so the result
    /// saturates at `u32::MAX` instead of overflowing.
    pub fn trial_score(&self, correct: usize, mistakes: usize, target_size: usize) -> u32 {
        let base = per_cell(correct, self.points_per_cell);
        if self.is_perfect(correct, mistakes, target_size) {
            base.saturating_add(per_cell(target_size, self.bonus_per_cell))
        } else {
            base
        }
    }

    pub fn is_perfect(&self, correct: usize, mistakes: usize, target_size: usize) -> bool {
        mistakes == 0 && correct == target_size
    }
}

fn per_cell(cells: usize, points: u32) -> u32 {
    u32::try_from(cells)
        .unwrap_or(u32::MAX)
        .saturating_mul(points)
}
