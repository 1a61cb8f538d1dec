use std::collections::BTreeSet;

use rand::Rng;

use crate::grid::GridSpec;

/// Cells the player has to memorize for one trial
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    cells: BTreeSet<usize>,
}

impl Pattern {
    pub fn contains(&self, index: usize) -> bool {
        self.cells.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell indices in ascending order
    pub fn cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells.iter().copied()
    }
}

impl FromIterator<usize> for Pattern {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// Pick `target_size` distinct cells of `grid`, uniformly at random.
///
/// The difficulty controller clamps every target size to the grid before a
/// pattern is requested, so an oversized request is a bug in the caller and
/// panics instead of being trimmed.
pub fn generate<R: Rng + ?Sized>(target_size: usize, grid: GridSpec, rng: &mut R) -> Pattern {
    let cells = grid.cells();
    assert!(
        target_size > 0 && target_size <= cells,
        "pattern of {target_size} cells requested for a {grid} grid ({cells} cells)"
    );

    rand::seq::index::sample(rng, cells, target_size)
        .into_iter()
        .collect()
}
