use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Dimensions of the board a trial is played on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
}

impl GridSpec {
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows < 2 || cols < 2 {
            return Err(GridError::TooSmall { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }

    pub fn shorter_side(&self) -> usize {
        self.rows.min(self.cols)
    }

    /// Row and column of a cell index, or None when the index is off the board
    pub fn position(&self, index: usize) -> Option<(usize, usize)> {
        (index < self.cells()).then(|| (index / self.cols, index % self.cols))
    }

    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }
}

impl std::fmt::Display for GridSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Ordered list of grids, smallest first, indexed by grid level
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridProgression {
    levels: Vec<GridSpec>,
}

impl GridProgression {
    pub fn new(levels: Vec<GridSpec>) -> Result<Self, GridError> {
        if levels.is_empty() {
            return Err(GridError::EmptyProgression);
        }

        for grid in &levels {
            // GridSpec fields are public, so re-check what `GridSpec::new` enforces
            GridSpec::new(grid.rows, grid.cols)?;
        }

        for (level, pair) in levels.windows(2).enumerate() {
            let (previous, current) = (pair[0].cells(), pair[1].cells());
            if current <= previous {
                return Err(GridError::NotIncreasing {
                    level: level + 1,
                    cells: current,
                    previous,
                });
            }
        }

        Ok(Self { levels })
    }

    pub fn from_dimensions(dims: &[(usize, usize)]) -> Result<Self, GridError> {
        let levels = dims
            .iter()
            .map(|&(rows, cols)| GridSpec::new(rows, cols))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(levels)
    }

    /// Grid for a level; levels past the end resolve to the largest grid
    pub fn grid(&self, level: usize) -> GridSpec {
        self.levels[level.min(self.max_level())]
    }

    pub fn first(&self) -> GridSpec {
        self.levels[0]
    }

    pub fn max_level(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> &[GridSpec] {
        &self.levels
    }
}

impl Default for GridProgression {
    fn default() -> Self {
        let levels = [
            (2, 2),
            (3, 2),
            (3, 3),
            (4, 3),
            (4, 4),
            (5, 4),
            (5, 5),
            (6, 5),
            (6, 6),
        ]
        .into_iter()
        .map(|(rows, cols)| GridSpec { rows, cols })
        .collect();
        Self { levels }
    }
}
