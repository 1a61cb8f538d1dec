use std::path::PathBuf;

use thiserror::Error;

/// Problems with a grid or the ordered list of grids a session climbs through
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid {rows}x{cols} is too small, both dimensions must be at least 2")]
    TooSmall { rows: usize, cols: usize },

    #[error("grid progression must contain at least one grid")]
    EmptyProgression,

    #[error(
        "grid progression must grow: level {level} has {cells} cells but the level before it has {previous}"
    )]
    NotIncreasing {
        level: usize,
        cells: usize,
        previous: usize,
    },
}

/// Errors raised while loading, validating or saving the game configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config at {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config is not valid json")]
    Parse(#[from] serde_json::Error),

    #[error("invalid grid progression")]
    Grid(#[from] GridError),

    #[error("a session needs at least one trial")]
    NoTrials,

    #[error("the countdown needs at least one tick")]
    NoCountdown,

    #[error("minimum target size must be at least 1")]
    ZeroMinTarget,

    #[error("minimum target size {min_target} does not fit the first grid ({cells} cells)")]
    MinTargetTooLarge { min_target: usize, cells: usize },
}
