use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::difficulty::{BOOTSTRAP_TARGET, CARRY_OVER_DROP, MIN_TARGET};
use crate::error::ConfigError;
use crate::grid::{GridProgression, GridSpec};
use crate::scoring::{Scoring, BONUS_PER_CELL, POINTS_PER_CELL};
use crate::settings::{
    GameSettings, Timing, COUNTDOWN_TICKS, COUNTDOWN_TICK_MS, FEEDBACK_DELAY_MS, SHOW_DURATION_MS,
    TOTAL_TRIALS,
};

/// On-disk game configuration. Every field falls back to its default when
/// missing from the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub total_trials: u32,
    pub min_target: usize,
    pub initial_target: usize,
    pub carry_over_drop: usize,
    pub points_per_cell: u32,
    pub bonus_per_cell: u32,
    pub countdown_ticks: u32,
    pub countdown_tick_ms: u64,
    pub show_duration_ms: u64,
    pub feedback_delay_ms: u64,
    pub grid_progression: Vec<GridSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            total_trials: TOTAL_TRIALS,
            min_target: MIN_TARGET,
            initial_target: BOOTSTRAP_TARGET,
            carry_over_drop: CARRY_OVER_DROP,
            points_per_cell: POINTS_PER_CELL,
            bonus_per_cell: BONUS_PER_CELL,
            countdown_ticks: COUNTDOWN_TICKS,
            countdown_tick_ms: COUNTDOWN_TICK_MS,
            show_duration_ms: SHOW_DURATION_MS,
            feedback_delay_ms: FEEDBACK_DELAY_MS,
            grid_progression: GridProgression::default().levels().to_vec(),
        }
    }
}

impl Config {
    /// Validate into the rules a game runs with
    pub fn settings(&self) -> Result<GameSettings, ConfigError> {
        let progression = GridProgression::new(self.grid_progression.clone())?;
        GameSettings::new(
            progression,
            self.min_target,
            self.initial_target,
            self.carry_over_drop,
            Scoring {
                points_per_cell: self.points_per_cell,
                bonus_per_cell: self.bonus_per_cell,
            },
            Timing {
                countdown_ticks: self.countdown_ticks,
                countdown_tick: Duration::from_millis(self.countdown_tick_ms),
                display: Duration::from_millis(self.show_duration_ms),
                feedback: Duration::from_millis(self.feedback_delay_ms),
            },
            self.total_trials,
        )
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "matrix-recall") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("matrix_recall_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Like [`ConfigStore::load`] but reports why the file could not be used
    pub fn try_load(&self) -> Result<Config, ConfigError> {
        let bytes = fs::read(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_slice::<Config>(&bytes)?)
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if !self.path.exists() {
            return Config::default();
        }
        match self.try_load() {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "using default config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data).map_err(write_err)
    }
}
