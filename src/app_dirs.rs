use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Directory the rolling log files are written to
    pub fn log_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("matrix-recall"),
            )
        } else {
            ProjectDirs::from("", "", "matrix-recall")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("logs"))
        }
    }
}
