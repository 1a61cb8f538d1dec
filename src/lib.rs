// Library surface for the binary, headless/integration tests and reuse.
// Rendering and key handling stay in the binary.
pub mod app_dirs;
pub mod carry_over;
pub mod clock;
pub mod config;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod grid;
pub mod logging;
pub mod pattern;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod snapshot;

pub use carry_over::{CarryOverStore, InMemoryCarryOver};
pub use engine::MatrixGame;
pub use grid::{GridProgression, GridSpec};
pub use session::{Phase, Pick, Stage};
pub use settings::GameSettings;
pub use snapshot::{CellMark, Snapshot};
