//! Core engine modules - workers, progress
//!
//! Infrastructure the export driver runs on, independent of asset kinds.

pub mod progress;
pub mod workers;

// Re-exports for convenience
pub use progress::{ConsoleProgress, NullProgress, ProgressSink};
pub use workers::Workers;
