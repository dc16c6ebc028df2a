//! GMDUMP - decompiled game archive to GameMaker project exporter
//!
//! Re-exports all modules for use by the binary target.

// Core engine (workers, progress)
pub mod core;

// App modules
pub mod cli;
pub mod config;
pub mod emit;
pub mod entities;
pub mod export;
pub mod ids;
pub mod shapes;
pub mod source;
pub mod texture_groups;
pub mod utils;

// Re-export commonly used types
pub use core::{ConsoleProgress, NullProgress, ProgressSink, Workers};
pub use emit::Emitter;
pub use entities::{GMProject, ProjectAssembler, Resource, Translated};
pub use export::{ExportContext, ExportError, ExportOutput, ExportSummary, Exporter};
pub use source::SourceData;
