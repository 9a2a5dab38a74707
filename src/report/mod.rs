//! Reporting utilities: terminal summaries of each pipeline stage.

pub mod format;

pub use format::*;
