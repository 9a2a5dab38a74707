//! Output helpers: CSV and JSON exports (`export`).

pub mod export;

pub use export::*;
