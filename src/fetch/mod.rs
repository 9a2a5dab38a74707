//! Fetching and normalization.
//!
//! Responsibilities:
//!
//! - retrieve payloads for resolved rows, paging through World Bank results
//! - dispatch to the provider parsers and tag provenance
//! - put every series on the annual grid (`frequency`)

pub mod frequency;
pub mod orchestrator;

pub use frequency::*;
pub use orchestrator::*;
