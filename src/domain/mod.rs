//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - provider / quality / status enums (`SourceId`, `MappingQuality`, `EndpointStatus`)
//! - registry rows (`SeriesDescriptor`) and their resolution annotations
//! - parsed and normalized observations (`RawObservation`, `Observation`)

pub mod types;

pub use types::*;
