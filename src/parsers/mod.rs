//! Provider payload parsers.
//!
//! Each parser is a pure function from one decoded JSON payload to raw
//! `(period, value)` observations for a single series:
//!
//! - World Bank `[metadata, records]` pages (`world_bank`)
//! - Eurostat JSON-stat cubes (`eurostat`)
//! - IMF DataMapper nested maps (`imf`)

use serde_json::Value;

use crate::domain::{RawObservation, SeriesDescriptor, SourceId};
use crate::error::PipelineError;

pub mod eurostat;
pub mod imf;
pub mod world_bank;

pub use eurostat::{JsonStatRow, JsonStatTable, flatten_jsonstat, parse_eurostat};
pub use imf::parse_imf;
pub use world_bank::parse_world_bank;

/// Dispatch a payload to the parser for the row's source.
pub fn parse_payload(row: &SeriesDescriptor, payload: &Value) -> Result<Vec<RawObservation>, PipelineError> {
    match row.source_id {
        SourceId::WorldBank => parse_world_bank(payload),
        SourceId::Eurostat => parse_eurostat(payload, row),
        SourceId::Imf => {
            let indicator = row
                .indicator_code
                .as_deref()
                .ok_or_else(|| PipelineError::data_shape(SourceId::Imf, "row has no indicator_code"))?;
            parse_imf(payload, indicator, &row.country_code_iso3)
        }
    }
}
