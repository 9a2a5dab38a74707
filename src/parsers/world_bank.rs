//! World Bank Indicators API (v2) payloads.
//!
//! Responses are a two-element array `[metadata, records]`:
//!
//! ```json
//! [
//!   {"page": 1, "pages": 2, "per_page": 50, "total": 64},
//!   [{"date": "2020", "value": 56.5, ...}, ...]
//! ]
//! ```
//!
//! Errors come back as a one-element array holding a `message` block.

use serde_json::Value;

use crate::domain::{RawObservation, SourceId};
use crate::error::PipelineError;

fn shape_error(message: impl Into<String>) -> PipelineError {
    PipelineError::data_shape(SourceId::WorldBank, message)
}

fn split(payload: &Value) -> Result<(&Value, &Value), PipelineError> {
    let parts = payload
        .as_array()
        .ok_or_else(|| shape_error("expected a top-level array"))?;

    if let [meta] = parts.as_slice() {
        if let Some(message) = meta.get("message") {
            return Err(shape_error(format!("provider error: {}", provider_message(message))));
        }
    }

    match parts.as_slice() {
        [meta, records, ..] => Ok((meta, records)),
        _ => Err(shape_error(format!(
            "expected [metadata, records], got {} element(s)",
            parts.len()
        ))),
    }
}

fn provider_message(message: &Value) -> String {
    message
        .as_array()
        .and_then(|m| m.first())
        .and_then(|m| m.get("value").or_else(|| m.get("key")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| message.to_string())
}

/// Total page count from the metadata block (`pages` may be a number or a numeric string).
pub fn page_count(payload: &Value) -> Result<u32, PipelineError> {
    let (meta, _) = split(payload)?;
    let pages = meta
        .get("pages")
        .ok_or_else(|| shape_error("metadata has no 'pages'"))?;

    let parsed = match pages {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| shape_error(format!("invalid 'pages' value {pages}")))
}

/// The metadata block and the record list of one page. `null` records mean "no data".
pub fn page_parts(payload: &Value) -> Result<(Value, Vec<Value>), PipelineError> {
    let (meta, records) = split(payload)?;
    let records = match records {
        Value::Null => Vec::new(),
        Value::Array(items) => items.clone(),
        other => return Err(shape_error(format!("records must be an array, got {other}"))),
    };
    Ok((meta.clone(), records))
}

/// Parse a (possibly page-merged) World Bank payload; records with a null value are dropped.
pub fn parse_world_bank(payload: &Value) -> Result<Vec<RawObservation>, PipelineError> {
    let (_, records) = page_parts(payload)?;

    let mut out = Vec::with_capacity(records.len());
    for record in &records {
        let date = record
            .get("date")
            .and_then(Value::as_str)
            .ok_or_else(|| shape_error("record has no 'date'"))?;

        let value = match record.get("value") {
            None | Some(Value::Null) => continue,
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(_) => None,
        };
        let Some(value) = value.filter(|v| v.is_finite()) else {
            return Err(shape_error(format!("record {date} has a non-numeric value")));
        };

        out.push(RawObservation::new(date, value));
    }
    Ok(out)
}
