//! Export registry rows and observations to CSV or JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::PipelineError;
use crate::fetch::SeriesFailure;

/// JSON export: the rows plus enough context to tell runs apart.
#[derive(Debug, Serialize)]
pub struct ExportEnvelope<'a, T: Serialize> {
    pub tool: &'static str,
    pub version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub country: &'a str,
    pub rows: &'a [T],
    #[serde(skip_serializing_if = "no_failures")]
    pub failures: &'a [SeriesFailure],
}

impl<'a, T: Serialize> ExportEnvelope<'a, T> {
    pub fn new(country: &'a str, rows: &'a [T], failures: &'a [SeriesFailure]) -> Self {
        Self {
            tool: "macrocat",
            version: env!("CARGO_PKG_VERSION"),
            generated_at: Utc::now(),
            country,
            rows,
            failures,
        }
    }
}

fn no_failures(failures: &&[SeriesFailure]) -> bool {
    failures.is_empty()
}

/// Write rows as CSV (header from the row type's field names).
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), PipelineError> {
    let mut out = csv::Writer::from_writer(writer);
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_csv_file<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), PipelineError> {
    let file = File::create(path)?;
    write_csv(file, rows)
}

pub fn write_json<W: Write, T: Serialize>(writer: W, envelope: &ExportEnvelope<'_, T>) -> Result<(), PipelineError> {
    serde_json::to_writer_pretty(writer, envelope).map_err(|e| PipelineError::Io(e.into()))
}

pub fn write_json_file<T: Serialize>(path: &Path, envelope: &ExportEnvelope<'_, T>) -> Result<(), PipelineError> {
    let file = File::create(path)?;
    write_json(file, envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MappingQuality, Observation, SourceId};
    use crate::registry::build_series_registry;

    fn observation() -> Observation {
        Observation {
            indicator_id: "inflation_cpi_yoy".into(),
            source_id: SourceId::Eurostat,
            mapping_quality: MappingQuality::Proxy,
            period: "2020".into(),
            year: 2020,
            value: 2.0,
            frequency_raw: "M".into(),
            frequency_canonical: "A".into(),
            unit_raw: "RCH_A".into(),
        }
    }

    #[test]
    fn observations_csv_has_expected_columns() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[observation()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "indicator_id,source_id,mapping_quality,period,year,value,frequency_raw,frequency_canonical,unit_raw"
        );
        assert_eq!(lines.next().unwrap(), "inflation_cpi_yoy,eurostat,proxy,2020,2020,2.0,M,A,RCH_A");
    }

    #[test]
    fn registry_csv_writes_one_line_per_row() {
        let rows = build_series_registry("LT").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.csv");
        write_csv_file(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), rows.len() + 1);
        assert!(text.lines().next().unwrap().starts_with("indicator_id,source_id,source_name"));
        assert!(text.contains("world_bank"));
    }

    #[test]
    fn json_envelope_carries_rows_and_failures() {
        let failures = vec![SeriesFailure {
            indicator_id: "gdp_growth_real".into(),
            source_id: SourceId::Imf,
            url: None,
            error: "boom".into(),
        }];
        let rows = [observation()];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obs.json");
        write_json_file(&path, &ExportEnvelope::new("LT", &rows, &failures)).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["tool"], "macrocat");
        assert_eq!(value["country"], "LT");
        assert_eq!(value["rows"][0]["source_id"], "eurostat");
        assert_eq!(value["failures"][0]["error"], "boom");
    }

    #[test]
    fn json_envelope_omits_empty_failures() {
        let rows = [observation()];
        let mut buf = Vec::new();
        write_json(&mut buf, &ExportEnvelope::new("LT", &rows, &[])).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(value.get("failures").is_none());
    }
}
