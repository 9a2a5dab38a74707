//! Formatted terminal output for registry, resolution and fetch runs.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized

use std::collections::BTreeMap;

use crate::domain::{Observation, SeriesDescriptor, SourceId};
use crate::fetch::FetchOutcome;
use crate::registry::indicator_label;
use crate::resolve::ResolutionSummary;

fn opt(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// Registry listing: one line per (indicator, source) pairing.
pub fn format_registry(country: &str, rows: &[SeriesDescriptor]) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== macrocat - series registry ({country}) ===\n"));
    out.push_str(&format!("Rows: {}\n\n", rows.len()));
    out.push_str(&format!(
        "{:<26} {:<11} {:<6} {:<4} {:<18} {}\n",
        "indicator", "source", "match", "freq", "native code", "url"
    ));

    let mut last_indicator = "";
    for row in rows {
        let indicator = if row.indicator_id == last_indicator {
            ""
        } else {
            row.indicator_id.as_str()
        };
        last_indicator = row.indicator_id.as_str();

        let code = row
            .indicator_code
            .as_deref()
            .or(row.dataset_code.as_deref());
        out.push_str(&format!(
            "{:<26} {:<11} {:<6} {:<4} {:<18} {}\n",
            indicator,
            row.source_id.as_str(),
            row.mapping_quality.as_str(),
            row.frequency_raw,
            opt(code),
            opt(row.resolved_url.as_deref()),
        ));
        if let Some(note) = &row.specificity_note {
            out.push_str(&format!("{:<26} {:<11} note: {note}\n", "", ""));
        }
    }

    out
}

/// Resolution summary followed by the status/reason of every row.
pub fn format_resolution(country: &str, rows: &[SeriesDescriptor]) -> String {
    let summary = ResolutionSummary::from_rows(rows);
    let mut out = String::new();

    out.push_str(&format!("=== macrocat - endpoint resolution ({country}) ===\n"));
    out.push_str(&format!(
        "Resolved: {}  Unresolved: {}  (missing parameters: {})\n\n",
        summary.resolved, summary.unresolved, summary.missing_parameters
    ));
    out.push_str(&format!(
        "{:<26} {:<11} {:<11} {:<28} {}\n",
        "indicator", "source", "status", "reason", "http"
    ));

    for row in rows {
        let status = row.endpoint_status.map(|s| s.as_str()).unwrap_or("pending");
        let reason = row
            .resolution_reason
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let http = row
            .http_status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<26} {:<11} {:<11} {:<28} {}\n",
            row.indicator_id,
            row.source_id.as_str(),
            status,
            reason,
            http
        ));
    }

    out
}

/// Per-series coverage of a fetch run, plus any failed series.
pub fn format_fetch(country: &str, outcome: &FetchOutcome) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== macrocat - normalized observations ({country}) ===\n"));
    out.push_str(&format!(
        "Series fetched: {}  Failed: {}  Observations: {}\n\n",
        outcome.series_attempted,
        outcome.failures.len(),
        outcome.observations.len()
    ));

    let coverage = series_coverage(&outcome.observations);
    if !coverage.is_empty() {
        out.push_str(&format!(
            "{:<26} {:<11} {:>5} {:>11} {:>14}  {}\n",
            "indicator", "source", "n", "years", "latest", "label"
        ));
        for ((indicator, source), c) in &coverage {
            out.push_str(&format!(
                "{:<26} {:<11} {:>5} {:>11} {:>14.4}  {}\n",
                indicator,
                source.as_str(),
                c.count,
                format!("{}-{}", c.first_year, c.last_year),
                c.latest_value,
                indicator_label(indicator).unwrap_or(""),
            ));
        }
    }

    if !outcome.failures.is_empty() {
        out.push_str("\nFailed series:\n");
        for f in &outcome.failures {
            out.push_str(&format!("- {}/{}: {}\n", f.indicator_id, f.source_id, f.error));
        }
    }

    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Coverage {
    count: usize,
    first_year: i32,
    last_year: i32,
    latest_value: f64,
}

fn series_coverage(observations: &[Observation]) -> BTreeMap<(&str, SourceId), Coverage> {
    let mut out: BTreeMap<(&str, SourceId), Coverage> = BTreeMap::new();
    for obs in observations {
        out.entry((obs.indicator_id.as_str(), obs.source_id))
            .and_modify(|c| {
                c.count += 1;
                c.first_year = c.first_year.min(obs.year);
                if obs.year >= c.last_year {
                    c.last_year = obs.year;
                    c.latest_value = obs.value;
                }
            })
            .or_insert(Coverage {
                count: 1,
                first_year: obs.year,
                last_year: obs.year,
                latest_value: obs.value,
            });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EndpointStatus, MappingQuality, ResolutionReason};
    use crate::fetch::SeriesFailure;
    use crate::registry::build_series_registry;

    fn obs(indicator: &str, source: SourceId, year: i32, value: f64) -> Observation {
        Observation {
            indicator_id: indicator.into(),
            source_id: source,
            mapping_quality: MappingQuality::Exact,
            period: year.to_string(),
            year,
            value,
            frequency_raw: "A".into(),
            frequency_canonical: "A".into(),
            unit_raw: "%".into(),
        }
    }

    #[test]
    fn registry_listing_includes_every_row_and_notes() {
        let rows = build_series_registry("LT").unwrap();
        let text = format_registry("LT", &rows);
        assert!(text.contains("series registry (LT)"));
        assert!(text.contains(&format!("Rows: {}", rows.len())));
        assert!(text.contains("NY.GDP.MKTP.CD"));
        assert!(text.contains("note: Monthly HICP"));
    }

    #[test]
    fn resolution_report_shows_reason_codes() {
        let mut rows: Vec<_> = build_series_registry("LT").unwrap().into_iter().take(2).collect();
        rows[0].endpoint_status = Some(EndpointStatus::Unresolved);
        rows[0].resolution_reason = Some(ResolutionReason::HttpError(404));
        rows[0].http_status = Some(404);
        rows[1].endpoint_status = Some(EndpointStatus::Resolved);
        rows[1].resolution_reason = Some(ResolutionReason::Ok);

        let text = format_resolution("LT", &rows);
        assert!(text.contains("Resolved: 1  Unresolved: 1"));
        assert!(text.contains("http_404"));
        assert!(text.contains("resolved"));
    }

    #[test]
    fn fetch_report_summarizes_coverage_and_failures() {
        let outcome = FetchOutcome {
            observations: vec![
                obs("gdp_growth_real", SourceId::Imf, 2019, 4.6),
                obs("gdp_growth_real", SourceId::Imf, 2020, 0.0),
                obs("gdp_growth_real", SourceId::WorldBank, 2020, -0.1),
            ],
            failures: vec![SeriesFailure {
                indicator_id: "unemployment_rate".into(),
                source_id: SourceId::Eurostat,
                url: None,
                error: "request to x failed: timed out".into(),
            }],
            series_attempted: 3,
        };

        let text = format_fetch("LT", &outcome);
        assert!(text.contains("Series fetched: 3  Failed: 1  Observations: 3"));
        assert!(text.contains("2019-2020"));
        assert!(text.contains("unemployment_rate/eurostat: request to x failed: timed out"));
    }

    #[test]
    fn coverage_tracks_latest_year_value() {
        let observations = vec![
            obs("x", SourceId::Imf, 2021, 3.0),
            obs("x", SourceId::Imf, 2019, 1.0),
        ];
        let coverage = series_coverage(&observations);
        let c = coverage[&("x", SourceId::Imf)];
        assert_eq!(c.count, 2);
        assert_eq!((c.first_year, c.last_year), (2019, 2021));
        assert_eq!(c.latest_value, 3.0);
    }
}
