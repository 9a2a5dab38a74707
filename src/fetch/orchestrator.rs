//! Fetch orchestrator: resolved registry rows in, unified observation table out.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::{AggregationPolicy, Frequency, Observation, SeriesDescriptor, SourceId};
use crate::error::PipelineError;
use crate::fetch::frequency::canonicalize;
use crate::parsers::{parse_payload, world_bank};
use crate::transport::Transport;

/// Upper bound on World Bank pages per series.
const MAX_WORLD_BANK_PAGES: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub aggregation: AggregationPolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            aggregation: AggregationPolicy::Mean,
        }
    }
}

/// A resolved row that contributed no observations, and why.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SeriesFailure {
    pub indicator_id: String,
    pub source_id: SourceId,
    pub url: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub observations: Vec<Observation>,
    pub failures: Vec<SeriesFailure>,
    /// Resolved rows that were attempted.
    pub series_attempted: usize,
}

/// Fetch, parse and canonicalize every resolved row.
///
/// Rows that are not `resolved` are skipped. A failure on one row is logged and
/// recorded in `FetchOutcome::failures`; that row contributes zero observations
/// and the remaining rows are still processed.
pub fn fetch_and_normalize_series<T>(
    registry: &[SeriesDescriptor],
    transport: &T,
    settings: &FetchSettings,
) -> FetchOutcome
where
    T: Transport + ?Sized,
{
    let mut outcome = FetchOutcome::default();

    for row in registry.iter().filter(|r| r.is_resolved()) {
        outcome.series_attempted += 1;
        match fetch_series(row, transport, settings) {
            Ok(observations) => {
                debug!(
                    indicator = %row.indicator_id,
                    source = %row.source_id,
                    rows = observations.len(),
                    "series normalized"
                );
                outcome.observations.extend(observations);
            }
            Err(err) => {
                warn!(
                    indicator = %row.indicator_id,
                    source = %row.source_id,
                    error = %err,
                    "series fetch failed; skipping"
                );
                outcome.failures.push(SeriesFailure {
                    indicator_id: row.indicator_id.clone(),
                    source_id: row.source_id,
                    url: row.resolved_url.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    info!(
        series = outcome.series_attempted,
        failed = outcome.failures.len(),
        observations = outcome.observations.len(),
        "fetch complete"
    );
    outcome
}

/// Fetch and normalize a single resolved row.
pub fn fetch_series<T>(
    row: &SeriesDescriptor,
    transport: &T,
    settings: &FetchSettings,
) -> Result<Vec<Observation>, PipelineError>
where
    T: Transport + ?Sized,
{
    let url = row.resolved_url.as_deref().ok_or_else(|| {
        PipelineError::data_shape(
            row.source_id,
            format!("{} is marked resolved but has no URL", row.indicator_id),
        )
    })?;

    let payload = match row.source_id {
        SourceId::WorldBank => fetch_world_bank_pages(url, transport, settings.timeout)?,
        SourceId::Eurostat | SourceId::Imf => get_json(transport, url, settings.timeout)?,
    };

    let raw = parse_payload(row, &payload)?;
    let points = canonicalize(raw, &row.frequency_raw, settings.aggregation, row.source_id)?;

    Ok(points
        .into_iter()
        .map(|p| Observation {
            indicator_id: row.indicator_id.clone(),
            source_id: row.source_id,
            mapping_quality: row.mapping_quality,
            period: p.period,
            year: p.year,
            value: p.value,
            frequency_raw: row.frequency_raw.clone(),
            frequency_canonical: Frequency::CANONICAL.to_string(),
            unit_raw: row.unit_raw.clone(),
        })
        .collect())
}

/// Fetch every page of a World Bank series and merge them into one `[metadata, records]` payload.
///
/// Page 1 is always requested explicitly; further pages only when its metadata
/// reports more than one.
pub fn fetch_world_bank_pages<T>(url: &str, transport: &T, timeout: Duration) -> Result<Value, PipelineError>
where
    T: Transport + ?Sized,
{
    let first = get_json(transport, &page_url(url, 1), timeout)?;
    let pages = world_bank::page_count(&first)?;
    let (meta, mut records) = world_bank::page_parts(&first)?;

    if pages > MAX_WORLD_BANK_PAGES {
        return Err(PipelineError::data_shape(
            SourceId::WorldBank,
            format!("{pages} pages reported; refusing more than {MAX_WORLD_BANK_PAGES}"),
        ));
    }

    for page in 2..=pages {
        let payload = get_json(transport, &page_url(url, page), timeout)?;
        let (_, page_records) = world_bank::page_parts(&payload)?;
        records.extend(page_records);
    }

    debug!(url, pages, records = records.len(), "world bank pages merged");
    Ok(Value::Array(vec![meta, Value::Array(records)]))
}

fn page_url(url: &str, page: u32) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}page={page}")
}

fn get_json<T>(transport: &T, url: &str, timeout: Duration) -> Result<Value, PipelineError>
where
    T: Transport + ?Sized,
{
    let body = transport.fetch(url, timeout)?;
    serde_json::from_slice(&body).map_err(|source| PipelineError::Decode {
        url: url.to_string(),
        source,
    })
}
