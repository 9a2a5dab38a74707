//! Endpoint resolution stage.
//!
//! Every registry row gets a URL (or not), a status and a reason code. Failures
//! are recorded on the row; this stage never returns an error.

use std::time::Duration;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{EndpointStatus, ResolutionReason, SeriesDescriptor};
use crate::resolve::url::resolve_url;
use crate::transport::EndpointValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveSettings {
    pub timeout: Duration,
    /// Validate rows on the rayon pool. Output order is unaffected.
    pub parallel: bool,
}

impl Default for ResolveSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            parallel: false,
        }
    }
}

/// Counts per endpoint status (for logging and reports).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub resolved: usize,
    pub unresolved: usize,
    pub missing_parameters: usize,
}

impl ResolutionSummary {
    pub fn from_rows(rows: &[SeriesDescriptor]) -> Self {
        let mut summary = ResolutionSummary::default();
        for row in rows {
            match row.endpoint_status {
                Some(EndpointStatus::Resolved) => summary.resolved += 1,
                Some(EndpointStatus::Unresolved) => summary.unresolved += 1,
                None => {}
            }
            if row.resolution_reason == Some(ResolutionReason::MissingRequiredParameters) {
                summary.missing_parameters += 1;
            }
        }
        summary
    }
}

/// Resolve and validate the endpoint of every registry row.
pub fn resolve_series_endpoints<V>(
    registry: Vec<SeriesDescriptor>,
    validator: &V,
    settings: &ResolveSettings,
) -> Vec<SeriesDescriptor>
where
    V: EndpointValidator + ?Sized,
{
    let rows: Vec<SeriesDescriptor> = if settings.parallel {
        registry
            .into_par_iter()
            .map(|row| resolve_row(row, validator, settings.timeout))
            .collect()
    } else {
        registry
            .into_iter()
            .map(|row| resolve_row(row, validator, settings.timeout))
            .collect()
    };

    let summary = ResolutionSummary::from_rows(&rows);
    info!(
        resolved = summary.resolved,
        unresolved = summary.unresolved,
        missing_parameters = summary.missing_parameters,
        "endpoint resolution complete"
    );
    rows
}

fn resolve_row<V>(mut row: SeriesDescriptor, validator: &V, timeout: Duration) -> SeriesDescriptor
where
    V: EndpointValidator + ?Sized,
{
    row.http_status = None;

    let Some(url) = resolve_url(&row) else {
        debug!(indicator = %row.indicator_id, source = %row.source_id, "missing required parameters");
        row.resolved_url = None;
        return mark(row, EndpointStatus::Unresolved, ResolutionReason::MissingRequiredParameters);
    };

    match validator.validate(&url, timeout) {
        Ok(check) => {
            row.http_status = Some(check.status);
            if !check.is_success() {
                warn!(
                    indicator = %row.indicator_id,
                    source = %row.source_id,
                    url = %url,
                    status = check.status,
                    "endpoint returned error status"
                );
                row.resolved_url = Some(url);
                mark(row, EndpointStatus::Unresolved, ResolutionReason::HttpError(check.status))
            } else if !check.is_json() {
                warn!(
                    indicator = %row.indicator_id,
                    source = %row.source_id,
                    url = %url,
                    content_type = %check.content_type,
                    "endpoint does not serve JSON"
                );
                row.resolved_url = Some(url);
                mark(row, EndpointStatus::Unresolved, ResolutionReason::UnsupportedContentType)
            } else {
                row.resolved_url = Some(check.resolved_url);
                mark(row, EndpointStatus::Resolved, ResolutionReason::Ok)
            }
        }
        Err(err) => {
            warn!(
                indicator = %row.indicator_id,
                source = %row.source_id,
                error = %err,
                "endpoint validation failed"
            );
            row.resolved_url = Some(url);
            mark(row, EndpointStatus::Unresolved, ResolutionReason::TransportError)
        }
    }
}

fn mark(mut row: SeriesDescriptor, status: EndpointStatus, reason: ResolutionReason) -> SeriesDescriptor {
    row.endpoint_status = Some(status);
    row.resolution_reason = Some(reason);
    row
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::registry::build_series_registry;
    use crate::transport::fake::FakeHttp;

    fn first_two_rows() -> Vec<SeriesDescriptor> {
        build_series_registry("LT").unwrap().into_iter().take(2).collect()
    }

    #[test]
    fn reason_codes_for_missing_parameters_and_ok() {
        let mut registry = first_two_rows();
        registry[0].resolved_url = None;
        registry[0].indicator_code = None;

        let second_url = registry[1].resolved_url.clone().unwrap();
        let fake = FakeHttp::new().json(&second_url, json!({}));

        let resolved = resolve_series_endpoints(registry, &fake, &ResolveSettings::default());

        assert_eq!(resolved[0].endpoint_status, Some(EndpointStatus::Unresolved));
        assert_eq!(
            resolved[0].resolution_reason,
            Some(ResolutionReason::MissingRequiredParameters)
        );
        assert_eq!(resolved[0].resolved_url, None);

        assert_eq!(resolved[1].endpoint_status, Some(EndpointStatus::Resolved));
        assert_eq!(resolved[1].resolution_reason, Some(ResolutionReason::Ok));
        assert_eq!(resolved[1].http_status, Some(200));

        // Only the row with a URL reached the validator.
        assert_eq!(fake.requests(), vec![second_url]);
    }

    #[test]
    fn http_errors_and_transport_failures_are_recorded_per_row() {
        let registry: Vec<_> = build_series_registry("LT").unwrap().into_iter().take(4).collect();
        let urls: Vec<String> = registry.iter().map(|r| r.resolved_url.clone().unwrap()).collect();

        let fake = FakeHttp::new()
            .respond(&urls[0], 500, "text/html", "boom")
            .fail(&urls[1], "connection reset")
            .respond(&urls[2], 200, "text/html", "<html></html>")
            .json(&urls[3], json!([{"pages": 1}, []]));

        let resolved = resolve_series_endpoints(registry, &fake, &ResolveSettings::default());
        let reasons: Vec<_> = resolved.iter().map(|r| r.resolution_reason).collect();
        assert_eq!(
            reasons,
            vec![
                Some(ResolutionReason::HttpError(500)),
                Some(ResolutionReason::TransportError),
                Some(ResolutionReason::UnsupportedContentType),
                Some(ResolutionReason::Ok),
            ]
        );
        assert_eq!(resolved[0].http_status, Some(500));
        assert_eq!(resolved[1].http_status, None);
        assert!(resolved[..3]
            .iter()
            .all(|r| r.endpoint_status == Some(EndpointStatus::Unresolved)));
    }

    #[test]
    fn unknown_endpoints_resolve_to_http_404() {
        let registry = first_two_rows();
        let resolved = resolve_series_endpoints(registry, &FakeHttp::new(), &ResolveSettings::default());
        assert!(resolved
            .iter()
            .all(|r| r.resolution_reason == Some(ResolutionReason::HttpError(404))));
    }

    #[test]
    fn parallel_resolution_preserves_order_and_results() {
        let registry = build_series_registry("LT").unwrap();
        let mut fake = FakeHttp::new();
        for row in registry.iter().step_by(2) {
            fake = fake.json(row.resolved_url.as_deref().unwrap(), json!({}));
        }

        let sequential = resolve_series_endpoints(registry.clone(), &fake, &ResolveSettings::default());
        let parallel = resolve_series_endpoints(
            registry.clone(),
            &fake,
            &ResolveSettings {
                parallel: true,
                ..ResolveSettings::default()
            },
        );

        assert_eq!(sequential, parallel);
        for (before, after) in registry.iter().zip(&parallel) {
            assert_eq!(before.indicator_id, after.indicator_id);
            assert_eq!(before.source_id, after.source_id);
        }
    }

    #[test]
    fn summary_counts_statuses() {
        let mut registry = first_two_rows();
        registry[0].indicator_code = None;
        let resolved = resolve_series_endpoints(registry, &FakeHttp::new(), &ResolveSettings::default());
        let summary = ResolutionSummary::from_rows(&resolved);
        assert_eq!(
            summary,
            ResolutionSummary {
                resolved: 0,
                unresolved: 2,
                missing_parameters: 1,
            }
        );
    }
}
