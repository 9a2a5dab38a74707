//! Shared pipeline logic used by the `resolve` and `fetch` commands.
//!
//! Registry build -> endpoint resolution -> fetch/normalize, with the network
//! collaborators passed in so the whole run can be driven without the network.

use crate::config::RunConfig;
use crate::domain::SeriesDescriptor;
use crate::error::PipelineError;
use crate::fetch::{FetchOutcome, FetchSettings, fetch_and_normalize_series};
use crate::registry::build_series_registry;
use crate::resolve::{ResolveSettings, resolve_series_endpoints};
use crate::transport::{EndpointValidator, Transport};

/// All computed outputs of a single fetch run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub registry: Vec<SeriesDescriptor>,
    pub outcome: FetchOutcome,
}

/// Build the registry and resolve every endpoint.
pub fn run_resolve<V>(
    country: &str,
    config: &RunConfig,
    parallel: bool,
    validator: &V,
) -> Result<Vec<SeriesDescriptor>, PipelineError>
where
    V: EndpointValidator + ?Sized,
{
    let registry = build_series_registry(country)?;
    let settings = ResolveSettings {
        timeout: config.timeout,
        parallel,
    };
    Ok(resolve_series_endpoints(registry, validator, &settings))
}

/// Build, resolve, then fetch and normalize every resolved series.
pub fn run_fetch<C>(country: &str, config: &RunConfig, parallel: bool, client: &C) -> Result<RunOutput, PipelineError>
where
    C: EndpointValidator + Transport + ?Sized,
{
    let registry = run_resolve(country, config, parallel, client)?;
    let settings = FetchSettings {
        timeout: config.timeout,
        aggregation: config.aggregation,
    };
    let outcome = fetch_and_normalize_series(&registry, client, &settings);
    Ok(RunOutput { registry, outcome })
}
