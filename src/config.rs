//! Run configuration from the environment (`.env` supported).

use std::time::Duration;

use crate::domain::AggregationPolicy;
use crate::error::PipelineError;

pub const ENV_TIMEOUT_SECS: &str = "MACROCAT_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "MACROCAT_USER_AGENT";
pub const ENV_AGGREGATION: &str = "MACROCAT_AGGREGATION";

const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Per-request timeout handed to the network collaborators.
    pub timeout: Duration,
    pub user_agent: String,
    /// How sub-annual series are collapsed to annual.
    pub aggregation: AggregationPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
            aggregation: AggregationPolicy::Mean,
        }
    }
}

impl RunConfig {
    pub fn from_env() -> Result<Self, PipelineError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PipelineError> {
        let mut config = RunConfig::default();

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                PipelineError::Configuration(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"))
            })?;
            if secs == 0 {
                return Err(PipelineError::Configuration(format!("{ENV_TIMEOUT_SECS} must be > 0")));
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(ENV_USER_AGENT) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                config.user_agent = trimmed.to_string();
            }
        }

        if let Some(raw) = lookup(ENV_AGGREGATION) {
            config.aggregation = AggregationPolicy::parse(&raw).ok_or_else(|| {
                PipelineError::Configuration(format!("{ENV_AGGREGATION} must be 'mean' or 'last', got '{raw}'"))
            })?;
        }

        Ok(config)
    }
}

fn default_user_agent() -> String {
    format!("macro-catalog/{}", env!("CARGO_PKG_VERSION"))
}
