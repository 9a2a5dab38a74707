//! Blocking HTTP implementation of the network collaborators.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::config::RunConfig;
use crate::error::PipelineError;
use crate::transport::{EndpointCheck, EndpointValidator, Transport};

pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &RunConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl EndpointValidator for HttpClient {
    fn validate(&self, url: &str, timeout: Duration) -> Result<EndpointCheck, PipelineError> {
        debug!(url, "validating endpoint");
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| transport_error(url, e))?;

        let resolved_url = resp.url().to_string();
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let content = resp.bytes().map_err(|e| transport_error(url, e))?.to_vec();

        debug!(url, status, content_type = %content_type, bytes = content.len(), "endpoint answered");
        Ok(EndpointCheck {
            resolved_url,
            status,
            content_type,
            content,
        })
    }
}

impl Transport for HttpClient {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, PipelineError> {
        debug!(url, "fetching");
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| transport_error(url, e))?;

        if !resp.status().is_success() {
            return Err(PipelineError::HttpStatus {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }

        let body = resp.bytes().map_err(|e| transport_error(url, e))?;
        Ok(body.to_vec())
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> PipelineError {
    let message = if err.is_timeout() {
        format!("timed out: {err}")
    } else {
        err.to_string()
    };
    PipelineError::Transport {
        url: url.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_from_default_config() {
        let config = RunConfig::default();
        assert!(HttpClient::new(&config).is_ok());
    }
}
