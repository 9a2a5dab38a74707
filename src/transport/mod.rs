//! Network collaborators.
//!
//! The pipeline only talks to the network through two narrow traits so the
//! resolution and fetch stages can be exercised without it:
//!
//! - `EndpointValidator`: "is this URL reachable and does it serve JSON?"
//! - `Transport`: "give me the body of this URL"
//!
//! `HttpClient` implements both on top of `reqwest::blocking`.

use std::time::Duration;

use crate::error::PipelineError;

pub mod http;

#[cfg(test)]
pub mod fake;

pub use http::HttpClient;

/// What the validator saw when it requested a URL.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointCheck {
    /// Final URL after redirects.
    pub resolved_url: String,
    pub status: u16,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl EndpointCheck {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `true` for `application/json`, `text/json`, `application/vnd.*+json` and friends.
    pub fn is_json(&self) -> bool {
        let media_type = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        media_type.contains("json")
    }
}

pub trait EndpointValidator: Send + Sync {
    /// Request `url` and report status / content type.
    ///
    /// Only transport failures are errors; any HTTP status is a valid answer.
    fn validate(&self, url: &str, timeout: Duration) -> Result<EndpointCheck, PipelineError>;
}

pub trait Transport: Send + Sync {
    /// Fetch the body of `url`; non-2xx responses are errors.
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(status: u16, content_type: &str) -> EndpointCheck {
        EndpointCheck {
            resolved_url: "https://example.test".into(),
            status,
            content_type: content_type.into(),
            content: Vec::new(),
        }
    }

    #[test]
    fn json_media_types_are_recognized() {
        assert!(check(200, "application/json").is_json());
        assert!(check(200, "application/json;charset=utf-8").is_json());
        assert!(check(200, "application/vnd.sdmx.data+json; version=1.0").is_json());
        assert!(!check(200, "text/html; charset=UTF-8").is_json());
        assert!(!check(200, "").is_json());
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(check(200, "").is_success());
        assert!(check(204, "").is_success());
        assert!(!check(301, "").is_success());
        assert!(!check(404, "").is_success());
    }
}
