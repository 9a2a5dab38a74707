//! In-memory collaborator for tests: canned responses keyed by exact URL.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;

use crate::error::PipelineError;
use crate::transport::{EndpointCheck, EndpointValidator, Transport};

#[derive(Debug, Clone)]
enum Canned {
    Response {
        status: u16,
        content_type: String,
        body: Vec<u8>,
    },
    Fail(String),
}

/// Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeHttp {
    routes: HashMap<String, Canned>,
    requests: Mutex<Vec<String>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(mut self, url: &str, payload: Value) -> Self {
        let body = serde_json::to_vec(&payload).unwrap();
        self.routes.insert(
            url.to_string(),
            Canned::Response {
                status: 200,
                content_type: "application/json".into(),
                body,
            },
        );
        self
    }

    pub fn respond(mut self, url: &str, status: u16, content_type: &str, body: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            Canned::Response {
                status,
                content_type: content_type.into(),
                body: body.as_bytes().to_vec(),
            },
        );
        self
    }

    pub fn fail(mut self, url: &str, message: &str) -> Self {
        self.routes.insert(url.to_string(), Canned::Fail(message.into()));
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn answer(&self, url: &str) -> Result<(u16, String, Vec<u8>), PipelineError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.routes.get(url) {
            Some(Canned::Response {
                status,
                content_type,
                body,
            }) => Ok((*status, content_type.clone(), body.clone())),
            Some(Canned::Fail(message)) => Err(PipelineError::Transport {
                url: url.to_string(),
                message: message.clone(),
            }),
            None => Ok((404, "text/html".into(), b"not found".to_vec())),
        }
    }
}

impl EndpointValidator for FakeHttp {
    fn validate(&self, url: &str, _timeout: Duration) -> Result<EndpointCheck, PipelineError> {
        let (status, content_type, content) = self.answer(url)?;
        Ok(EndpointCheck {
            resolved_url: url.to_string(),
            status,
            content_type,
            content,
        })
    }
}

impl Transport for FakeHttp {
    fn fetch(&self, url: &str, _timeout: Duration) -> Result<Vec<u8>, PipelineError> {
        let (status, _, body) = self.answer(url)?;
        if !(200..300).contains(&status) {
            return Err(PipelineError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }
        Ok(body)
    }
}
