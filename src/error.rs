//! Error types.
//!
//! - `PipelineError` is what library code returns (registry, parsers, transport, export).
//! - `AppError` is what the binary reports: a message plus a process exit code.

use thiserror::Error;

use crate::domain::SourceId;

/// Errors raised by the catalog / resolution / normalization pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Unsupported country, invalid setting, or a defective static catalog.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A provider payload is missing a key or branch its parser requires.
    #[error("data shape error ({source_id}): {message}")]
    DataShape { source_id: SourceId, message: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PipelineError {
    pub fn data_shape(source_id: SourceId, message: impl Into<String>) -> Self {
        PipelineError::DataShape {
            source_id,
            message: message.into(),
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let exit_code = match &err {
            PipelineError::Configuration(_) => 2,
            PipelineError::Io(_) | PipelineError::Csv(_) => 5,
            PipelineError::DataShape { .. }
            | PipelineError::Transport { .. }
            | PipelineError::HttpStatus { .. }
            | PipelineError::Decode { .. } => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
