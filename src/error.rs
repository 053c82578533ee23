// Error types for the DSLab client.
//
// Each API call returns a `StepError`; the orchestrator wraps the ones
// that halt a run into a `WorkflowError` tagged with the failing step.

use std::path::PathBuf;

use thiserror::Error;

use crate::orchestrator::Step;

/// The request never produced a usable response: connection refused,
/// TLS failure, timeout, or a body that could not be read.
#[derive(Debug, Error)]
#[error("request to {url} failed: {source}")]
pub struct TransportError {
    pub url: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    pub fn new(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
        }
    }
}

/// Failure of a single API call.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered but the body was not what the call expects.
    #[error("unexpected response: {0}")]
    Protocol(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("server returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("cannot read {}: {source}", .path.display())]
    Payload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A failure that stopped the run.
#[derive(Debug, Error)]
#[error("{hint} ({step}: {source})", hint = .step.failure_hint())]
pub struct WorkflowError {
    pub step: Step,
    #[source]
    pub source: StepError,
}

impl WorkflowError {
    pub fn new(step: Step, source: StepError) -> Self {
        Self { step, source }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
