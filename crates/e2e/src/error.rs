//! Error types for E2E testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Fixture server failed to start: {0}")]
    ServerStartup(String),

    #[error("Fixture server health check failed after {0} attempts")]
    ServerHealthCheck(usize),

    #[error("Test spec parse error: {0}")]
    SpecParse(String),

    #[error("Fixture not found: {0}")]
    FixtureNotFound(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Client error: {0}")]
    Client(#[from] studio_client::ClientError),

    #[error("Studio error: {0}")]
    Common(#[from] studio_common::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
