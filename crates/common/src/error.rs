//! Error types for Studio

use thiserror::Error;

/// Result type alias using the Studio error
pub type Result<T> = std::result::Result<T, Error>;

/// Studio error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config encode error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("Invalid signup request: {0}")]
    InvalidRequest(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },
}

impl Error {
    /// Text suitable for showing to the user as-is
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidRequest(msg) | Error::InvalidIdentity(msg) => msg.clone(),
            Error::InvalidStateTransition { .. } => "You are already signed in.".to_string(),
            other => other.to_string(),
        }
    }
}
