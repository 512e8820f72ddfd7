//! Error types for the signup client

use thiserror::Error;

/// Fallback text when the server gives nothing usable to show
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from signup endpoint")]
    UnexpectedStatus { status: u16 },

    #[error("Malformed signup response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Common(#[from] studio_common::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Translate a transport-level problem into text for the message queue
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Http(e) if e.is_timeout() => {
                "The signup request timed out. Please try again.".to_string()
            }
            ClientError::Http(e) if e.is_connect() => {
                "Could not reach the server. Please try again.".to_string()
            }
            ClientError::UnexpectedStatus { status } if *status >= 500 => {
                format!("The server could not complete the signup ({}). Please try again.", status)
            }
            ClientError::Common(e) => e.user_message(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}
