//! Studio Common Library
//!
//! Identity, session and configuration types shared by the signup client,
//! the CLI and the end-to-end harness.

pub mod config;
pub mod error;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, ClientConfig, ContestedRoles, PolicyConfig};
pub use error::{Error, Result};
pub use session::{Action, AppState, Messages, SessionHandle, SessionStore};
pub use types::*;

/// Studio version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
