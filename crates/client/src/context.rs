//! Top-level application context owning the session

use studio_common::{ClientConfig, SessionHandle};

use crate::controller::SignupController;
use crate::error::ClientResult;
use crate::policy::RolePolicy;
use crate::transport::{HttpSignupTransport, SignupTransport};

/// Owns the session for one browser-equivalent context and hands out
/// controllers bound to it
pub struct AppContext {
    config: ClientConfig,
    session: SessionHandle,
}

impl AppContext {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            session: SessionHandle::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Controller talking to the configured signup endpoint over HTTP
    pub fn controller(&self) -> ClientResult<SignupController<HttpSignupTransport>> {
        let transport = HttpSignupTransport::new(&self.config.api)?;
        Ok(self.controller_with(transport))
    }

    /// Controller over a caller-supplied transport
    pub fn controller_with<T: SignupTransport>(&self, transport: T) -> SignupController<T> {
        SignupController::new(
            self.session.clone(),
            transport,
            RolePolicy::from_config(&self.config.policy),
        )
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}
