//! Transport for the signup endpoint

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use studio_common::ApiConfig;

use crate::error::ClientResult;
use crate::signup::{decode_response, SignupRequest, SignupResult};

/// Anything that can carry a signup request to the backend.
///
/// Implementations decode the response into a [`SignupResult`]; an `Err`
/// means the call never produced a usable answer (connection refused,
/// timeout, 5xx, malformed success body).
#[async_trait]
pub trait SignupTransport: Send + Sync {
    async fn submit(&self, request: &SignupRequest) -> ClientResult<SignupResult>;
}

#[async_trait]
impl<T: SignupTransport + ?Sized> SignupTransport for Arc<T> {
    async fn submit(&self, request: &SignupRequest) -> ClientResult<SignupResult> {
        (**self).submit(request).await
    }
}

/// JSON-over-HTTP signup transport
pub struct HttpSignupTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpSignupTransport {
    pub fn new(api: &ApiConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder().timeout(api.timeout()).build()?;
        Ok(Self {
            client,
            url: api.signup_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SignupTransport for HttpSignupTransport {
    async fn submit(&self, request: &SignupRequest) -> ClientResult<SignupResult> {
        debug!(url = %self.url, email = %request.params.email, "POST signup");

        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        debug!(status, bytes = body.len(), "Signup response received");
        decode_response(status, &body)
    }
}
