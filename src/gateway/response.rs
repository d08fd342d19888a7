use std::fmt;

use log::debug;
use serde::de::DeserializeOwned;

use crate::error::SubmitError;
use crate::gateway::{Method, Step};

/// One call against the gateway, addressed relative to the gateway base URL
#[derive(Clone, Debug, PartialEq)]
pub struct GatewayRequest {
    pub step: Step,
    pub method: Method,
    /// e.g. `/resourcemanager/v1/cluster/apps`
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    /// JSON document sent as the request body
    pub body: Option<String>,
}

impl GatewayRequest {
    pub fn get(step: Step, path: impl Into<String>) -> Self {
        Self::new(step, Method::Get, path)
    }

    pub fn post(step: Step, path: impl Into<String>) -> Self {
        Self::new(step, Method::Post, path)
    }

    pub fn put(step: Step, path: impl Into<String>) -> Self {
        Self::new(step, Method::Put, path)
    }

    fn new(step: Step, method: Method, path: impl Into<String>) -> Self {
        GatewayRequest { step, method, path: path.into(), query: Vec::new(), body: None }
    }

    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub fn json(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

/// A fully read gateway response
///
/// The response is a scoped resource: it is released exactly once, when dropped, whichever way
/// the caller leaves (parsed payload, empty result or error). Transports can hook the release
/// with [`GatewayResponse::on_release`].
pub struct GatewayResponse {
    step: Step,
    status: u16,
    body: String,
    on_release: Option<Box<dyn FnOnce() + Send>>,
}

impl GatewayResponse {
    pub fn new(step: Step, status: u16, body: impl Into<String>) -> Self {
        GatewayResponse { step, status, body: body.into(), on_release: None }
    }

    pub fn on_release(mut self, release: impl FnOnce() + Send + 'static) -> Self {
        self.on_release = Some(Box::new(release));
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Deserialise the body, a malformed body is reported as a remote error for this step
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SubmitError> {
        serde_json::from_str(&self.body).map_err(|err| SubmitError::malformed(self.step, self.status, err))
    }
}

impl Drop for GatewayResponse {
    fn drop(&mut self) {
        debug!("{} - status: {}", self.step, self.status);
        if let Some(release) = self.on_release.take() {
            release();
        }
    }
}

impl fmt::Debug for GatewayResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayResponse")
            .field("step", &self.step)
            .field("status", &self.status)
            .field("body", &self.body)
            .finish()
    }
}
