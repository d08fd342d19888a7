use async_trait::async_trait;
use log::debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;

use crate::config::GatewayConfig;
use crate::error::SubmitError;
use crate::gateway::response::{GatewayRequest, GatewayResponse};
use crate::gateway::Method;

/// Knox rejects state-changing calls without this header when CSRF protection is on
const XSRF_HEADER: &str = "X-XSRF-Header";

/// Sends one request to the gateway and reads the whole response
///
/// A transport reports only connection-level failures as errors; HTTP status handling belongs to
/// the [`Session`](crate::gateway::session::Session).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: GatewayRequest) -> Result<GatewayResponse, SubmitError>;
}

/// Transport backed by a reqwest client with Basic authentication
///
/// Cookies set by Knox (e.g. `hadoop.auth`, `JSESSIONID`) are kept for the life of the client.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base: Url,
    username: String,
    password: String,
}

impl ReqwestTransport {
    pub fn new(gateway: &GatewayConfig) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(gateway.insecure)
            .timeout(gateway.request_timeout)
            .build()
            .map_err(|err| SubmitError::Authentication {
                status: None,
                reason: format!("can't create HTTP client: {err}"),
            })?;

        Ok(ReqwestTransport {
            client,
            base: gateway.url.clone(),
            username: gateway.username.clone(),
            password: gateway.password.clone(),
        })
    }

    fn url(&self, request: &GatewayRequest) -> Result<Url, SubmitError> {
        gateway_url(&self.base, request)
            .map_err(|err| SubmitError::remote(request.step, None, format!("invalid request url: {err}")))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: GatewayRequest) -> Result<GatewayResponse, SubmitError> {
        let url = self.url(&request)?;
        let step = request.step;
        debug!("{step}: {} {url}", request.method);

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        };

        let mut builder = self
            .client
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
            .header(XSRF_HEADER, "valid");

        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| SubmitError::remote(step, None, err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| SubmitError::remote(step, Some(status), format!("can't read response body: {err}")))?;

        Ok(GatewayResponse::new(step, status, body))
    }
}

/// Join a request path and query onto the gateway base URL
///
/// The base URL keeps its own path (e.g. `/gateway/default`), unlike `Url::join`. Path segments
/// are percent-encoded, so `#`, `?` or spaces in a file name never leak into the fragment or query.
fn gateway_url(base: &Url, request: &GatewayRequest) -> Result<Url, String> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| format!("{base} can't carry a path"))?
        .pop_if_empty()
        .extend(request.path.trim_start_matches('/').split('/'));
    if !request.query.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(request.query.iter().map(|(key, value)| (*key, value.as_str())));
    }
    Ok(url)
}
