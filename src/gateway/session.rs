use std::sync::Arc;

use log::info;
use serde::Deserialize;

use crate::error::SubmitError;
use crate::gateway::response::{GatewayRequest, GatewayResponse};
use crate::gateway::transport::Transport;
use crate::gateway::Step;

/// Cheapest authenticated call available through the gateway, used to check credentials
pub const LOGIN_PATH: &str = "/webhdfs/v1/";

/// Authenticated handle to the gateway
///
/// Read-only once created and cheap to clone, the transport is shared between clones. Dropping
/// the last clone closes the underlying connections.
#[derive(Clone)]
pub struct Session {
    transport: Arc<dyn Transport>,
}

impl Session {
    /// Log in once, checking the credentials with a home directory lookup
    pub async fn login(transport: Arc<dyn Transport>) -> Result<Session, SubmitError> {
        info!("Logging in to gateway");
        let request = GatewayRequest::get(Step::Login, LOGIN_PATH).query("op", "GETHOMEDIRECTORY");
        let response = transport
            .send(request)
            .await
            .map_err(|err| SubmitError::Authentication { status: None, reason: err.to_string() })?;

        if !response.is_success() {
            let reason = match response.status() {
                401 | 403 => "credentials rejected".to_string(),
                _ => remote_reason(&response),
            };
            return Err(SubmitError::Authentication { status: Some(response.status()), reason });
        }

        info!("Logged in");
        Ok(Session { transport })
    }

    /// Send a request, any non-2xx status is a remote error for the request's step
    pub async fn call(&self, request: GatewayRequest) -> Result<GatewayResponse, SubmitError> {
        let step = request.step;
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(SubmitError::remote(step, Some(response.status()), remote_reason(&response)));
        }
        Ok(response)
    }
}

/// Hadoop services report failures as `{"RemoteException": {"exception": ..., "message": ...}}`
#[derive(Deserialize)]
struct RemoteExceptionBody {
    #[serde(rename = "RemoteException")]
    remote_exception: RemoteException,
}

#[derive(Deserialize)]
struct RemoteException {
    #[serde(default)]
    exception: String,
    #[serde(default)]
    message: String,
}

fn remote_reason(response: &GatewayResponse) -> String {
    if let Ok(body) = serde_json::from_str::<RemoteExceptionBody>(response.body()) {
        let RemoteException { exception, message } = body.remote_exception;
        return format!("{exception}: {message}");
    }
    let body = response.body().trim();
    match body.char_indices().nth(200) {
        Some((end, _)) => format!("{} ...", &body[..end]),
        None if body.is_empty() => "unexpected status".to_string(),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockGateway;
    use crate::gateway::Method;

    #[tokio::test]
    async fn login_reads_home_directory() {
        let gateway = Arc::new(MockGateway::new());
        gateway.respond(Method::Get, LOGIN_PATH, 200, r#"{"Path":"/user/knox"}"#);

        Session::login(gateway.clone()).await.unwrap();

        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query, vec![("op", "GETHOMEDIRECTORY".to_string())]);
        assert_eq!(gateway.opened(), gateway.released());
    }

    #[tokio::test]
    async fn rejected_credentials_fail_authentication() {
        let gateway = Arc::new(MockGateway::new());
        gateway.respond(Method::Get, LOGIN_PATH, 401, "");

        let err = Session::login(gateway.clone()).await.err().unwrap();

        assert!(matches!(err, SubmitError::Authentication { status: Some(401), .. }));
        assert_eq!(gateway.released(), 1);
    }

    #[tokio::test]
    async fn unexpected_login_status_fails_authentication() {
        let gateway = Arc::new(MockGateway::new());
        gateway.respond(Method::Get, LOGIN_PATH, 404, "Not Found");

        let err = Session::login(gateway.clone()).await.err().unwrap();

        assert!(matches!(
            err,
            SubmitError::Authentication { status: Some(404), ref reason } if reason == "Not Found"
        ));
        assert_eq!(gateway.opened(), 1);
        assert_eq!(gateway.released(), 1);
    }

    #[tokio::test]
    async fn unreachable_gateway_fails_authentication() {
        let gateway = Arc::new(MockGateway::new());

        let err = Session::login(gateway).await.err().unwrap();

        assert!(matches!(err, SubmitError::Authentication { status: None, .. }));
    }

    #[tokio::test]
    async fn non_2xx_is_a_remote_error_with_hadoop_message() {
        let gateway = Arc::new(MockGateway::new());
        gateway.respond(Method::Get, LOGIN_PATH, 200, "{}");
        gateway.respond(
            Method::Post,
            "/resourcemanager/v1/cluster/apps",
            400,
            r#"{"RemoteException":{"exception":"BadRequestException","message":"bad app"}}"#,
        );
        let session = Session::login(gateway.clone()).await.unwrap();

        let request = GatewayRequest::post(Step::SubmitApplication, "/resourcemanager/v1/cluster/apps");
        let err = session.call(request).await.err().unwrap();

        match err {
            SubmitError::Remote { step, status, reason } => {
                assert_eq!(step, Step::SubmitApplication);
                assert_eq!(status, Some(400));
                assert_eq!(reason, "BadRequestException: bad app");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(gateway.opened(), 2);
        assert_eq!(gateway.released(), 2);
    }
}
