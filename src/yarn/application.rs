use std::fmt;

use log::{debug, info};
use serde::Deserialize;
use serde_json::json;

use crate::error::SubmitError;
use crate::gateway::response::GatewayRequest;
use crate::gateway::session::Session;
use crate::gateway::Step;
use crate::yarn::state::ApplicationState;

pub const APPS_PATH: &str = "/resourcemanager/v1/cluster/apps";
pub const NEW_APPLICATION_PATH: &str = "/resourcemanager/v1/cluster/apps/new-application";

/// Identifier handed out by the resource manager, e.g. `application_1460195242962_0054`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApplicationId(String);

impl ApplicationId {
    pub fn new(id: impl Into<String>) -> Self {
        ApplicationId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `.../apps/{id}/state`, read to track the application and written to kill it
    pub fn state_path(&self) -> String {
        format!("{APPS_PATH}/{}/state", self.0)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize)]
struct NewApplication {
    #[serde(rename = "application-id")]
    application_id: Option<String>,
    #[serde(rename = "maximum-resource-capability")]
    maximum_resource_capability: Option<ResourceCapability>,
}

#[derive(Debug, Deserialize)]
struct ResourceCapability {
    memory: u64,
    #[serde(rename = "vCores")]
    vcores: u64,
}

#[derive(Deserialize)]
struct AppState {
    state: Option<String>,
}

/// Ask the resource manager for a new application id
///
/// This allocates an application slot on the cluster that stays around until it is submitted to
/// or killed.
pub async fn create_new_app(session: &Session) -> Result<ApplicationId, SubmitError> {
    debug!("Creating new application ...");
    let request = GatewayRequest::post(Step::CreateNewApp, NEW_APPLICATION_PATH);
    let response = session.call(request).await?;
    let body: NewApplication = response.json()?;

    if let Some(capability) = &body.maximum_resource_capability {
        debug!("Maximum resource capability: {} MB, {} vCores", capability.memory, capability.vcores);
    }

    match body.application_id {
        Some(id) if !id.trim().is_empty() => {
            info!("New application id: {id}");
            Ok(ApplicationId::new(id))
        }
        _ => Err(SubmitError::remote(
            Step::CreateNewApp,
            Some(response.status()),
            "response has no application-id",
        )),
    }
}

/// Submit the rendered application submission context
pub async fn submit_app(session: &Session, payload: String) -> Result<(), SubmitError> {
    debug!("Submitting Spark Job ...");
    let request = GatewayRequest::post(Step::SubmitApplication, APPS_PATH).json(payload);
    let response = session.call(request).await?;
    info!("Application submitted (HTTP {})", response.status());
    Ok(())
}

/// Read the current state of an application
pub async fn track_app(session: &Session, app_id: &ApplicationId) -> Result<ApplicationState, SubmitError> {
    debug!("Tracking the app ...");
    let request = GatewayRequest::get(Step::ApplicationState, app_id.state_path());
    let response = session.call(request).await?;
    let body: AppState = response.json()?;

    let state = body
        .state
        .ok_or_else(|| SubmitError::remote(Step::ApplicationState, Some(response.status()), "response has no state"))?;
    state
        .parse()
        .map_err(|err: String| SubmitError::remote(Step::ApplicationState, Some(response.status()), err))
}

/// Ask the resource manager to kill an application
pub async fn kill_app(session: &Session, app_id: &ApplicationId) -> Result<(), SubmitError> {
    info!("Killing application {app_id}");
    let body = json!({ "state": ApplicationState::Killed }).to_string();
    let request = GatewayRequest::put(Step::KillApplication, app_id.state_path()).json(body);
    session.call(request).await?;
    Ok(())
}
