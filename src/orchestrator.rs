//! The submission pipeline
//!
//! One run logs in, resolves the artifacts, registers an application, renders and submits its
//! submission document, then polls its state. Steps run strictly in that order and the first
//! failure ends the run.

use std::sync::Arc;

use log::{info, warn};

use crate::config::Config;
use crate::error::SubmitError;
use crate::gateway::session::Session;
use crate::gateway::transport::Transport;
use crate::hdfs::artifacts::{resolve, Artifacts};
use crate::submission::document;
use crate::submission::kerberos::kerberos_options;
use crate::submission::model::{SubmissionModel, SubmissionOptions};
use crate::yarn::application::{create_new_app, kill_app, submit_app, ApplicationId};
use crate::yarn::state::ApplicationState;
use crate::yarn::tracker::track;

/// Stage tracking for a run
pub mod stage;

use stage::{Progress, Stage};

/// Stands in for a real application id in dry runs
pub const DRY_RUN_APP_ID: &str = "application_0000000000000_0000";

/// How a successful run ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub app_id: ApplicationId,
    pub state: ApplicationState,
    pub polls: u32,
}

pub struct JobSubmitter {
    transport: Arc<dyn Transport>,
    config: Config,
}

impl JobSubmitter {
    pub fn new(transport: Arc<dyn Transport>, config: Config) -> Self {
        JobSubmitter { transport, config }
    }

    /// Submit the job and wait for it to reach a stop state
    pub async fn run(&self) -> Result<Outcome, SubmitError> {
        let mut progress = Progress::new();
        match self.submit(&mut progress).await {
            Ok(outcome) => {
                progress.advance(Stage::Done);
                Ok(outcome)
            }
            Err(err) => {
                progress.fail(&err);
                Err(err)
            }
        }
    }

    /// Render the submission document without registering or submitting anything
    pub async fn dry_run(&self) -> Result<String, SubmitError> {
        info!("Dry run, no application will be registered");
        let session = Session::login(self.transport.clone()).await?;
        let artifacts = resolve(&session, &self.config.artifacts).await?;
        self.render(&ApplicationId::new(DRY_RUN_APP_ID), &artifacts)
    }

    async fn submit(&self, progress: &mut Progress) -> Result<Outcome, SubmitError> {
        let session = Session::login(self.transport.clone()).await?;
        progress.advance(Stage::Authenticated);

        let artifacts = resolve(&session, &self.config.artifacts).await?;
        progress.advance(Stage::ArtifactsResolved);

        let app_id = create_new_app(&session).await?;
        progress.advance(Stage::AppRegistered);

        let launched = self.launch(&session, &app_id, &artifacts, progress).await;
        if let Err(err) = &launched {
            if self.config.kill_on_failure {
                self.kill(&session, &app_id, err).await;
            }
        }
        launched
    }

    async fn launch(
        &self,
        session: &Session,
        app_id: &ApplicationId,
        artifacts: &Artifacts,
        progress: &mut Progress,
    ) -> Result<Outcome, SubmitError> {
        let payload = self.render(app_id, artifacts)?;
        progress.advance(Stage::PayloadReady);

        submit_app(session, payload).await?;
        progress.advance(Stage::Submitted);

        progress.advance(Stage::Polling);
        let tracked = track(session, app_id, &self.config.poll).await?;

        Ok(Outcome { app_id: app_id.clone(), state: tracked.state, polls: tracked.polls })
    }

    fn render(&self, app_id: &ApplicationId, artifacts: &Artifacts) -> Result<String, SubmitError> {
        let model = SubmissionModel::new(app_id, &self.config.app, artifacts, kerberos_options(&self.config.kerberos));
        document::render(&model, &SubmissionOptions::from(&self.config.app))
    }

    /// Best effort, a failed kill is logged and the original error is kept
    async fn kill(&self, session: &Session, app_id: &ApplicationId, cause: &SubmitError) {
        warn!("Killing application {app_id} after failure: {cause}");
        if let Err(err) = kill_app(session, app_id).await {
            warn!("Application {app_id} may be left behind: {err}");
        }
    }
}
