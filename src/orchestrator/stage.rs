use std::fmt;

use log::{error, info};

use crate::error::SubmitError;

/// Where a submission run is
///
/// Stages only move forward, one at a time. Any failure ends the run in `Failed`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Init,
    Authenticated,
    ArtifactsResolved,
    AppRegistered,
    PayloadReady,
    Submitted,
    Polling,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Stage::Init => write!(f, "INIT"),
            Stage::Authenticated => write!(f, "AUTHENTICATED"),
            Stage::ArtifactsResolved => write!(f, "ARTIFACTS_RESOLVED"),
            Stage::AppRegistered => write!(f, "APP_REGISTERED"),
            Stage::PayloadReady => write!(f, "PAYLOAD_READY"),
            Stage::Submitted => write!(f, "SUBMITTED"),
            Stage::Polling => write!(f, "POLLING"),
            Stage::Done => write!(f, "DONE"),
            Stage::Failed => write!(f, "FAILED"),
        }
    }
}

/// Logs every stage transition of one run
#[derive(Debug)]
pub struct Progress {
    stage: Stage,
}

impl Default for Progress {
    fn default() -> Self {
        Progress::new()
    }
}

impl Progress {
    pub fn new() -> Self {
        Progress { stage: Stage::Init }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn advance(&mut self, next: Stage) {
        info!("{} -> {}", self.stage, next);
        self.stage = next;
    }

    pub fn fail(&mut self, err: &SubmitError) {
        error!("{} -> {}: {}", self.stage, Stage::Failed, err);
        self.stage = Stage::Failed;
    }
}
