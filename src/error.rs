use std::time::Duration;

use thiserror::Error;

use crate::gateway::Step;

/// Everything that can abort a submission run.
///
/// Every variant is fatal: errors surface to `main`, which logs them and exits non-zero.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("authentication against the gateway failed{}: {reason}", fmt_status(.status))]
    Authentication { status: Option<u16>, reason: String },

    #[error("no file status found for {path}")]
    NotFound { path: String },

    #[error("{step} failed{}: {reason}", fmt_status(.status))]
    Remote {
        step: Step,
        status: Option<u16>,
        reason: String,
    },

    #[error("can't render submission payload: {0}")]
    Template(String),

    #[error("application {app_id} still not in a stop state after {attempts} polls ({elapsed:?})")]
    PollTimeout {
        app_id: String,
        attempts: u32,
        elapsed: Duration,
    },
}

impl SubmitError {
    pub fn remote(step: Step, status: Option<u16>, reason: impl Into<String>) -> Self {
        SubmitError::Remote { step, status, reason: reason.into() }
    }

    /// Response body couldn't be read as the expected JSON shape
    pub fn malformed(step: Step, status: u16, err: impl std::fmt::Display) -> Self {
        SubmitError::remote(step, Some(status), format!("malformed response body: {err}"))
    }
}

/// Startup validation failures, reported before any remote call is made
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required option --{0}")]
    Missing(&'static str),

    #[error("invalid value for --{option}: {reason}")]
    Invalid { option: &'static str, reason: String },

    #[error("can't read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("can't parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}
