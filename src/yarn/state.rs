use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationState {
    New,
    NewSaving,
    Submitted,
    Accepted,
    Running,
    Finished,
    Failed,
    Killed,
}

impl ApplicationState {
    pub const ALL: [ApplicationState; 8] = [
        ApplicationState::New,
        ApplicationState::NewSaving,
        ApplicationState::Submitted,
        ApplicationState::Accepted,
        ApplicationState::Running,
        ApplicationState::Finished,
        ApplicationState::Failed,
        ApplicationState::Killed,
    ];

    /// The application will never change state again
    pub fn is_final(&self) -> bool {
        matches!(self, ApplicationState::Finished | ApplicationState::Failed | ApplicationState::Killed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationState::New => "NEW",
            ApplicationState::NewSaving => "NEW_SAVING",
            ApplicationState::Submitted => "SUBMITTED",
            ApplicationState::Accepted => "ACCEPTED",
            ApplicationState::Running => "RUNNING",
            ApplicationState::Finished => "FINISHED",
            ApplicationState::Failed => "FAILED",
            ApplicationState::Killed => "KILLED",
        }
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApplicationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        ApplicationState::ALL
            .into_iter()
            .find(|state| state.as_str() == wanted)
            .ok_or_else(|| format!("unknown application state {s}"))
    }
}
