//! Thin HTTP layer over the Knox gateway
//!
//! Remote calls go through the [`Transport`](transport::Transport) trait so the whole submission
//! pipeline can be driven by an in-memory gateway in tests. Every call hands back a
//! [`GatewayResponse`](response::GatewayResponse), which is released when dropped.

use std::fmt;

/// Requests and RAII responses exchanged with the gateway
pub mod response;
/// Authenticated session shared by every remote call
pub mod session;
/// Transport trait and the reqwest implementation
pub mod transport;
#[cfg(test)]
pub mod mock;

/// The remote call a request belongs to, used in logs and error reports
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Login,
    FindStatus,
    CreateNewApp,
    SubmitApplication,
    ApplicationState,
    KillApplication,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Step::Login => write!(f, "login"),
            Step::FindStatus => write!(f, "findStatus"),
            Step::CreateNewApp => write!(f, "createNewApp"),
            Step::SubmitApplication => write!(f, "submitApp"),
            Step::ApplicationState => write!(f, "trackApp"),
            Step::KillApplication => write!(f, "killApp"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
        }
    }
}
