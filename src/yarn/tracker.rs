use std::time::{Duration, Instant};

use log::{info, warn};

use crate::error::SubmitError;
use crate::gateway::session::Session;
use crate::yarn::application::{track_app, ApplicationId};
use crate::yarn::state::ApplicationState;

/// How long and how often to poll an application's state
#[derive(Clone, Debug, PartialEq)]
pub struct PollPolicy {
    /// Polling ends successfully on the first state in this set
    pub stop_states: Vec<ApplicationState>,
    /// Delay after the first poll
    pub interval: Duration,
    pub max_interval: Duration,
    pub backoff_multiplier: f64,
    /// 0 = no attempt limit
    pub max_attempts: u32,
    /// Wall-clock budget for the whole loop
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            stop_states: vec![ApplicationState::Running, ApplicationState::Accepted],
            interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
            backoff_multiplier: 1.5,
            max_attempts: 0,
            timeout: Some(Duration::from_secs(600)),
        }
    }
}

impl PollPolicy {
    fn next_delay(&self, delay: Duration) -> Duration {
        Duration::from_secs_f64(delay.as_secs_f64() * self.backoff_multiplier).min(self.max_interval)
    }
}

/// Where polling ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tracked {
    pub state: ApplicationState,
    pub polls: u32,
}

/// Poll until the application reaches a stop state
///
/// The first poll is immediate. Fails with [`SubmitError::PollTimeout`] once the attempt or time
/// budget is spent, and with the underlying error as soon as one poll fails.
pub async fn track(session: &Session, app_id: &ApplicationId, policy: &PollPolicy) -> Result<Tracked, SubmitError> {
    let started = Instant::now();
    let mut delay = policy.interval;
    let mut polls = 0u32;

    loop {
        let state = track_app(session, app_id).await?;
        polls += 1;
        info!("Status: {state}");

        if policy.stop_states.contains(&state) {
            return Ok(Tracked { state, polls });
        }
        if state.is_final() {
            warn!("Application {app_id} is {state}, which is not a stop state, still polling");
        }

        let elapsed = started.elapsed();
        let out_of_attempts = policy.max_attempts > 0 && polls >= policy.max_attempts;
        let out_of_time = policy.timeout.is_some_and(|timeout| elapsed + delay > timeout);
        if out_of_attempts || out_of_time {
            return Err(SubmitError::PollTimeout { app_id: app_id.to_string(), attempts: polls, elapsed });
        }

        tokio::time::sleep(delay).await;
        delay = policy.next_delay(delay);
    }
}
