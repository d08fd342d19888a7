//! Scripted in-memory gateway for tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::SubmitError;
use crate::gateway::response::{GatewayRequest, GatewayResponse};
use crate::gateway::transport::Transport;
use crate::gateway::{Method, Step};

/// Answers requests from per-route queues of canned responses
///
/// A route's responses are handed out in order and the last one repeats. A request without a
/// route fails like an unreachable host. Every response handed out is counted as opened and
/// counted again as released when dropped.
#[derive(Default)]
pub struct MockGateway {
    routes: Mutex<HashMap<(Method, String), VecDeque<(u16, String)>>>,
    requests: Mutex<Vec<GatewayRequest>>,
    opened: AtomicUsize,
    released: Arc<AtomicUsize>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back((status, body.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self, step: Step) -> usize {
        self.requests.lock().unwrap().iter().filter(|r| r.step == step).count()
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockGateway {
    async fn send(&self, request: GatewayRequest) -> Result<GatewayResponse, SubmitError> {
        let step = request.step;
        let key = (request.method, request.path.clone());
        self.requests.lock().unwrap().push(request);

        let canned = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        let (status, body) = canned.ok_or_else(|| SubmitError::remote(step, None, "connection refused"))?;

        self.opened.fetch_add(1, Ordering::SeqCst);
        let released = self.released.clone();
        Ok(GatewayResponse::new(step, status, body).on_release(move || {
            released.fetch_add(1, Ordering::SeqCst);
        }))
    }
}
