//! Scripted transport and credential store shared by the unit tests.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use folio_domain::ResponseSpec;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::ports::{
    CredentialError, CredentialStore, HttpTransport, PreparedRequest, TransportError,
};

type Outcome = Result<ResponseSpec, TransportError>;

enum Step {
    Ready(Outcome),
    Gated(oneshot::Receiver<Outcome>),
}

/// Replays queued outcomes in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    seen: Mutex<Vec<PreparedRequest>>,
}

/// Releases a gated step.
pub struct Gate(oneshot::Sender<Outcome>);

impl Gate {
    pub fn respond_json(self, status: u16, body: &Value) {
        let _ = self.0.send(Ok(json_response(status, body)));
    }

    pub fn fail(self, error: TransportError) {
        let _ = self.0.send(Err(error));
    }
}

fn json_response(status: u16, body: &Value) -> ResponseSpec {
    let bytes = serde_json::to_vec(body).unwrap_or_default();
    ResponseSpec::new(status, bytes, Duration::from_millis(5))
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: u16, body: &Value) {
        self.steps
            .lock()
            .push_back(Step::Ready(Ok(json_response(status, body))));
    }

    pub fn push_raw(&self, status: u16, body: Vec<u8>) {
        self.steps.lock().push_back(Step::Ready(Ok(ResponseSpec::new(
            status,
            body,
            Duration::from_millis(5),
        ))));
    }

    pub fn push_error(&self, error: TransportError) {
        self.steps.lock().push_back(Step::Ready(Err(error)));
    }

    /// Queues a step that waits until the returned gate is released.
    pub fn push_gated(&self) -> Gate {
        let (sender, receiver) = oneshot::channel();
        self.steps.lock().push_back(Step::Gated(receiver));
        Gate(sender)
    }

    pub fn last_request(&self) -> Option<PreparedRequest> {
        self.seen.lock().last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.seen.lock().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: PreparedRequest) -> Result<ResponseSpec, TransportError> {
        self.seen.lock().push(request);
        let step = self.steps.lock().pop_front();
        match step {
            Some(Step::Ready(outcome)) => outcome,
            Some(Step::Gated(receiver)) => receiver
                .await
                .unwrap_or_else(|_| Err(TransportError::Network("gate dropped".to_string()))),
            None => Err(TransportError::Network("no scripted response".to_string())),
        }
    }
}

/// Credential store whose every operation fails with an I/O error.
pub struct FailingStore;

fn unavailable() -> CredentialError {
    CredentialError::Io(std::io::Error::other("credential storage unavailable"))
}

#[async_trait]
impl CredentialStore for FailingStore {
    async fn get(&self) -> Result<Option<String>, CredentialError> {
        Err(unavailable())
    }

    async fn set(&self, _token: &str) -> Result<(), CredentialError> {
        Err(unavailable())
    }

    async fn clear(&self) -> Result<(), CredentialError> {
        Err(unavailable())
    }
}
