//! Request-state session.
//!
//! A [`RequestSession`] wraps an [`ApiClient`] and exposes the
//! `{loading, error, data}` record of its calls. It is the terminal consumer
//! of [`ApiError`]: failures are recorded and logged, never returned.

use std::sync::Arc;

use folio_domain::{ApiError, ApiResponse, RequestConfig, RequestState};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::api_client::ApiClient;
use crate::cancellation::CancellationReceiver;

/// Recorded when a failure carries no usable message.
pub const NETWORK_FAILURE_MESSAGE: &str = "Network request failed";

/// How settlements of overlapping calls on one session are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettlePolicy {
    /// Every settlement is applied; the last one to arrive wins and the
    /// first one clears `loading`.
    #[default]
    LastSettled,
    /// Only the most recently started call is applied. Calls superseded by
    /// a newer call or by [`RequestSession::reset`] are discarded.
    LatestInvoked,
}

struct Slot<T> {
    state: RequestState<T>,
    generation: u64,
    disposed: bool,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    updates: watch::Sender<RequestState<T>>,
    policy: SettlePolicy,
}

impl<T: Clone> Shared<T> {
    fn new(policy: SettlePolicy) -> Self {
        let (updates, _) = watch::channel(RequestState::idle());
        Self {
            slot: Mutex::new(Slot {
                state: RequestState::idle(),
                generation: 0,
                disposed: false,
            }),
            updates,
            policy,
        }
    }

    /// Marks a call as started and returns its ticket, or `None` once the
    /// session is disposed.
    fn begin(&self) -> Option<u64> {
        let mut slot = self.slot.lock();
        if slot.disposed {
            return None;
        }
        slot.generation += 1;
        slot.state.begin();
        self.updates.send_replace(slot.state.clone());
        Some(slot.generation)
    }

    /// Applies `change` on behalf of the call holding `ticket`. Returns false
    /// when the change was discarded.
    fn apply(&self, ticket: u64, change: impl FnOnce(&mut RequestState<T>)) -> bool {
        let mut slot = self.slot.lock();
        if slot.disposed {
            return false;
        }
        if self.policy == SettlePolicy::LatestInvoked && ticket != slot.generation {
            return false;
        }
        change(&mut slot.state);
        self.updates.send_replace(slot.state.clone());
        true
    }

    fn reset(&self) {
        let mut slot = self.slot.lock();
        if slot.disposed {
            return;
        }
        slot.generation += 1;
        slot.state.clear();
        self.updates.send_replace(slot.state.clone());
    }

    fn dispose(&self) {
        self.slot.lock().disposed = true;
    }

    fn snapshot(&self) -> RequestState<T> {
        self.slot.lock().state.clone()
    }
}

/// Clears `loading` when the call's future completes or is dropped.
struct SettleGuard<'a, T: Clone> {
    shared: &'a Shared<T>,
    ticket: u64,
}

impl<T: Clone> Drop for SettleGuard<'_, T> {
    fn drop(&mut self) {
        self.shared.apply(self.ticket, RequestState::settle);
    }
}

/// Stateful wrapper exposing `{loading, error, data}` for calls of type `T`.
///
/// Clones share the same state.
pub struct RequestSession<T> {
    client: ApiClient,
    shared: Arc<Shared<T>>,
}

impl<T> Clone for RequestSession<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> std::fmt::Debug for RequestSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSession")
            .field("client", &self.client)
            .field("policy", &self.shared.policy)
            .finish_non_exhaustive()
    }
}

impl<T> RequestSession<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Creates an idle session with [`SettlePolicy::LastSettled`].
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self::with_policy(client, SettlePolicy::default())
    }

    /// Creates an idle session with the given settle policy.
    #[must_use]
    pub fn with_policy(client: ApiClient, policy: SettlePolicy) -> Self {
        Self {
            client,
            shared: Arc::new(Shared::new(policy)),
        }
    }

    /// The settle policy.
    #[must_use]
    pub fn policy(&self) -> SettlePolicy {
        self.shared.policy
    }

    /// True while a call is in flight.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.shared.slot.lock().state.loading
    }

    /// Message of the last failure.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.shared.slot.lock().state.error.clone()
    }

    /// Payload of the last success.
    #[must_use]
    pub fn data(&self) -> Option<T> {
        self.shared.slot.lock().state.data.clone()
    }

    /// A copy of the whole record.
    #[must_use]
    pub fn snapshot(&self) -> RequestState<T> {
        self.shared.snapshot()
    }

    /// Watches state changes. The receiver starts at the current state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.shared.updates.subscribe()
    }

    /// True once [`dispose`](Self::dispose) was called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.shared.slot.lock().disposed
    }

    /// Sends `config` and records the outcome.
    ///
    /// Returns the full response on success and `None` on failure; the
    /// failure message is then available through [`error`](Self::error).
    pub async fn request(&self, config: RequestConfig) -> Option<ApiResponse<T>> {
        self.run(config, None).await
    }

    /// Like [`request`](Self::request), but gives up when `cancel` fires and
    /// records `"Request cancelled"`.
    pub async fn request_with_cancellation(
        &self,
        config: RequestConfig,
        cancel: CancellationReceiver,
    ) -> Option<ApiResponse<T>> {
        self.run(config, Some(cancel)).await
    }

    /// Returns the record to its initial state. Calls in flight are not
    /// cancelled.
    pub fn reset(&self) {
        self.shared.reset();
    }

    /// Ends the session: later updates are dropped and new calls are
    /// rejected without touching the network.
    pub fn dispose(&self) {
        tracing::debug!("request session disposed");
        self.shared.dispose();
    }

    async fn run(
        &self,
        config: RequestConfig,
        cancel: Option<CancellationReceiver>,
    ) -> Option<ApiResponse<T>> {
        let Some(ticket) = self.shared.begin() else {
            tracing::warn!(
                method = %config.method,
                url = %config.url,
                "request on a disposed session ignored"
            );
            return None;
        };
        let _settle = SettleGuard {
            shared: &*self.shared,
            ticket,
        };

        let outcome = match cancel {
            Some(mut cancel) => tokio::select! {
                result = self.client.request::<T>(&config) => result,
                () = cancel.cancelled() => Err(ApiError::cancelled().normalized()),
            },
            None => self.client.request::<T>(&config).await,
        };

        match outcome {
            Ok(response) => {
                let data = response.data.clone();
                self.shared.apply(ticket, |state| state.succeed(data));
                Some(response)
            }
            Err(error) => {
                let message = if error.message.trim().is_empty() {
                    NETWORK_FAILURE_MESSAGE.to_string()
                } else {
                    error.message
                };
                tracing::error!(
                    method = %config.method,
                    url = %config.url,
                    error = %message,
                    "request failed"
                );
                self.shared.apply(ticket, |state| state.fail(message));
                None
            }
        }
    }
}
