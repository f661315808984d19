//! Request-state record for UI binding.
//!
//! A session owns one [`RequestState`] and mutates it only through the
//! transitions below. Conceptually there are two phases:
//! - `Idle`: nothing in flight, show `data` or `error`
//! - `InFlight`: a call is pending, show a spinner and keep stale `data`

use serde::{Deserialize, Serialize};

/// Phase derived from the `loading` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPhase {
    /// No call in flight.
    Idle,
    /// A call is pending.
    InFlight,
}

/// `{loading, error, data}` as exposed to callers.
///
/// `data` is kept while a new call is in flight and only replaced on
/// success; `error` is cleared when a call starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestState<T> {
    /// True between a call starting and settling.
    pub loading: bool,
    /// Message of the last failure.
    pub error: Option<String>,
    /// Payload of the last success.
    pub data: Option<T>,
}

impl<T> RequestState<T> {
    /// The initial, empty state.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            loading: false,
            error: None,
            data: None,
        }
    }

    /// Returns the phase implied by `loading`.
    #[must_use]
    pub const fn phase(&self) -> RequestPhase {
        if self.loading {
            RequestPhase::InFlight
        } else {
            RequestPhase::Idle
        }
    }

    /// Returns true if every field holds its initial value.
    #[must_use]
    pub const fn is_cleared(&self) -> bool {
        !self.loading && self.error.is_none() && self.data.is_none()
    }

    /// A call started: set `loading`, clear `error`, keep `data`.
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// A call succeeded with `data`; `error` is left as it is.
    pub fn succeed(&mut self, data: T) {
        self.data = Some(data);
    }

    /// A call failed with `message`; prior `data` is left alone.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// A call settled, whatever its outcome.
    pub const fn settle(&mut self) {
        self.loading = false;
    }

    /// Back to the initial state.
    pub fn clear(&mut self) {
        *self = Self::idle();
    }
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self::idle()
    }
}
