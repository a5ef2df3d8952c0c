// SPDX-License-Identifier: MPL-2.0
//! Process-wide typed broadcast.
//!
//! [`EventBus`] is a cheap-to-clone handle around a `tokio` broadcast channel.
//! Publishing never blocks and never fails: with no subscribers the event is
//! simply dropped. Every subscriber sees every event published after it
//! subscribed.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events buffered per subscriber before the slowest one starts lagging.
const DEFAULT_CAPACITY: usize = 64;

/// Raised when the API rejects a call with `401 Unauthorized`.
///
/// Consumers typically prompt for a new access key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKeyRequired {
    pub message: String,
}

impl AccessKeyRequired {
    /// Event name used by the dashboard.
    pub const NAME: &'static str = "nginxpulse:access-key-required";

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBus<E> {
    sender: broadcast::Sender<E>,
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> EventBus<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Dispatches `event` to all current subscribers.
    ///
    /// Returns how many subscribers it reached; zero is not an error.
    pub fn publish(&self, event: E) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
