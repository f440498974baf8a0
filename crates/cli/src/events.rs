// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Dispatch progress events for operator observation.
//!
//! Events are facts emitted after the batch store has already recorded
//! the underlying change. They are informational only: dropping or
//! missing an event never affects dispatch, and the canonical state
//! always lives in the batch store.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Maximum number of events to buffer in the broadcast channel.
/// If observers cannot keep up, older events are dropped.
const EVENT_BUFFER_SIZE: usize = 100;

/// Dispatch lifecycle and per-message events.
///
/// Every variant carries an ISO 8601 `timestamp` so stream consumers
/// see one envelope shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchEvent {
    /// A dispatch loop claimed a batch and began sending.
    BatchStarted {
        /// The batch being dispatched.
        batch_id: i64,
        /// Count of recipients awaiting dispatch.
        total_recipients: usize,
        /// When the loop started.
        timestamp: String,
    },
    /// The provider accepted one message.
    MessageSent {
        /// The batch being dispatched.
        batch_id: i64,
        /// The recipient the message went to.
        recipient_id: i64,
        /// The recipient's canonical phone.
        phone: String,
        /// When the send was recorded.
        timestamp: String,
    },
    /// One send attempt failed; dispatch continues.
    MessageFailed {
        /// The batch being dispatched.
        batch_id: i64,
        /// The recipient the attempt targeted.
        recipient_id: i64,
        /// The recipient's canonical phone.
        phone: String,
        /// Provider or transport error detail.
        error: String,
        /// When the failure was recorded.
        timestamp: String,
    },
    /// Every dispatchable recipient was attempted.
    BatchCompleted {
        /// The finished batch.
        batch_id: i64,
        /// Recipients the provider accepted.
        sent_count: usize,
        /// Recipients whose send attempt failed.
        failed_count: usize,
        /// When the batch finished.
        timestamp: String,
    },
    /// The batch stopped on a batch-level fault.
    BatchFailed {
        /// The failed batch.
        batch_id: i64,
        /// Why dispatch stopped.
        reason: String,
        /// When the batch failed.
        timestamp: String,
    },
    /// A cancellation request stopped the batch.
    BatchCancelled {
        /// The cancelled batch.
        batch_id: i64,
        /// Recipients attempted before the stop.
        sent_count: usize,
        /// When the batch was cancelled.
        timestamp: String,
    },
}

/// Broadcaster for dispatch events.
///
/// A lightweight wrapper around `tokio::sync::broadcast` so multiple
/// observers (progress printers, tests) can watch one dispatch run.
#[derive(Clone)]
pub struct DispatchEventBroadcaster {
    /// The broadcast channel sender.
    tx: broadcast::Sender<DispatchEvent>,
}

impl DispatchEventBroadcaster {
    /// Creates a new event broadcaster.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Broadcasts an event to all observers.
    ///
    /// If no observers are subscribed, the event is silently dropped.
    pub fn broadcast(&self, event: &DispatchEvent) {
        match self.tx.send(event.clone()) {
            Ok(count) => {
                debug!(?event, receivers = count, "Broadcast dispatch event");
            }
            Err(_) => {
                // No receivers, which is fine
                debug!(?event, "No receivers for dispatch event");
            }
        }
    }

    /// Subscribes to the event stream.
    ///
    /// Events sent before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.tx.subscribe()
    }
}

impl Default for DispatchEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the current UTC time as an ISO 8601 string.
pub fn now_iso8601() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Iso8601::DEFAULT)
        .unwrap_or_else(|_| String::from("unknown"))
}
