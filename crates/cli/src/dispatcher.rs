// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The dispatch runtime.
//!
//! Each batch is dispatched by one sequential loop: claim the batch,
//! then walk its dispatchable recipients in canonical row order,
//! reserving quota, rendering the template, sending, and recording the
//! outcome one recipient at a time with a fixed delay between sends.
//! Batches run concurrently with each other under a semaphore cap, but
//! never concurrently with themselves; the `pending -> processing`
//! claim guarantees that.
//!
//! Stop conditions, in the order they are checked between sends:
//! cancellation (batch becomes `cancelled`, the in-flight send always
//! finishes first), quota denial (batch becomes `failed`), recipient
//! exhaustion (batch becomes `completed`). A failed send is recorded on
//! the recipient and never stops the loop.

use crate::events::{DispatchEvent, DispatchEventBroadcaster, now_iso8601};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::{info, warn};
use wa_blast::{ProviderTransport, QuotaGuard, SendOutcome};
use wa_blast_domain::{BulkBatch, Recipient, render};
use wa_blast_persistence::{PersistenceError, SqlitePersistence};

/// Failure reason recorded when the quota guard denies a reservation.
const QUOTA_EXHAUSTED_REASON: &str = "Message quota exhausted";

/// Dispatch runtime over a shared batch store.
pub struct Dispatcher {
    /// The shared batch store.
    persistence: Arc<Mutex<SqlitePersistence>>,
    /// Delivers rendered messages to the provider.
    transport: Arc<dyn ProviderTransport>,
    /// Reserves per-tenant message allotment before each send.
    quota: Arc<dyn QuotaGuard>,
    /// Emits progress events for observers.
    events: DispatchEventBroadcaster,
    /// Caps how many batches dispatch concurrently.
    batch_permits: Arc<Semaphore>,
}

impl Dispatcher {
    /// Creates a dispatcher.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The shared batch store
    /// * `transport` - The provider transport
    /// * `quota` - The quota guard
    /// * `max_concurrent_batches` - Cap on concurrently dispatching batches
    #[must_use]
    pub fn new(
        persistence: Arc<Mutex<SqlitePersistence>>,
        transport: Arc<dyn ProviderTransport>,
        quota: Arc<dyn QuotaGuard>,
        max_concurrent_batches: usize,
    ) -> Self {
        Self {
            persistence,
            transport,
            quota,
            events: DispatchEventBroadcaster::new(),
            batch_permits: Arc::new(Semaphore::new(max_concurrent_batches.max(1))),
        }
    }

    /// Subscribes to dispatch progress events.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<DispatchEvent> {
        self.events.subscribe()
    }

    /// Dispatches every pending batch, oldest first.
    ///
    /// Batches run concurrently up to the configured cap; the call
    /// returns once every batch has reached a terminal state.
    ///
    /// # Errors
    ///
    /// Returns the first persistence error any batch loop hit.
    pub async fn run_pending(self: &Arc<Self>) -> Result<(), PersistenceError> {
        let batch_ids: Vec<i64> = self.persistence.lock().await.list_pending_batch_ids()?;

        if batch_ids.is_empty() {
            info!("No pending batches");
            return Ok(());
        }

        let tasks = batch_ids.into_iter().map(|batch_id| {
            let dispatcher: Arc<Self> = Arc::clone(self);
            tokio::spawn(async move { dispatcher.dispatch_batch(batch_id).await })
        });

        for joined in join_all(tasks).await {
            match joined {
                Ok(result) => result?,
                Err(err) => {
                    return Err(PersistenceError::Other(format!(
                        "Dispatch task panicked: {err}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Dispatches one batch to a terminal state.
    ///
    /// Losing the claim is not an error: the batch was already taken by
    /// another loop or cancelled, and this call returns quietly.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch store fails mid-loop.
    pub async fn dispatch_batch(&self, batch_id: i64) -> Result<(), PersistenceError> {
        let _permit = self
            .batch_permits
            .acquire()
            .await
            .map_err(|err| PersistenceError::Other(format!("Dispatch semaphore closed: {err}")))?;

        let (batch, recipients) = {
            let mut persistence = self.persistence.lock().await;

            if !persistence.claim_batch(batch_id)? {
                info!(batch_id, "Batch no longer pending, skipping");
                return Ok(());
            }

            let batch: BulkBatch = persistence.get_batch(batch_id)?;
            let recipients: Vec<Recipient> = persistence.get_dispatchable_recipients(batch_id)?;
            (batch, recipients)
        };

        info!(
            batch_id,
            owner_id = %batch.owner_id,
            recipients = recipients.len(),
            delay_ms = batch.delay_ms,
            "Dispatching batch"
        );

        self.events.broadcast(&DispatchEvent::BatchStarted {
            batch_id,
            total_recipients: recipients.len(),
            timestamp: now_iso8601(),
        });

        self.run_batch_loop(batch_id, &batch, &recipients).await
    }

    /// The sequential per-batch send loop.
    async fn run_batch_loop(
        &self,
        batch_id: i64,
        batch: &BulkBatch,
        recipients: &[Recipient],
    ) -> Result<(), PersistenceError> {
        for (position, recipient) in recipients.iter().enumerate() {
            if position > 0 && batch.delay_ms > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(batch.delay_ms)).await;
            }

            // Cancellation is observed between sends; an in-flight send
            // always finishes and is counted.
            if self.persistence.lock().await.is_cancel_requested(batch_id)? {
                return self.finish_cancelled(batch_id).await;
            }

            let decision = self.quota.check_and_reserve(&batch.owner_id, 1).await;
            if !decision.allowed {
                return self.finish_failed(batch_id, QUOTA_EXHAUSTED_REASON).await;
            }

            let recipient_id: i64 = recipient.recipient_id.ok_or_else(|| {
                PersistenceError::Other(format!(
                    "Recipient at row {} has no database ID",
                    recipient.row_index
                ))
            })?;

            let body: String = render(&batch.template, &recipient.phone, &recipient.fields);
            let outcome: SendOutcome = self
                .transport
                .send(&batch.instance_id, &recipient.phone, &body)
                .await;

            let mut persistence = self.persistence.lock().await;
            if outcome.success {
                persistence.record_send_success(batch_id, recipient_id)?;
                drop(persistence);
                self.events.broadcast(&DispatchEvent::MessageSent {
                    batch_id,
                    recipient_id,
                    phone: recipient.phone.clone(),
                    timestamp: now_iso8601(),
                });
            } else {
                let error: String = outcome
                    .error
                    .unwrap_or_else(|| String::from("Send failed without detail"));
                persistence.record_send_failure(batch_id, recipient_id, &error)?;
                drop(persistence);
                warn!(batch_id, recipient_id, phone = %recipient.phone, error = %error, "Send failed");
                self.events.broadcast(&DispatchEvent::MessageFailed {
                    batch_id,
                    recipient_id,
                    phone: recipient.phone.clone(),
                    error,
                    timestamp: now_iso8601(),
                });
            }
        }

        self.finish_completed(batch_id).await
    }

    /// Finalizes a batch whose dispatchable recipients are exhausted.
    async fn finish_completed(&self, batch_id: i64) -> Result<(), PersistenceError> {
        let mut persistence = self.persistence.lock().await;
        persistence.mark_completed(batch_id)?;
        let batch: BulkBatch = persistence.get_batch(batch_id)?;
        drop(persistence);

        info!(
            batch_id,
            sent = batch.sent_count,
            failed = batch.failed_count,
            "Batch completed"
        );
        self.events.broadcast(&DispatchEvent::BatchCompleted {
            batch_id,
            sent_count: batch.sent_count,
            failed_count: batch.failed_count,
            timestamp: now_iso8601(),
        });

        Ok(())
    }

    /// Finalizes a batch stopped by a cancellation request.
    async fn finish_cancelled(&self, batch_id: i64) -> Result<(), PersistenceError> {
        let mut persistence = self.persistence.lock().await;
        persistence.mark_cancelled(batch_id)?;
        let batch: BulkBatch = persistence.get_batch(batch_id)?;
        drop(persistence);

        info!(batch_id, sent = batch.sent_count, "Batch cancelled");
        self.events.broadcast(&DispatchEvent::BatchCancelled {
            batch_id,
            sent_count: batch.sent_count,
            timestamp: now_iso8601(),
        });

        Ok(())
    }

    /// Finalizes a batch stopped by a batch-level fault.
    async fn finish_failed(&self, batch_id: i64, reason: &str) -> Result<(), PersistenceError> {
        self.persistence
            .lock()
            .await
            .mark_failed(batch_id, reason)?;

        warn!(batch_id, reason, "Batch failed");
        self.events.broadcast(&DispatchEvent::BatchFailed {
            batch_id,
            reason: reason.to_string(),
            timestamp: now_iso8601(),
        });

        Ok(())
    }
}
