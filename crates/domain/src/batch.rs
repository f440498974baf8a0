// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The bulk batch aggregate.

use crate::batch_status::BatchStatus;
use serde::{Deserialize, Serialize};

/// One bulk-send campaign: a template, a sending instance, and the
/// recipient list dispatched under a fixed inter-message delay.
///
/// Counters obey `sent_count + failed_count <= total_recipients`;
/// `total_recipients` counts only recipients that passed validation
/// and deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkBatch {
    /// Database identifier; `None` until persisted.
    pub batch_id: Option<i64>,
    /// Tenant that owns the batch.
    pub owner_id: String,
    /// Provider instance used for sending.
    pub instance_id: String,
    /// Operator-chosen display name.
    pub name: String,
    /// Message template with `{{field}}` placeholders.
    pub template: String,
    /// Fixed delay between consecutive sends, in milliseconds.
    pub delay_ms: u64,
    /// Current lifecycle state.
    pub status: BatchStatus,
    /// Count of valid recipients (the dispatchable population).
    pub total_recipients: usize,
    /// Recipients the provider accepted.
    pub sent_count: usize,
    /// Recipients whose send attempt failed.
    pub failed_count: usize,
    /// Durable cancellation marker observed by the dispatch loop.
    pub cancel_requested: bool,
    /// Why the batch failed; set only for `BatchStatus::Failed`.
    pub failure_reason: Option<String>,
    /// When the batch row was created.
    pub created_at: Option<String>,
    /// When a dispatch loop claimed the batch.
    pub started_at: Option<String>,
    /// When the batch reached a terminal state.
    pub completed_at: Option<String>,
}

impl BulkBatch {
    /// Creates a new pending batch awaiting persistence.
    ///
    /// # Arguments
    ///
    /// * `owner_id` - The owning tenant
    /// * `instance_id` - The provider instance to send through
    /// * `name` - Operator-chosen display name
    /// * `template` - Message template with `{{field}}` placeholders
    /// * `delay_ms` - Delay between consecutive sends, in milliseconds
    /// * `total_recipients` - Count of valid recipients in the batch
    #[must_use]
    pub const fn new(
        owner_id: String,
        instance_id: String,
        name: String,
        template: String,
        delay_ms: u64,
        total_recipients: usize,
    ) -> Self {
        Self {
            batch_id: None,
            owner_id,
            instance_id,
            name,
            template,
            delay_ms,
            status: BatchStatus::Pending,
            total_recipients,
            sent_count: 0,
            failed_count: 0,
            cancel_requested: false,
            failure_reason: None,
            created_at: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Returns the number of recipients attempted so far.
    #[must_use]
    pub const fn attempted_count(&self) -> usize {
        self.sent_count + self.failed_count
    }

    /// Returns dispatch progress as a percentage.
    ///
    /// Derived as `(sent_count + failed_count) / total_recipients * 100`,
    /// or 0 when the batch has no recipients.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.total_recipients == 0 {
            return 0.0;
        }
        // Counts saturate at u32::MAX; progress is a display value.
        let attempted: u32 = u32::try_from(self.attempted_count()).unwrap_or(u32::MAX);
        let total: u32 = u32::try_from(self.total_recipients).unwrap_or(u32::MAX);
        f64::from(attempted) / f64::from(total) * 100.0
    }
}
