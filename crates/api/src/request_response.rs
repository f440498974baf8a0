// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response types for the batch query surface.

use serde::{Deserialize, Serialize};
use wa_blast::{IngestionStats, RowError};
use wa_blast_domain::{BulkBatch, Recipient, RecipientFields};
use wa_blast_persistence::QuotaStatus;

/// Request to create a bulk batch from an uploaded recipient source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatchRequest {
    /// The tenant creating the batch.
    pub owner_id: String,
    /// The provider instance to send through.
    pub instance_id: String,
    /// Operator-chosen display name.
    pub name: String,
    /// Message template with `{{field}}` placeholders.
    pub template: String,
    /// Delay between consecutive sends, in milliseconds.
    pub delay_ms: u64,
}

/// Response returned when a batch is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatchResponse {
    /// The ID assigned to the new batch.
    pub batch_id: i64,
    /// Count of valid recipients (the dispatchable population).
    pub total_recipients: usize,
    /// Rows whose phone failed normalization.
    pub invalid_count: usize,
    /// Rows repeating an earlier row's normalized phone.
    pub duplicate_count: usize,
    /// Advisory warnings about template placeholders no column fills.
    pub template_warnings: Vec<String>,
}

/// Consistent snapshot of one batch's status and progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStatusResponse {
    /// The batch ID.
    pub batch_id: i64,
    /// The owning tenant.
    pub owner_id: String,
    /// The provider instance the batch sends through.
    pub instance_id: String,
    /// Operator-chosen display name.
    pub name: String,
    /// Current lifecycle state.
    pub status: String,
    /// Whether the status is terminal; polling can stop once it is.
    pub terminal: bool,
    /// Count of valid recipients.
    pub total_recipients: usize,
    /// Recipients the provider accepted.
    pub sent_count: usize,
    /// Recipients whose send attempt failed.
    pub failed_count: usize,
    /// Dispatch progress as a percentage.
    pub progress: f64,
    /// Whether cancellation has been requested.
    pub cancel_requested: bool,
    /// Why the batch failed, when it did.
    pub failure_reason: Option<String>,
    /// When the batch row was created.
    pub created_at: Option<String>,
    /// When a dispatch loop claimed the batch.
    pub started_at: Option<String>,
    /// When the batch reached a terminal state.
    pub completed_at: Option<String>,
}

impl From<&BulkBatch> for BatchStatusResponse {
    fn from(batch: &BulkBatch) -> Self {
        Self {
            batch_id: batch.batch_id.unwrap_or_default(),
            owner_id: batch.owner_id.clone(),
            instance_id: batch.instance_id.clone(),
            name: batch.name.clone(),
            status: batch.status.to_string(),
            terminal: batch.status.is_terminal(),
            total_recipients: batch.total_recipients,
            sent_count: batch.sent_count,
            failed_count: batch.failed_count,
            progress: batch.progress(),
            cancel_requested: batch.cancel_requested,
            failure_reason: batch.failure_reason.clone(),
            created_at: batch.created_at.clone(),
            started_at: batch.started_at.clone(),
            completed_at: batch.completed_at.clone(),
        }
    }
}

/// A tenant's batches, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBatchesResponse {
    /// The tenant's batches.
    pub batches: Vec<BatchStatusResponse>,
}

/// Response returned when cancellation is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBatchResponse {
    /// The batch the cancellation targeted.
    pub batch_id: i64,
    /// The batch's status after the request was recorded.
    pub status: String,
}

/// Aggregate counts for one validation pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IngestionStatsInfo {
    /// Total data rows ingested.
    pub total: usize,
    /// Rows that normalized successfully and were first occurrences.
    pub valid: usize,
    /// Rows whose phone failed normalization.
    pub invalid: usize,
    /// Rows repeating an earlier row's normalized phone.
    pub duplicates: usize,
}

impl From<IngestionStats> for IngestionStatsInfo {
    fn from(stats: IngestionStats) -> Self {
        Self {
            total: stats.total,
            valid: stats.valid,
            invalid: stats.invalid,
            duplicates: stats.duplicates,
        }
    }
}

/// One valid recipient shown in the ingestion preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientPreview {
    /// Zero-based position of the row in the source.
    pub row_index: usize,
    /// The canonical phone.
    pub phone: String,
    /// The row's template fields in source column order.
    pub fields: RecipientFields,
}

impl From<&Recipient> for RecipientPreview {
    fn from(recipient: &Recipient) -> Self {
        Self {
            row_index: recipient.row_index,
            phone: recipient.phone.clone(),
            fields: recipient.fields.clone(),
        }
    }
}

/// Validation failures for one row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowErrorInfo {
    /// Zero-based position of the row in the source.
    pub row_index: usize,
    /// Human-readable failure reasons.
    pub errors: Vec<String>,
}

impl From<&RowError> for RowErrorInfo {
    fn from(row_error: &RowError) -> Self {
        Self {
            row_index: row_error.row_index,
            errors: row_error.errors.clone(),
        }
    }
}

/// Outcome of previewing an ingestion without creating a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionPreviewResponse {
    /// Aggregate counts.
    pub stats: IngestionStatsInfo,
    /// The first few valid recipients.
    pub preview: Vec<RecipientPreview>,
    /// Per-row validation failures, bounded.
    pub row_errors: Vec<RowErrorInfo>,
}

/// A tenant's quota ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaResponse {
    /// The tenant the quota belongs to.
    pub owner_id: String,
    /// Messages the subscription allows.
    pub message_limit: i64,
    /// Messages reserved so far.
    pub messages_used: i64,
    /// Messages still available.
    pub remaining: i64,
}

impl From<&QuotaStatus> for QuotaResponse {
    fn from(quota: &QuotaStatus) -> Self {
        Self {
            owner_id: quota.owner_id.clone(),
            message_limit: quota.message_limit,
            messages_used: quota.messages_used,
            remaining: quota.remaining(),
        }
    }
}
