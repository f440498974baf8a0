// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row structs and row-to-domain reconstruction.
//!
//! Field maps and validation error lists are stored as JSON TEXT
//! columns; counters are stored as `BigInt` and converted back to
//! `usize` on read.

use diesel::prelude::*;
use num_traits::cast::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use wa_blast_domain::{
    BatchStatus, BulkBatch, DispatchState, Recipient, RecipientFields, ValidationState,
};

use crate::error::PersistenceError;

/// One row of the `bulk_batches` table.
#[derive(Debug, Clone, Queryable)]
pub struct BatchRow {
    pub batch_id: i64,
    pub owner_id: String,
    pub instance_id: String,
    pub name: String,
    pub template: String,
    pub delay_ms: i64,
    pub status: String,
    pub total_recipients: i64,
    pub sent_count: i64,
    pub failed_count: i64,
    pub cancel_requested: i32,
    pub failure_reason: Option<String>,
    pub created_at: Option<String>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}

/// One row of the `recipients` table.
#[derive(Debug, Clone, Queryable)]
pub struct RecipientRow {
    pub recipient_id: i64,
    pub batch_id: i64,
    pub row_index: i64,
    pub phone: String,
    pub fields_json: String,
    pub validation_state: String,
    pub validation_errors_json: String,
    pub dispatch_state: String,
    pub dispatch_error: Option<String>,
}

/// A tenant's quota ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Serialize, Deserialize)]
pub struct QuotaStatus {
    /// Internal row ID.
    #[serde(skip)]
    pub quota_id: i64,
    /// The metered tenant.
    pub owner_id: String,
    /// Total messages the tenant may send.
    pub message_limit: i64,
    /// Messages reserved so far.
    pub messages_used: i64,
}

impl QuotaStatus {
    /// Returns the number of messages the tenant may still send.
    #[must_use]
    pub const fn remaining(&self) -> i64 {
        self.message_limit.saturating_sub(self.messages_used)
    }
}

/// Converts a stored count back to `usize`.
fn count_to_usize(value: i64, column: &str) -> Result<usize, PersistenceError> {
    value.to_usize().ok_or_else(|| {
        PersistenceError::Other(format!("Stored count out of range for {column}: {value}"))
    })
}

impl BatchRow {
    /// Reconstructs the domain batch from this row.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored status string or a stored count
    /// is not valid.
    pub fn into_domain(self) -> Result<BulkBatch, PersistenceError> {
        let status: BatchStatus = BatchStatus::from_str(&self.status)
            .map_err(|e| PersistenceError::Other(e.to_string()))?;

        Ok(BulkBatch {
            batch_id: Some(self.batch_id),
            owner_id: self.owner_id,
            instance_id: self.instance_id,
            name: self.name,
            template: self.template,
            delay_ms: self.delay_ms.to_u64().unwrap_or(0),
            status,
            total_recipients: count_to_usize(self.total_recipients, "total_recipients")?,
            sent_count: count_to_usize(self.sent_count, "sent_count")?,
            failed_count: count_to_usize(self.failed_count, "failed_count")?,
            cancel_requested: self.cancel_requested != 0,
            failure_reason: self.failure_reason,
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
        })
    }
}

impl RecipientRow {
    /// Reconstructs the domain recipient from this row.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored state string or JSON column cannot
    /// be decoded.
    pub fn into_domain(self) -> Result<Recipient, PersistenceError> {
        let fields: RecipientFields = serde_json::from_str(&self.fields_json)?;
        let validation_errors: Vec<String> = serde_json::from_str(&self.validation_errors_json)?;
        let validation_state: ValidationState = ValidationState::from_str(&self.validation_state)
            .map_err(|e| PersistenceError::Other(e.to_string()))?;
        let dispatch_state: DispatchState = DispatchState::from_str(&self.dispatch_state)
            .map_err(|e| PersistenceError::Other(e.to_string()))?;

        Ok(Recipient {
            recipient_id: Some(self.recipient_id),
            row_index: count_to_usize(self.row_index, "row_index")?,
            phone: self.phone,
            fields,
            validation_state,
            validation_errors,
            dispatch_state,
            dispatch_error: self.dispatch_error,
        })
    }
}
