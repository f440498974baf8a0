// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Batch lifecycle mutations.
//!
//! Every status change here is a conditional update guarded by the
//! status the transition is legal from. The guard is what enforces the
//! lifecycle at the storage layer: a lost claim or a finalization
//! racing a cancellation simply updates zero rows.

use diesel::SqliteConnection;
use diesel::prelude::*;
use std::str::FromStr;
use tracing::{debug, info};
use wa_blast_domain::{BatchStatus, BulkBatch, Recipient};

use crate::diesel_schema::{bulk_batches, recipients};
use crate::error::PersistenceError;
use crate::sqlite::get_last_insert_rowid;

/// SQL fragment for server-side timestamps on nullable TEXT columns.
macro_rules! current_timestamp {
    () => {
        diesel::dsl::sql::<diesel::sql_types::Nullable<diesel::sql_types::Text>>(
            "CURRENT_TIMESTAMP",
        )
    };
}

/// Creates a batch together with all of its recipients.
///
/// The batch row and every recipient row are inserted in one
/// transaction; a failure leaves no partial batch behind.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `batch` - The batch to persist (status must be pending)
/// * `batch_recipients` - Every classified row from ingestion, in
///   canonical order
///
/// # Returns
///
/// The batch ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the insert fails or a field map cannot be
/// serialized.
pub fn create_batch(
    conn: &mut SqliteConnection,
    batch: &BulkBatch,
    batch_recipients: &[Recipient],
) -> Result<i64, PersistenceError> {
    info!(
        owner_id = %batch.owner_id,
        instance_id = %batch.instance_id,
        total_recipients = batch.total_recipients,
        "Creating bulk batch: {}",
        batch.name
    );

    conn.transaction::<i64, PersistenceError, _>(|conn| {
        diesel::insert_into(bulk_batches::table)
            .values((
                bulk_batches::owner_id.eq(&batch.owner_id),
                bulk_batches::instance_id.eq(&batch.instance_id),
                bulk_batches::name.eq(&batch.name),
                bulk_batches::template.eq(&batch.template),
                bulk_batches::delay_ms.eq(i64::try_from(batch.delay_ms).unwrap_or(i64::MAX)),
                bulk_batches::status.eq(batch.status.as_str()),
                bulk_batches::total_recipients
                    .eq(i64::try_from(batch.total_recipients).unwrap_or(i64::MAX)),
            ))
            .execute(conn)?;

        let batch_id: i64 = get_last_insert_rowid(conn)?;

        for recipient in batch_recipients {
            let fields_json: String = serde_json::to_string(&recipient.fields)?;
            let errors_json: String = serde_json::to_string(&recipient.validation_errors)?;

            diesel::insert_into(recipients::table)
                .values((
                    recipients::batch_id.eq(batch_id),
                    recipients::row_index
                        .eq(i64::try_from(recipient.row_index).unwrap_or(i64::MAX)),
                    recipients::phone.eq(&recipient.phone),
                    recipients::fields_json.eq(&fields_json),
                    recipients::validation_state.eq(recipient.validation_state.as_str()),
                    recipients::validation_errors_json.eq(&errors_json),
                    recipients::dispatch_state.eq(recipient.dispatch_state.as_str()),
                ))
                .execute(conn)?;
        }

        info!(batch_id, "Bulk batch created");
        Ok(batch_id)
    })
}

/// Claims a pending batch for dispatch.
///
/// The claim is a conditional `pending -> processing` update; it also
/// sets `started_at`. At most one caller can win the claim, which is
/// how the store guarantees a single dispatch loop per batch.
///
/// # Returns
///
/// `true` if this caller won the claim, `false` if the batch was no
/// longer pending.
///
/// # Errors
///
/// Returns `PersistenceError::BatchNotFound` if no batch with the
/// given ID exists, or an error if the update fails.
pub fn claim_batch(conn: &mut SqliteConnection, batch_id: i64) -> Result<bool, PersistenceError> {
    let rows: usize = diesel::update(
        bulk_batches::table
            .filter(bulk_batches::batch_id.eq(batch_id))
            .filter(bulk_batches::status.eq(BatchStatus::Pending.as_str())),
    )
    .set((
        bulk_batches::status.eq(BatchStatus::Processing.as_str()),
        bulk_batches::started_at.eq(current_timestamp!()),
    ))
    .execute(conn)
    .map_err(|e| PersistenceError::QueryFailed(format!("claim_batch: {e}")))?;

    if rows == 1 {
        debug!(batch_id, "Batch claimed for dispatch");
        return Ok(true);
    }

    // Lost claims and missing batches both update zero rows.
    let exists: bool = batch_exists(conn, batch_id)?;
    if exists {
        debug!(batch_id, "Batch claim lost; batch no longer pending");
        Ok(false)
    } else {
        Err(PersistenceError::BatchNotFound(batch_id))
    }
}

/// Requests cancellation of a batch.
///
/// A pending batch transitions directly to cancelled; a processing
/// batch gets the durable `cancel_requested` flag the dispatch loop
/// observes at its next iteration. Cancelling an already-cancelled
/// batch is a no-op success.
///
/// # Errors
///
/// Returns `PersistenceError::BatchNotFound` if the batch does not
/// exist, and `PersistenceError::InvalidBatchState` when the batch is
/// completed or failed.
pub fn request_cancel(conn: &mut SqliteConnection, batch_id: i64) -> Result<(), PersistenceError> {
    conn.transaction::<(), PersistenceError, _>(|conn| {
        let status: BatchStatus = load_status(conn, batch_id)?;

        if status == BatchStatus::Cancelled {
            debug!(batch_id, "Batch already cancelled; cancel is a no-op");
            return Ok(());
        }

        if let Err(err) = status.validate_transition(BatchStatus::Cancelled) {
            debug!(batch_id, %err, "Cancel rejected");
            return Err(PersistenceError::InvalidBatchState {
                batch_id,
                status: status.as_str().to_string(),
                operation: "cancel".to_string(),
            });
        }

        // The lifecycle admits cancellation from pending and processing
        // only; the transition check above already rejected the rest.
        if status == BatchStatus::Pending {
            diesel::update(
                bulk_batches::table
                    .filter(bulk_batches::batch_id.eq(batch_id))
                    .filter(bulk_batches::status.eq(BatchStatus::Pending.as_str())),
            )
            .set((
                bulk_batches::status.eq(BatchStatus::Cancelled.as_str()),
                bulk_batches::completed_at.eq(current_timestamp!()),
            ))
            .execute(conn)?;

            info!(batch_id, "Pending batch cancelled");
        } else {
            diesel::update(bulk_batches::table.filter(bulk_batches::batch_id.eq(batch_id)))
                .set(bulk_batches::cancel_requested.eq(1))
                .execute(conn)?;

            info!(batch_id, "Cancellation requested for processing batch");
        }

        Ok(())
    })
}

/// Transitions a processing batch to cancelled.
///
/// Called by the dispatch loop once it observes the cancellation flag.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidBatchState` if the batch is not
/// processing.
pub fn mark_cancelled(conn: &mut SqliteConnection, batch_id: i64) -> Result<(), PersistenceError> {
    finalize_processing_batch(conn, batch_id, BatchStatus::Cancelled, None)
}

/// Transitions a processing batch to completed.
///
/// Completed means the loop exhausted the recipient list; the counters
/// carry the success/failure detail.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidBatchState` if the batch is not
/// processing.
pub fn mark_completed(conn: &mut SqliteConnection, batch_id: i64) -> Result<(), PersistenceError> {
    finalize_processing_batch(conn, batch_id, BatchStatus::Completed, None)
}

/// Transitions a processing batch to failed, recording the reason.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidBatchState` if the batch is not
/// processing.
pub fn mark_failed(
    conn: &mut SqliteConnection,
    batch_id: i64,
    reason: &str,
) -> Result<(), PersistenceError> {
    finalize_processing_batch(conn, batch_id, BatchStatus::Failed, Some(reason))
}

/// Applies a terminal transition guarded by `status = 'processing'`.
fn finalize_processing_batch(
    conn: &mut SqliteConnection,
    batch_id: i64,
    terminal_status: BatchStatus,
    failure_reason: Option<&str>,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(
        bulk_batches::table
            .filter(bulk_batches::batch_id.eq(batch_id))
            .filter(bulk_batches::status.eq(BatchStatus::Processing.as_str())),
    )
    .set((
        bulk_batches::status.eq(terminal_status.as_str()),
        bulk_batches::failure_reason.eq(failure_reason),
        bulk_batches::completed_at.eq(current_timestamp!()),
    ))
    .execute(conn)
    .map_err(|e| PersistenceError::QueryFailed(format!("finalize_processing_batch: {e}")))?;

    if rows == 0 {
        let status: BatchStatus = load_status(conn, batch_id)?;
        return Err(PersistenceError::InvalidBatchState {
            batch_id,
            status: status.as_str().to_string(),
            operation: format!("mark {terminal_status}"),
        });
    }

    info!(batch_id, status = terminal_status.as_str(), "Batch reached terminal state");
    Ok(())
}

/// Loads the current status of a batch.
fn load_status(conn: &mut SqliteConnection, batch_id: i64) -> Result<BatchStatus, PersistenceError> {
    let status: String = bulk_batches::table
        .filter(bulk_batches::batch_id.eq(batch_id))
        .select(bulk_batches::status)
        .first::<String>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("load_status: {e}")))?
        .ok_or(PersistenceError::BatchNotFound(batch_id))?;

    BatchStatus::from_str(&status).map_err(|e| PersistenceError::Other(e.to_string()))
}

/// Returns whether a batch row exists.
fn batch_exists(conn: &mut SqliteConnection, batch_id: i64) -> Result<bool, PersistenceError> {
    let count: i64 = bulk_batches::table
        .filter(bulk_batches::batch_id.eq(batch_id))
        .count()
        .get_result(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("batch_exists: {e}")))?;
    Ok(count > 0)
}
