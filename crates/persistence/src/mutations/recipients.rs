// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-recipient dispatch result recording.
//!
//! Recording a result updates the recipient row and the owning batch's
//! counter in one transaction. The counter update is guarded by
//! `status = 'processing'` so counters can never advance on a batch
//! that already reached a terminal state; progress readers therefore
//! always see `sent_count + failed_count <= total_recipients`.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;
use wa_blast_domain::{BatchStatus, DispatchState, ValidationState};

use crate::diesel_schema::{bulk_batches, recipients};
use crate::error::PersistenceError;

/// Records a successful send for one recipient.
///
/// Marks the recipient `sent` and increments the batch's `sent_count`.
///
/// # Errors
///
/// Returns `PersistenceError::RecipientNotFound` if the recipient is
/// not part of the batch, and `PersistenceError::InvalidBatchState` if
/// the batch is not processing.
pub fn record_send_success(
    conn: &mut SqliteConnection,
    batch_id: i64,
    recipient_id: i64,
) -> Result<(), PersistenceError> {
    conn.transaction::<(), PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(
            recipients::table
                .filter(recipients::recipient_id.eq(recipient_id))
                .filter(recipients::batch_id.eq(batch_id))
                .filter(recipients::validation_state.eq(ValidationState::Valid.as_str())),
        )
        .set((
            recipients::dispatch_state.eq(DispatchState::Sent.as_str()),
            recipients::dispatch_error.eq(None::<String>),
        ))
        .execute(conn)?;

        if updated == 0 {
            return Err(PersistenceError::RecipientNotFound {
                batch_id,
                recipient_id,
            });
        }

        increment_counter(conn, batch_id, Counter::Sent)?;

        debug!(batch_id, recipient_id, "Recorded send success");
        Ok(())
    })
}

/// Records a failed send for one recipient.
///
/// Marks the recipient `failed` with its error detail and increments
/// the batch's `failed_count`. A recipient failure never touches the
/// batch status; the loop carries on.
///
/// # Errors
///
/// Returns `PersistenceError::RecipientNotFound` if the recipient is
/// not part of the batch, and `PersistenceError::InvalidBatchState` if
/// the batch is not processing.
pub fn record_send_failure(
    conn: &mut SqliteConnection,
    batch_id: i64,
    recipient_id: i64,
    error: &str,
) -> Result<(), PersistenceError> {
    conn.transaction::<(), PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(
            recipients::table
                .filter(recipients::recipient_id.eq(recipient_id))
                .filter(recipients::batch_id.eq(batch_id))
                .filter(recipients::validation_state.eq(ValidationState::Valid.as_str())),
        )
        .set((
            recipients::dispatch_state.eq(DispatchState::Failed.as_str()),
            recipients::dispatch_error.eq(Some(error)),
        ))
        .execute(conn)?;

        if updated == 0 {
            return Err(PersistenceError::RecipientNotFound {
                batch_id,
                recipient_id,
            });
        }

        increment_counter(conn, batch_id, Counter::Failed)?;

        debug!(batch_id, recipient_id, error, "Recorded send failure");
        Ok(())
    })
}

/// Which batch counter a dispatch result advances.
enum Counter {
    Sent,
    Failed,
}

/// Increments one batch counter, guarded by `status = 'processing'`.
fn increment_counter(
    conn: &mut SqliteConnection,
    batch_id: i64,
    counter: Counter,
) -> Result<(), PersistenceError> {
    let target = bulk_batches::table
        .filter(bulk_batches::batch_id.eq(batch_id))
        .filter(bulk_batches::status.eq(BatchStatus::Processing.as_str()));

    let rows: usize = match counter {
        Counter::Sent => diesel::update(target)
            .set(bulk_batches::sent_count.eq(bulk_batches::sent_count + 1))
            .execute(conn)?,
        Counter::Failed => diesel::update(target)
            .set(bulk_batches::failed_count.eq(bulk_batches::failed_count + 1))
            .execute(conn)?,
    };

    if rows == 0 {
        let status: String = bulk_batches::table
            .filter(bulk_batches::batch_id.eq(batch_id))
            .select(bulk_batches::status)
            .first::<String>(conn)
            .optional()?
            .ok_or(PersistenceError::BatchNotFound(batch_id))?;

        return Err(PersistenceError::InvalidBatchState {
            batch_id,
            status,
            operation: "record dispatch result".to_string(),
        });
    }

    Ok(())
}
