// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Batch query operations.
//!
//! The batch row is the consistent snapshot progress polling reads:
//! status, counters, and timestamps come back from one `SELECT`, so a
//! reader never observes a status paired with stale counts.

use diesel::SqliteConnection;
use diesel::prelude::*;
use wa_blast_domain::{BatchStatus, BulkBatch};

use crate::data_models::BatchRow;
use crate::diesel_schema::bulk_batches;
use crate::error::PersistenceError;

/// Retrieves a batch by ID.
///
/// # Errors
///
/// Returns `PersistenceError::BatchNotFound` if no batch with the
/// given ID exists.
pub fn get_batch(conn: &mut SqliteConnection, batch_id: i64) -> Result<BulkBatch, PersistenceError> {
    let row: BatchRow = bulk_batches::table
        .filter(bulk_batches::batch_id.eq(batch_id))
        .first::<BatchRow>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_batch: {e}")))?
        .ok_or(PersistenceError::BatchNotFound(batch_id))?;

    row.into_domain()
}

/// Lists all batches owned by a tenant, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be
/// reconstructed.
pub fn list_batches(
    conn: &mut SqliteConnection,
    owner_id: &str,
) -> Result<Vec<BulkBatch>, PersistenceError> {
    let rows: Vec<BatchRow> = bulk_batches::table
        .filter(bulk_batches::owner_id.eq(owner_id))
        .order(bulk_batches::batch_id.desc())
        .load::<BatchRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_batches: {e}")))?;

    rows.into_iter().map(BatchRow::into_domain).collect()
}

/// Lists the IDs of all batches awaiting a dispatch loop, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_pending_batch_ids(conn: &mut SqliteConnection) -> Result<Vec<i64>, PersistenceError> {
    bulk_batches::table
        .filter(bulk_batches::status.eq(BatchStatus::Pending.as_str()))
        .order(bulk_batches::batch_id.asc())
        .select(bulk_batches::batch_id)
        .load::<i64>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_pending_batch_ids: {e}")))
}

/// Returns whether cancellation has been requested for a batch.
///
/// The dispatch loop polls this at the top of each iteration.
///
/// # Errors
///
/// Returns `PersistenceError::BatchNotFound` if no batch with the
/// given ID exists.
pub fn is_cancel_requested(
    conn: &mut SqliteConnection,
    batch_id: i64,
) -> Result<bool, PersistenceError> {
    let flag: i32 = bulk_batches::table
        .filter(bulk_batches::batch_id.eq(batch_id))
        .select(bulk_batches::cancel_requested)
        .first::<i32>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("is_cancel_requested: {e}")))?
        .ok_or(PersistenceError::BatchNotFound(batch_id))?;

    Ok(flag != 0)
}
