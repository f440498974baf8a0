// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Recipient query operations.
//!
//! Every read here orders by `row_index`; that is the canonical row
//! order defined at ingestion and honored through dispatch and export.

use diesel::SqliteConnection;
use diesel::prelude::*;
use wa_blast_domain::Recipient;

use crate::data_models::RecipientRow;
use crate::diesel_schema::recipients;
use crate::error::PersistenceError;

/// Retrieves every recipient of a batch in canonical row order.
///
/// Includes invalid and duplicate rows; export shows the full
/// ingestion story.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be
/// reconstructed.
pub fn get_recipients(
    conn: &mut SqliteConnection,
    batch_id: i64,
) -> Result<Vec<Recipient>, PersistenceError> {
    let rows: Vec<RecipientRow> = recipients::table
        .filter(recipients::batch_id.eq(batch_id))
        .order(recipients::row_index.asc())
        .load::<RecipientRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("get_recipients: {e}")))?;

    rows.into_iter().map(RecipientRow::into_domain).collect()
}

/// Retrieves the recipients a dispatch loop should attempt, in
/// canonical row order.
///
/// Only valid recipients that have not been attempted qualify; the
/// definition of dispatchable lives on
/// [`Recipient::is_dispatchable`], so the loop and the store can never
/// disagree about it.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be
/// reconstructed.
pub fn get_dispatchable_recipients(
    conn: &mut SqliteConnection,
    batch_id: i64,
) -> Result<Vec<Recipient>, PersistenceError> {
    let all: Vec<Recipient> = get_recipients(conn, batch_id)?;
    Ok(all
        .into_iter()
        .filter(Recipient::is_dispatchable)
        .collect())
}
