// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Batch store for the wa-blast bulk messaging engine.
//!
//! This crate is the durable record of bulk batches, their recipients,
//! and the tenant quota ledger. It is built on Diesel over `SQLite`.
//!
//! ## Databases
//!
//! - In-memory databases back unit and integration tests. Each call to
//!   [`Persistence::new_in_memory`] receives a unique shared-cache
//!   database via an atomic counter, so tests are isolated without
//!   time-based collisions.
//! - File databases are used by the CLI; they run in WAL mode so
//!   progress polling can read while a dispatch task writes.
//!
//! Foreign key enforcement is verified at startup; recipients
//! reference their owning batch and the store relies on that
//! integrity.
//!
//! ## Lifecycle enforcement
//!
//! Status transitions are conditional updates guarded by the status
//! they are legal from. The `pending -> processing` claim is the
//! exclusivity mechanism for dispatch: at most one caller wins it, so
//! no batch ever has two dispatch loops.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use wa_blast_domain::{BulkBatch, Recipient};

/// Atomic counter for generating unique in-memory database names.
///
/// This ensures deterministic test isolation by eliminating time-based collisions.
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod sqlite;

#[cfg(test)]
mod tests;

pub use data_models::QuotaStatus;
pub use error::PersistenceError;

/// Type alias kept for call sites that name the backend explicitly.
pub type SqlitePersistence = Persistence;

/// Persistence adapter for batches, recipients, and quotas.
///
/// One adapter owns one connection. The dispatch runtime shares an
/// adapter behind a mutex; the per-call mutations here are each atomic
/// with respect to that lock.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        // Unique shared in-memory database name per call so tests are isolated.
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name: String = format!("memdb_test_{db_id}");
        let shared_memory_url: String = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = sqlite::initialize_database(&shared_memory_url)?;

        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = sqlite::initialize_database(path_str)?;

        // WAL mode for read concurrency between pollers and the dispatcher
        sqlite::enable_wal_mode(&mut conn)?;

        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Batches
    // ========================================================================

    /// Creates a batch together with all of its recipients in one
    /// transaction.
    ///
    /// # Arguments
    ///
    /// * `batch` - The batch to persist (status must be pending)
    /// * `recipients` - Every classified row from ingestion, in
    ///   canonical order
    ///
    /// # Returns
    ///
    /// The batch ID assigned by the database.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn create_batch(
        &mut self,
        batch: &BulkBatch,
        recipients: &[Recipient],
    ) -> Result<i64, PersistenceError> {
        mutations::batches::create_batch(&mut self.conn, batch, recipients)
    }

    /// Retrieves a batch by ID.
    ///
    /// This is the consistent snapshot read the progress surface polls:
    /// status, counters, and timestamps come from a single `SELECT`.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::BatchNotFound` if the batch does not
    /// exist.
    pub fn get_batch(&mut self, batch_id: i64) -> Result<BulkBatch, PersistenceError> {
        queries::batches::get_batch(&mut self.conn, batch_id)
    }

    /// Lists all batches owned by a tenant, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_batches(&mut self, owner_id: &str) -> Result<Vec<BulkBatch>, PersistenceError> {
        queries::batches::list_batches(&mut self.conn, owner_id)
    }

    /// Lists the IDs of all pending batches, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_pending_batch_ids(&mut self) -> Result<Vec<i64>, PersistenceError> {
        queries::batches::list_pending_batch_ids(&mut self.conn)
    }

    /// Claims a pending batch for dispatch (`pending -> processing`).
    ///
    /// # Returns
    ///
    /// `true` if this caller won the claim, `false` if the batch was
    /// no longer pending.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::BatchNotFound` if the batch does not
    /// exist.
    pub fn claim_batch(&mut self, batch_id: i64) -> Result<bool, PersistenceError> {
        mutations::batches::claim_batch(&mut self.conn, batch_id)
    }

    /// Returns whether cancellation has been requested for a batch.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::BatchNotFound` if the batch does not
    /// exist.
    pub fn is_cancel_requested(&mut self, batch_id: i64) -> Result<bool, PersistenceError> {
        queries::batches::is_cancel_requested(&mut self.conn, batch_id)
    }

    /// Requests cancellation of a batch.
    ///
    /// Pending batches cancel immediately; processing batches get the
    /// durable flag the dispatch loop observes. Idempotent for
    /// already-cancelled batches.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::InvalidBatchState` when the batch is
    /// completed or failed.
    pub fn request_cancel(&mut self, batch_id: i64) -> Result<(), PersistenceError> {
        mutations::batches::request_cancel(&mut self.conn, batch_id)
    }

    /// Transitions a processing batch to cancelled.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::InvalidBatchState` if the batch is
    /// not processing.
    pub fn mark_cancelled(&mut self, batch_id: i64) -> Result<(), PersistenceError> {
        mutations::batches::mark_cancelled(&mut self.conn, batch_id)
    }

    /// Transitions a processing batch to completed.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::InvalidBatchState` if the batch is
    /// not processing.
    pub fn mark_completed(&mut self, batch_id: i64) -> Result<(), PersistenceError> {
        mutations::batches::mark_completed(&mut self.conn, batch_id)
    }

    /// Transitions a processing batch to failed, recording the reason.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::InvalidBatchState` if the batch is
    /// not processing.
    pub fn mark_failed(&mut self, batch_id: i64, reason: &str) -> Result<(), PersistenceError> {
        mutations::batches::mark_failed(&mut self.conn, batch_id, reason)
    }

    // ========================================================================
    // Recipients
    // ========================================================================

    /// Retrieves every recipient of a batch in canonical row order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_recipients(&mut self, batch_id: i64) -> Result<Vec<Recipient>, PersistenceError> {
        queries::recipients::get_recipients(&mut self.conn, batch_id)
    }

    /// Retrieves the valid, unattempted recipients of a batch in
    /// canonical row order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_dispatchable_recipients(
        &mut self,
        batch_id: i64,
    ) -> Result<Vec<Recipient>, PersistenceError> {
        queries::recipients::get_dispatchable_recipients(&mut self.conn, batch_id)
    }

    /// Records a successful send for one recipient and advances
    /// `sent_count`.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipient is unknown or the batch is
    /// not processing.
    pub fn record_send_success(
        &mut self,
        batch_id: i64,
        recipient_id: i64,
    ) -> Result<(), PersistenceError> {
        mutations::recipients::record_send_success(&mut self.conn, batch_id, recipient_id)
    }

    /// Records a failed send for one recipient and advances
    /// `failed_count`.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipient is unknown or the batch is
    /// not processing.
    pub fn record_send_failure(
        &mut self,
        batch_id: i64,
        recipient_id: i64,
        error: &str,
    ) -> Result<(), PersistenceError> {
        mutations::recipients::record_send_failure(&mut self.conn, batch_id, recipient_id, error)
    }

    // ========================================================================
    // Tenant quotas
    // ========================================================================

    /// Sets (or creates) a tenant's message limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub fn set_quota(&mut self, owner_id: &str, message_limit: i64) -> Result<(), PersistenceError> {
        mutations::quotas::set_quota(&mut self.conn, owner_id, message_limit)
    }

    /// Retrieves a tenant's quota ledger entry, or `None` for an
    /// unmetered tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_quota(&mut self, owner_id: &str) -> Result<Option<QuotaStatus>, PersistenceError> {
        queries::quotas::get_quota(&mut self.conn, owner_id)
    }

    /// Attempts to reserve `count` messages for a tenant.
    ///
    /// Unmetered tenants (no ledger row) are always allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn try_reserve_quota(
        &mut self,
        owner_id: &str,
        count: i64,
    ) -> Result<bool, PersistenceError> {
        mutations::quotas::try_reserve(&mut self.conn, owner_id, count)
    }
}
