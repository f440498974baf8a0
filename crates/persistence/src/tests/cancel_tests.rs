// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Cancellation path tests.

use super::{claim, seed_batch};
use crate::{PersistenceError, SqlitePersistence};
use wa_blast_domain::BatchStatus;

#[test]
fn test_cancel_pending_batch_is_immediate() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let batch_id = seed_batch(&mut persistence, &["0811111111"]);

    persistence.request_cancel(batch_id).unwrap();

    let batch = persistence.get_batch(batch_id).unwrap();
    assert_eq!(batch.status, BatchStatus::Cancelled);
    assert!(batch.completed_at.is_some());
}

#[test]
fn test_cancel_processing_batch_sets_flag_only() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let batch_id = seed_batch(&mut persistence, &["0811111111"]);
    claim(&mut persistence, batch_id);

    persistence.request_cancel(batch_id).unwrap();

    // The status change belongs to the dispatch loop, not the request
    let batch = persistence.get_batch(batch_id).unwrap();
    assert_eq!(batch.status, BatchStatus::Processing);
    assert!(batch.cancel_requested);
    assert!(persistence.is_cancel_requested(batch_id).unwrap());
}

#[test]
fn test_dispatch_loop_finalizes_cancellation() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let batch_id = seed_batch(&mut persistence, &["0811111111"]);
    claim(&mut persistence, batch_id);
    persistence.request_cancel(batch_id).unwrap();

    persistence.mark_cancelled(batch_id).unwrap();

    let batch = persistence.get_batch(batch_id).unwrap();
    assert_eq!(batch.status, BatchStatus::Cancelled);
    assert!(batch.completed_at.is_some());
}

#[test]
fn test_cancel_is_idempotent() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let batch_id = seed_batch(&mut persistence, &["0811111111"]);

    persistence.request_cancel(batch_id).unwrap();
    // A second cancel of a cancelled batch is a no-op success
    persistence.request_cancel(batch_id).unwrap();

    let batch = persistence.get_batch(batch_id).unwrap();
    assert_eq!(batch.status, BatchStatus::Cancelled);
}

#[test]
fn test_cancel_completed_batch_is_rejected() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let batch_id = seed_batch(&mut persistence, &["0811111111"]);
    claim(&mut persistence, batch_id);
    persistence.mark_completed(batch_id).unwrap();

    let result = persistence.request_cancel(batch_id);

    assert!(matches!(
        result,
        Err(PersistenceError::InvalidBatchState { ref status, .. }) if status == "completed"
    ));
}

#[test]
fn test_cancel_unknown_batch() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let result = persistence.request_cancel(7);

    assert_eq!(result, Err(PersistenceError::BatchNotFound(7)));
}
