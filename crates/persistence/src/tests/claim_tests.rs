// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Exclusive dispatch claim tests.

use super::{claim, seed_batch};
use crate::{PersistenceError, SqlitePersistence};
use wa_blast_domain::BatchStatus;

#[test]
fn test_claim_transitions_pending_to_processing() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let batch_id = seed_batch(&mut persistence, &["0811111111"]);

    assert!(persistence.claim_batch(batch_id).unwrap());

    let batch = persistence.get_batch(batch_id).unwrap();
    assert_eq!(batch.status, BatchStatus::Processing);
    assert!(batch.started_at.is_some());
}

#[test]
fn test_second_claim_loses() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let batch_id = seed_batch(&mut persistence, &["0811111111"]);

    assert!(persistence.claim_batch(batch_id).unwrap());
    assert!(
        !persistence.claim_batch(batch_id).unwrap(),
        "a batch must never be claimed twice"
    );
}

#[test]
fn test_claim_unknown_batch() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();

    let result = persistence.claim_batch(42);

    assert_eq!(result, Err(PersistenceError::BatchNotFound(42)));
}

#[test]
fn test_claim_cancelled_batch_loses() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let batch_id = seed_batch(&mut persistence, &["0811111111"]);

    persistence.request_cancel(batch_id).unwrap();

    assert!(!persistence.claim_batch(batch_id).unwrap());
}

#[test]
fn test_terminal_transitions_require_processing() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let batch_id = seed_batch(&mut persistence, &["0811111111"]);

    // Still pending: no terminal transition is legal
    assert!(matches!(
        persistence.mark_completed(batch_id),
        Err(PersistenceError::InvalidBatchState { .. })
    ));

    claim(&mut persistence, batch_id);
    persistence.mark_completed(batch_id).unwrap();

    let batch = persistence.get_batch(batch_id).unwrap();
    assert_eq!(batch.status, BatchStatus::Completed);
    assert!(batch.completed_at.is_some());

    // Completed is terminal
    assert!(matches!(
        persistence.mark_failed(batch_id, "late failure"),
        Err(PersistenceError::InvalidBatchState { .. })
    ));
}

#[test]
fn test_mark_failed_records_reason() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let batch_id = seed_batch(&mut persistence, &["0811111111"]);
    claim(&mut persistence, batch_id);

    persistence
        .mark_failed(batch_id, "Message quota exhausted for tenant acme")
        .unwrap();

    let batch = persistence.get_batch(batch_id).unwrap();
    assert_eq!(batch.status, BatchStatus::Failed);
    assert_eq!(
        batch.failure_reason.as_deref(),
        Some("Message quota exhausted for tenant acme")
    );
}
