// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod cancel_tests;
mod claim_tests;

use crate::SqlitePersistence;
use wa_blast_domain::{BulkBatch, Recipient, RecipientFields};

pub fn test_batch(total_recipients: usize) -> BulkBatch {
    BulkBatch::new(
        String::from("acme"),
        String::from("primary"),
        String::from("launch"),
        String::from("Hi {{name}}"),
        0,
        total_recipients,
    )
}

pub fn valid_recipients(phones: &[&str]) -> Vec<Recipient> {
    phones
        .iter()
        .enumerate()
        .map(|(row_index, phone)| {
            Recipient::valid(row_index, (*phone).to_string(), RecipientFields::new())
        })
        .collect()
}

/// Creates a pending batch of valid recipients and returns its ID.
pub fn seed_batch(persistence: &mut SqlitePersistence, phones: &[&str]) -> i64 {
    let batch = test_batch(phones.len());
    let recipients = valid_recipients(phones);
    persistence.create_batch(&batch, &recipients).unwrap()
}

/// Claims a batch and asserts the claim was won.
pub fn claim(persistence: &mut SqlitePersistence, batch_id: i64) {
    assert!(persistence.claim_batch(batch_id).unwrap());
}
