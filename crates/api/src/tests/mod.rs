// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod export_tests;
mod quota_tests;

use crate::request_response::CreateBatchRequest;
use crate::send_policy::SendPolicy;
use wa_blast_persistence::SqlitePersistence;

/// A small well-formed upload: three rows, one invalid phone, one
/// duplicate of the first row.
pub const SAMPLE_CSV: &[u8] = b"phone,name\n\
+62 811-1000,Alice\n\
not-a-phone,Bob\n\
+628111000,Alice Again\n\
0812 2000,Carol\n";

pub fn store() -> SqlitePersistence {
    SqlitePersistence::new_in_memory().unwrap()
}

pub fn request(owner_id: &str) -> CreateBatchRequest {
    CreateBatchRequest {
        owner_id: owner_id.to_string(),
        instance_id: String::from("primary"),
        name: String::from("launch"),
        template: String::from("Hi {{name}}"),
        delay_ms: 1000,
    }
}

/// Creates a batch from [`SAMPLE_CSV`] and returns its ID.
pub fn seed_batch(persistence: &mut SqlitePersistence, owner_id: &str) -> i64 {
    let response = crate::handlers::create_batch(
        persistence,
        &SendPolicy::default(),
        &request(owner_id),
        SAMPLE_CSV,
    )
    .unwrap();
    response.batch_id
}
