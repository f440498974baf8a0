// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Result export tests.

use crate::error::ApiError;
use crate::handlers::export_batch;
use crate::tests::{seed_batch, store};

fn export_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_export_includes_every_row_in_canonical_order() {
    let mut persistence = store();
    let batch_id = seed_batch(&mut persistence, "acme");

    let lines = export_lines(&export_batch(&mut persistence, "acme", batch_id).unwrap());

    assert_eq!(lines.len(), 5, "header plus all four rows");
    assert_eq!(
        lines[0],
        "phone,name,validation_state,dispatch_state,dispatch_error"
    );
    assert_eq!(lines[1], "+628111000,Alice,valid,not_sent,");
    assert_eq!(lines[2], "not-a-phone,Bob,invalid,not_sent,");
    assert_eq!(lines[3], "+628111000,Alice Again,duplicate,not_sent,");
    assert_eq!(lines[4], "08122000,Carol,valid,not_sent,");
}

#[test]
fn test_export_reflects_dispatch_outcomes() {
    let mut persistence = store();
    let batch_id = seed_batch(&mut persistence, "acme");
    assert!(persistence.claim_batch(batch_id).unwrap());

    let dispatchable = persistence.get_dispatchable_recipients(batch_id).unwrap();
    persistence
        .record_send_success(batch_id, dispatchable[0].recipient_id.unwrap())
        .unwrap();
    persistence
        .record_send_failure(
            batch_id,
            dispatchable[1].recipient_id.unwrap(),
            "instance disconnected",
        )
        .unwrap();

    let lines = export_lines(&export_batch(&mut persistence, "acme", batch_id).unwrap());

    assert_eq!(lines[1], "+628111000,Alice,valid,sent,");
    assert_eq!(lines[4], "08122000,Carol,valid,failed,instance disconnected");
}

#[test]
fn test_export_is_legal_mid_flight() {
    let mut persistence = store();
    let batch_id = seed_batch(&mut persistence, "acme");
    assert!(persistence.claim_batch(batch_id).unwrap());

    // Still processing, nothing attempted yet.
    let lines = export_lines(&export_batch(&mut persistence, "acme", batch_id).unwrap());

    assert_eq!(lines.len(), 5);
}

#[test]
fn test_export_is_tenant_scoped() {
    let mut persistence = store();
    let batch_id = seed_batch(&mut persistence, "acme");

    let err = export_batch(&mut persistence, "globex", batch_id).unwrap_err();

    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}
