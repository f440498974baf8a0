// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Quota surface tests.

use crate::error::ApiError;
use crate::handlers::{get_quota, set_quota};
use crate::tests::store;

#[test]
fn test_set_quota_returns_ledger_entry() {
    let mut persistence = store();

    let response = set_quota(&mut persistence, "acme", 100).unwrap();

    assert_eq!(response.owner_id, "acme");
    assert_eq!(response.message_limit, 100);
    assert_eq!(response.messages_used, 0);
    assert_eq!(response.remaining, 100);
}

#[test]
fn test_set_quota_rejects_negative_limit() {
    let mut persistence = store();

    let err = set_quota(&mut persistence, "acme", -1).unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { .. }));
}

#[test]
fn test_get_quota_for_unmetered_tenant_is_none() {
    let mut persistence = store();

    assert!(get_quota(&mut persistence, "acme").unwrap().is_none());
}

#[test]
fn test_quota_reflects_usage() {
    let mut persistence = store();
    set_quota(&mut persistence, "acme", 10).unwrap();
    assert!(persistence.try_reserve_quota("acme", 3).unwrap());

    let response = get_quota(&mut persistence, "acme").unwrap().unwrap();

    assert_eq!(response.messages_used, 3);
    assert_eq!(response.remaining, 7);
}

#[test]
fn test_raising_limit_preserves_usage() {
    let mut persistence = store();
    set_quota(&mut persistence, "acme", 5).unwrap();
    assert!(persistence.try_reserve_quota("acme", 5).unwrap());

    let response = set_quota(&mut persistence, "acme", 8).unwrap();

    assert_eq!(response.messages_used, 5);
    assert_eq!(response.remaining, 3);
}
