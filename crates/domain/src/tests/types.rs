// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    BatchStatus, BulkBatch, DispatchState, Phone, Recipient, RecipientFields, ValidationState,
};

fn create_test_batch(total_recipients: usize) -> BulkBatch {
    BulkBatch::new(
        String::from("tenant-1"),
        String::from("instance-1"),
        String::from("March promo"),
        String::from("Hi {{name}}"),
        1500,
        total_recipients,
    )
}

#[test]
fn test_phone_parse_normalizes() {
    let phone: Phone = Phone::parse("+62 811-22-33").unwrap();
    assert_eq!(phone.value(), "+628112233");
    assert_eq!(phone.to_string(), "+628112233");
}

#[test]
fn test_phone_parse_rejects_invalid() {
    assert!(Phone::parse("not a phone").is_err());
    assert!("not a phone".parse::<Phone>().is_err());
}

#[test]
fn test_phone_into_string() {
    let phone: Phone = Phone::parse("0811223344").unwrap();
    assert_eq!(phone.into_string(), "0811223344");
}

#[test]
fn test_fields_lookup_is_case_sensitive() {
    let mut fields: RecipientFields = RecipientFields::new();
    fields.push(String::from("Name"), String::from("Alice"));

    assert_eq!(fields.get("Name"), Some("Alice"));
    assert_eq!(fields.get("name"), None);
}

#[test]
fn test_fields_preserve_order() {
    let fields: RecipientFields = RecipientFields::from_pairs(vec![
        (String::from("city"), String::from("Bandung")),
        (String::from("name"), String::from("Alice")),
        (String::from("order"), String::from("A-17")),
    ]);

    assert_eq!(fields.names(), vec!["city", "name", "order"]);
    assert_eq!(fields.len(), 3);
    assert!(!fields.is_empty());
}

#[test]
fn test_fields_first_match_wins_on_repeats() {
    let fields: RecipientFields = RecipientFields::from_pairs(vec![
        (String::from("name"), String::from("first")),
        (String::from("name"), String::from("second")),
    ]);

    assert_eq!(fields.get("name"), Some("first"));
}

#[test]
fn test_fields_serialize_as_pairs() {
    let fields: RecipientFields = RecipientFields::from_pairs(vec![(
        String::from("name"),
        String::from("Alice"),
    )]);

    let json: String = serde_json::to_string(&fields).unwrap();
    assert_eq!(json, r#"[["name","Alice"]]"#);

    let back: RecipientFields = serde_json::from_str(&json).unwrap();
    assert_eq!(back, fields);
}

#[test]
fn test_new_batch_defaults() {
    let batch: BulkBatch = create_test_batch(10);

    assert_eq!(batch.batch_id, None);
    assert_eq!(batch.status, BatchStatus::Pending);
    assert_eq!(batch.total_recipients, 10);
    assert_eq!(batch.sent_count, 0);
    assert_eq!(batch.failed_count, 0);
    assert!(!batch.cancel_requested);
    assert_eq!(batch.failure_reason, None);
    assert_eq!(batch.started_at, None);
    assert_eq!(batch.completed_at, None);
}

#[test]
fn test_batch_progress_mid_run() {
    let mut batch: BulkBatch = create_test_batch(10);
    batch.sent_count = 3;
    batch.failed_count = 1;

    assert_eq!(batch.attempted_count(), 4);
    assert!((batch.progress() - 40.0).abs() < f64::EPSILON);
}

#[test]
fn test_batch_progress_complete() {
    let mut batch: BulkBatch = create_test_batch(4);
    batch.sent_count = 2;
    batch.failed_count = 2;

    assert!((batch.progress() - 100.0).abs() < f64::EPSILON);
}

#[test]
fn test_batch_progress_empty_batch_is_zero() {
    let batch: BulkBatch = create_test_batch(0);
    assert!(batch.progress().abs() < f64::EPSILON);
}

#[test]
fn test_recipient_constructors() {
    let valid: Recipient = Recipient::valid(
        0,
        String::from("+628112233"),
        RecipientFields::new(),
    );
    assert_eq!(valid.validation_state, ValidationState::Valid);
    assert_eq!(valid.dispatch_state, DispatchState::NotSent);
    assert!(valid.validation_errors.is_empty());
    assert!(valid.is_dispatchable());

    let invalid: Recipient = Recipient::invalid(
        1,
        String::from("not a phone"),
        RecipientFields::new(),
        vec![String::from("Phone number 'not a phone' contains invalid characters")],
    );
    assert_eq!(invalid.validation_state, ValidationState::Invalid);
    assert!(!invalid.is_dispatchable());

    let duplicate: Recipient =
        Recipient::duplicate(2, String::from("+628112233"), RecipientFields::new());
    assert_eq!(duplicate.validation_state, ValidationState::Duplicate);
    assert!(!duplicate.is_dispatchable());
}

#[test]
fn test_sent_recipient_is_not_dispatchable() {
    let mut recipient: Recipient = Recipient::valid(
        0,
        String::from("+628112233"),
        RecipientFields::new(),
    );
    recipient.dispatch_state = DispatchState::Sent;

    assert!(!recipient.is_dispatchable());
}

#[test]
fn test_state_string_round_trips() {
    for state in [
        ValidationState::Valid,
        ValidationState::Invalid,
        ValidationState::Duplicate,
    ] {
        assert_eq!(state.as_str().parse::<ValidationState>().unwrap(), state);
    }

    for state in [
        DispatchState::NotSent,
        DispatchState::Sent,
        DispatchState::Failed,
    ] {
        assert_eq!(state.as_str().parse::<DispatchState>().unwrap(), state);
    }

    assert!("shipped".parse::<ValidationState>().is_err());
    assert!("queued".parse::<DispatchState>().is_err());
}
