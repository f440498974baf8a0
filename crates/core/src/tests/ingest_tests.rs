// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{headers, rows};
use crate::error::CoreError;
use crate::ingest::{PHONE_HEADER_ALIASES, RawRecord, ingest};

#[test]
fn test_ingest_maps_columns() {
    let headers = headers(&["name", "phone", "city"]);
    let rows = rows(&[
        &["Alice", "0811223344", "Bandung"],
        &["Bob", "0822334455", "Jakarta"],
    ]);

    let records: Vec<RawRecord> = ingest(&headers, &rows).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].row_index, 0);
    assert_eq!(records[0].phone_raw, "0811223344");
    assert_eq!(records[0].fields.get("name"), Some("Alice"));
    assert_eq!(records[0].fields.get("city"), Some("Bandung"));
    assert_eq!(records[1].row_index, 1);
    assert_eq!(records[1].phone_raw, "0822334455");
    assert_eq!(records[1].fields.get("name"), Some("Bob"));
}

#[test]
fn test_ingest_accepts_every_alias() {
    for alias in PHONE_HEADER_ALIASES {
        let headers = headers(&[alias, "name"]);
        let rows = rows(&[&["0811223344", "Alice"]]);

        let records = ingest(&headers, &rows).unwrap();
        assert_eq!(records[0].phone_raw, "0811223344");
        assert_eq!(records[0].fields.names(), vec!["name"]);
    }
}

#[test]
fn test_ingest_alias_match_is_case_insensitive() {
    let headers = headers(&["Name", " WhatsApp "]);
    let rows = rows(&[&["Alice", "0811223344"]]);

    let records = ingest(&headers, &rows).unwrap();
    assert_eq!(records[0].phone_raw, "0811223344");
}

#[test]
fn test_ingest_first_alias_column_wins() {
    // "number" is the phone source; the later "phone" column stays a field
    let headers = headers(&["number", "phone"]);
    let rows = rows(&[&["0811223344", "front desk"]]);

    let records = ingest(&headers, &rows).unwrap();
    assert_eq!(records[0].phone_raw, "0811223344");
    assert_eq!(records[0].fields.get("phone"), Some("front desk"));
}

#[test]
fn test_ingest_field_names_keep_original_case() {
    let headers = headers(&["Name", "phone"]);
    let rows = rows(&[&["Alice", "0811223344"]]);

    let records = ingest(&headers, &rows).unwrap();
    assert_eq!(records[0].fields.get("Name"), Some("Alice"));
    assert_eq!(records[0].fields.get("name"), None);
}

#[test]
fn test_ingest_short_rows_yield_empty_cells() {
    let headers = headers(&["phone", "name", "city"]);
    let rows = rows(&[&["0811223344"]]);

    let records = ingest(&headers, &rows).unwrap();
    assert_eq!(records[0].phone_raw, "0811223344");
    assert_eq!(records[0].fields.get("name"), Some(""));
    assert_eq!(records[0].fields.get("city"), Some(""));
}

#[test]
fn test_ingest_short_row_missing_phone_cell() {
    let headers = headers(&["name", "phone"]);
    let rows = rows(&[&["Alice"]]);

    // The row is kept; the empty phone fails validation later
    let records = ingest(&headers, &rows).unwrap();
    assert_eq!(records[0].phone_raw, "");
    assert_eq!(records[0].fields.get("name"), Some("Alice"));
}

#[test]
fn test_ingest_missing_phone_column() {
    let headers = headers(&["name", "email"]);
    let rows = rows(&[&["Alice", "alice@example.com"]]);

    let err: CoreError = ingest(&headers, &rows).unwrap_err();
    match err {
        CoreError::MissingPhoneColumn { headers } => {
            assert_eq!(headers, vec!["name", "email"]);
        }
        other => panic!("Expected MissingPhoneColumn, got {other:?}"),
    }
}

#[test]
fn test_ingest_empty_source() {
    let headers = headers(&["phone"]);

    let err: CoreError = ingest(&headers, &[]).unwrap_err();
    assert_eq!(err, CoreError::EmptySource);
}

#[test]
fn test_ingest_missing_phone_column_reported_before_empty_source() {
    let err: CoreError = ingest(&headers(&["name"]), &[]).unwrap_err();
    assert!(matches!(err, CoreError::MissingPhoneColumn { .. }));
}

#[test]
fn test_ingest_preserves_row_order() {
    let headers = headers(&["phone"]);
    let rows = rows(&[&["0811"], &["0822"], &["0833"]]);

    let records = ingest(&headers, &rows).unwrap();
    let indices: Vec<usize> = records.iter().map(|r| r.row_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}
