// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ingest::{RawRecord, ingest};

pub fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

pub fn rows(cells: &[&[&str]]) -> Vec<Vec<String>> {
    cells
        .iter()
        .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
        .collect()
}

/// Ingests a phone-only source, one row per phone value.
pub fn phone_records(phones: &[&str]) -> Vec<RawRecord> {
    let source_rows: Vec<Vec<String>> = phones.iter().map(|p| vec![(*p).to_string()]).collect();
    ingest(&headers(&["phone"]), &source_rows).unwrap()
}
