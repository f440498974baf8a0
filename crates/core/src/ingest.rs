// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Recipient source ingestion.
//!
//! Turns a tokenized tabular source (header row plus data rows) into
//! raw candidate records. Ingestion is format-agnostic: the caller
//! hands over headers and rows, this module finds the phone column and
//! maps every remaining column into the recipient's field map. Row
//! order is preserved; it is the canonical ordering used everywhere
//! downstream.

use crate::error::CoreError;
use wa_blast_domain::RecipientFields;

/// Header names recognized as the phone column, compared
/// case-insensitively after trimming.
pub const PHONE_HEADER_ALIASES: [&str; 4] = ["phone", "number", "whatsapp", "telepon"];

/// One data row as ingested, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Zero-based position of the row in the source.
    pub row_index: usize,
    /// The phone cell exactly as it appeared.
    pub phone_raw: String,
    /// Every non-phone column, in source column order.
    pub fields: RecipientFields,
}

/// Normalizes a header for alias comparison.
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Returns the index of the first header matching a phone alias.
fn find_phone_column(headers: &[String]) -> Option<usize> {
    headers
        .iter()
        .position(|header| PHONE_HEADER_ALIASES.contains(&normalize_header(header).as_str()))
}

/// Ingests a tokenized tabular source into raw candidate records.
///
/// The first header matching a phone alias becomes the phone column;
/// every other column becomes a template field keyed by its trimmed
/// header as typed. Rows shorter than the header row yield empty cells
/// rather than being dropped, so a missing phone cell surfaces later as
/// a validation failure on that row.
///
/// # Arguments
///
/// * `headers` - The header row of the source
/// * `rows` - The data rows, in source order
///
/// # Returns
///
/// One `RawRecord` per data row, in source order.
///
/// # Errors
///
/// Returns `CoreError::MissingPhoneColumn` if no header matches a
/// phone alias, and `CoreError::EmptySource` if the source has no data
/// rows.
pub fn ingest(headers: &[String], rows: &[Vec<String>]) -> Result<Vec<RawRecord>, CoreError> {
    let phone_column: usize =
        find_phone_column(headers).ok_or_else(|| CoreError::MissingPhoneColumn {
            headers: headers.to_vec(),
        })?;

    if rows.is_empty() {
        return Err(CoreError::EmptySource);
    }

    let records: Vec<RawRecord> = rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| {
            let phone_raw: String = row.get(phone_column).cloned().unwrap_or_default();

            let mut fields: RecipientFields = RecipientFields::new();
            for (column, header) in headers.iter().enumerate() {
                if column == phone_column {
                    continue;
                }
                let value: String = row.get(column).cloned().unwrap_or_default();
                fields.push(header.trim().to_string(), value);
            }

            RawRecord {
                row_index,
                phone_raw,
                fields,
            }
        })
        .collect();

    Ok(records)
}
