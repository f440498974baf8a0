// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV parsing for uploads and CSV serialization for result export.
//!
//! Uploads arrive as raw bytes and are tokenized here into the header
//! row and data rows the core ingestion consumes. Export writes every
//! recipient of a batch back out in canonical row order, including the
//! rows that were never dispatched.

use crate::error::{ApiError, translate_core_error};
use wa_blast::CoreError;
use wa_blast_domain::Recipient;

/// Parses an uploaded CSV source into its header row and data rows.
///
/// Cells are trimmed; rows shorter or longer than the header row are
/// accepted as-is and reconciled during ingestion.
///
/// # Arguments
///
/// * `bytes` - The raw CSV upload
///
/// # Errors
///
/// Returns `ApiError::SourceRejected` when the bytes are not parseable
/// CSV or the source has no header row.
pub fn parse_recipient_csv(bytes: &[u8]) -> Result<(Vec<String>, Vec<Vec<String>>), ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|err| unparseable(format!("bad header row: {err}")))?
        .iter()
        .map(std::string::ToString::to_string)
        .collect();

    if headers.is_empty() {
        return Err(unparseable(String::from("no header row")));
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| unparseable(format!("bad row: {err}")))?;
        rows.push(record.iter().map(std::string::ToString::to_string).collect());
    }

    Ok((headers, rows))
}

/// Maps a tokenization failure through the core ingest error so the
/// caller-facing message matches every other ingest rejection.
fn unparseable(reason: String) -> ApiError {
    translate_core_error(&CoreError::UnparseableSource { reason })
}

/// Collects the field names appearing across a batch's recipients, in
/// first-seen order.
fn field_columns(recipients: &[Recipient]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for recipient in recipients {
        for (name, _) in &recipient.fields {
            if !columns.iter().any(|column| column == name) {
                columns.push(name.clone());
            }
        }
    }
    columns
}

/// Serializes a batch's recipients to CSV for result export.
///
/// The output carries one row per recipient in canonical row order:
/// phone, every field column seen in the batch, validation state,
/// dispatch state, and the dispatch error if any. Export is legal at
/// any batch status; it reflects whatever progress has been made.
///
/// # Arguments
///
/// * `recipients` - The batch's recipients in canonical row order
///
/// # Errors
///
/// Returns `ApiError::Internal` if CSV serialization fails.
pub fn write_export_csv(recipients: &[Recipient]) -> Result<Vec<u8>, ApiError> {
    let columns: Vec<String> = field_columns(recipients);

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = Vec::with_capacity(columns.len() + 4);
    header.push("phone");
    header.extend(columns.iter().map(std::string::String::as_str));
    header.push("validation_state");
    header.push("dispatch_state");
    header.push("dispatch_error");
    write_row(&mut writer, &header)?;

    for recipient in recipients {
        let mut row: Vec<&str> = Vec::with_capacity(columns.len() + 4);
        row.push(recipient.phone.as_str());
        for column in &columns {
            row.push(recipient.fields.get(column).unwrap_or(""));
        }
        row.push(recipient.validation_state.as_str());
        row.push(recipient.dispatch_state.as_str());
        row.push(recipient.dispatch_error.as_deref().unwrap_or(""));
        write_row(&mut writer, &row)?;
    }

    writer.into_inner().map_err(|err| ApiError::Internal {
        message: format!("Failed to flush export CSV: {err}"),
    })
}

fn write_row(writer: &mut csv::Writer<Vec<u8>>, row: &[&str]) -> Result<(), ApiError> {
    writer.write_record(row).map_err(|err| ApiError::Internal {
        message: format!("Failed to write export CSV row: {err}"),
    })
}
