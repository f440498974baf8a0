// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Recipient validation and deduplication.
//!
//! Every ingested row is kept and classified: `valid` rows are the
//! dispatchable population, `invalid` rows carry their normalization
//! failures, and `duplicate` rows repeat an earlier row's normalized
//! phone. The first occurrence of a phone wins regardless of differing
//! field values, so a batch sends at most one message per number. The
//! partition depends only on the input rows and their order.

use crate::ingest::RawRecord;
use std::collections::HashSet;
use wa_blast_domain::{Phone, Recipient, ValidationState};

/// Number of valid recipients included in the ingestion preview.
pub const PREVIEW_LIMIT: usize = 5;

/// Maximum number of rows reported in the per-row error list. Counts
/// in the stats stay exact beyond this bound.
pub const MAX_ROW_ERRORS: usize = 25;

/// Aggregate counts for one validation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionStats {
    /// Total data rows ingested.
    pub total: usize,
    /// Rows that normalized successfully and were first occurrences.
    pub valid: usize,
    /// Rows whose phone failed normalization.
    pub invalid: usize,
    /// Rows repeating an earlier row's normalized phone.
    pub duplicates: usize,
}

/// Validation failures for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// Zero-based position of the row in the source.
    pub row_index: usize,
    /// Human-readable failure reasons.
    pub errors: Vec<String>,
}

/// The complete outcome of validating an ingested source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionResult {
    /// Every ingested row in canonical order, classified.
    pub recipients: Vec<Recipient>,
    /// Aggregate counts.
    pub stats: IngestionStats,
    /// The first few valid recipients, for operator preview.
    pub preview: Vec<Recipient>,
    /// Per-row validation failures, bounded by [`MAX_ROW_ERRORS`].
    pub row_errors: Vec<RowError>,
}

/// Validates and deduplicates raw records into classified recipients.
///
/// Never fails: per-row problems are recorded on the affected row and
/// aggregated into the result. Output order equals input order.
///
/// # Arguments
///
/// * `records` - The raw records from ingestion, in canonical order
#[must_use]
pub fn validate(records: Vec<RawRecord>) -> IngestionResult {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    let mut recipients: Vec<Recipient> = Vec::with_capacity(records.len());
    let mut stats: IngestionStats = IngestionStats::default();
    let mut row_errors: Vec<RowError> = Vec::new();

    for record in records {
        stats.total += 1;

        match Phone::parse(&record.phone_raw) {
            Ok(phone) => {
                let canonical: String = phone.into_string();
                if seen.contains(&canonical) {
                    stats.duplicates += 1;
                    recipients.push(Recipient::duplicate(
                        record.row_index,
                        canonical,
                        record.fields,
                    ));
                } else {
                    seen.insert(canonical.clone());
                    stats.valid += 1;
                    recipients.push(Recipient::valid(record.row_index, canonical, record.fields));
                }
            }
            Err(err) => {
                stats.invalid += 1;
                if row_errors.len() < MAX_ROW_ERRORS {
                    row_errors.push(RowError {
                        row_index: record.row_index,
                        errors: vec![err.to_string()],
                    });
                }
                recipients.push(Recipient::invalid(
                    record.row_index,
                    record.phone_raw,
                    record.fields,
                    vec![err.to_string()],
                ));
            }
        }
    }

    let preview: Vec<Recipient> = recipients
        .iter()
        .filter(|recipient| recipient.validation_state == ValidationState::Valid)
        .take(PREVIEW_LIMIT)
        .cloned()
        .collect();

    IngestionResult {
        recipients,
        stats,
        preview,
        row_errors,
    }
}
