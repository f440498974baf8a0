// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operation boundary for the wa-blast bulk messaging engine.
//!
//! This crate composes the engine into the batch query surface a UI or
//! CLI builds on: preview an ingestion, create a batch, read status
//! and progress, list a tenant's batches, cancel, export, and manage
//! the quota ledger. Handlers validate input, translate between
//! layers, and never leak another tenant's batches.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod csv_io;
mod error;
mod handlers;
mod request_response;
mod send_policy;

#[cfg(test)]
mod tests;

pub use csv_io::{parse_recipient_csv, write_export_csv};
pub use error::{ApiError, translate_core_error, translate_persistence_error};
pub use handlers::{
    cancel_batch, create_batch, export_batch, get_batch_status, get_quota, list_batches,
    preview_ingestion, set_quota,
};
pub use request_response::{
    BatchStatusResponse, CancelBatchResponse, CreateBatchRequest, CreateBatchResponse,
    IngestionPreviewResponse, IngestionStatsInfo, ListBatchesResponse, QuotaResponse,
    RecipientPreview, RowErrorInfo,
};
pub use send_policy::{SendPolicy, SendPolicyError};
