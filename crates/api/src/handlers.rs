// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The batch query surface.
//!
//! Each handler composes ingestion, validation, policy, and the batch
//! store into one operation. Batch reads are tenant-scoped: a batch
//! owned by another tenant is indistinguishable from a batch that does
//! not exist.

use crate::csv_io::{parse_recipient_csv, write_export_csv};
use crate::error::{ApiError, translate_core_error, translate_persistence_error};
use crate::request_response::{
    BatchStatusResponse, CancelBatchResponse, CreateBatchRequest, CreateBatchResponse,
    IngestionPreviewResponse, IngestionStatsInfo, ListBatchesResponse, QuotaResponse,
    RecipientPreview, RowErrorInfo,
};
use crate::send_policy::SendPolicy;
use tracing::{debug, info};
use wa_blast::{IngestionResult, RawRecord, ingest, template_warnings, validate};
use wa_blast_domain::{BulkBatch, Recipient};
use wa_blast_persistence::Persistence;

/// Loads a batch if it exists and belongs to the given tenant.
///
/// A batch owned by another tenant surfaces as `ResourceNotFound`, so
/// cross-tenant probes learn nothing.
fn load_owned_batch(
    persistence: &mut Persistence,
    owner_id: &str,
    batch_id: i64,
) -> Result<BulkBatch, ApiError> {
    let batch: BulkBatch = persistence
        .get_batch(batch_id)
        .map_err(|err| translate_persistence_error(&err))?;

    if batch.owner_id == owner_id {
        Ok(batch)
    } else {
        Err(ApiError::ResourceNotFound {
            resource_type: String::from("Batch"),
            message: format!("No batch with ID {batch_id}"),
        })
    }
}

/// Runs ingestion and validation over an uploaded CSV source.
fn ingest_and_validate(csv_bytes: &[u8]) -> Result<(IngestionResult, Vec<String>), ApiError> {
    let (headers, rows) = parse_recipient_csv(csv_bytes)?;

    let records: Vec<RawRecord> =
        ingest(&headers, &rows).map_err(|err| translate_core_error(&err))?;

    let field_names: Vec<String> = records.first().map_or_else(Vec::new, |record| {
        record
            .fields
            .names()
            .into_iter()
            .map(std::string::ToString::to_string)
            .collect()
    });

    Ok((validate(records), field_names))
}

/// Previews an ingestion without creating a batch.
///
/// Returns the aggregate counts, the first few valid recipients, and a
/// bounded list of per-row validation failures.
///
/// # Arguments
///
/// * `csv_bytes` - The raw CSV upload
///
/// # Errors
///
/// Returns `ApiError::SourceRejected` when the source is unparseable,
/// has no phone column, or has no data rows.
pub fn preview_ingestion(csv_bytes: &[u8]) -> Result<IngestionPreviewResponse, ApiError> {
    let (result, _field_names) = ingest_and_validate(csv_bytes)?;

    debug!(
        total = result.stats.total,
        valid = result.stats.valid,
        invalid = result.stats.invalid,
        duplicates = result.stats.duplicates,
        "Previewed ingestion"
    );

    Ok(IngestionPreviewResponse {
        stats: IngestionStatsInfo::from(result.stats),
        preview: result.preview.iter().map(RecipientPreview::from).collect(),
        row_errors: result.row_errors.iter().map(RowErrorInfo::from).collect(),
    })
}

/// Creates a bulk batch from an uploaded recipient source.
///
/// Ingests and validates the source, enforces the send policy, and
/// persists the batch in `pending` status together with every
/// classified row. Rejection at any step leaves no partial batch
/// behind.
///
/// # Arguments
///
/// * `persistence` - The batch store
/// * `policy` - The send policy to enforce
/// * `request` - The batch parameters
/// * `csv_bytes` - The raw CSV upload
///
/// # Errors
///
/// Returns `ApiError::SourceRejected` for unparseable sources,
/// `ApiError::SendPolicyViolation` for policy failures, and
/// `ApiError::Internal` if persistence fails.
pub fn create_batch(
    persistence: &mut Persistence,
    policy: &SendPolicy,
    request: &CreateBatchRequest,
    csv_bytes: &[u8],
) -> Result<CreateBatchResponse, ApiError> {
    let (result, field_names) = ingest_and_validate(csv_bytes)?;

    policy.validate(
        &request.name,
        &request.template,
        request.delay_ms,
        result.stats.valid,
    )?;

    let warnings: Vec<String> = template_warnings(&request.template, &field_names);

    let batch: BulkBatch = BulkBatch::new(
        request.owner_id.clone(),
        request.instance_id.clone(),
        request.name.clone(),
        request.template.clone(),
        request.delay_ms,
        result.stats.valid,
    );

    let batch_id: i64 = persistence
        .create_batch(&batch, &result.recipients)
        .map_err(|err| translate_persistence_error(&err))?;

    info!(
        batch_id,
        owner_id = %request.owner_id,
        total_recipients = result.stats.valid,
        invalid = result.stats.invalid,
        duplicates = result.stats.duplicates,
        "Created batch"
    );

    Ok(CreateBatchResponse {
        batch_id,
        total_recipients: result.stats.valid,
        invalid_count: result.stats.invalid,
        duplicate_count: result.stats.duplicates,
        template_warnings: warnings,
    })
}

/// Retrieves a consistent status snapshot for one batch.
///
/// # Arguments
///
/// * `persistence` - The batch store
/// * `owner_id` - The tenant making the request
/// * `batch_id` - The batch to read
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the batch does not exist or
/// belongs to another tenant.
pub fn get_batch_status(
    persistence: &mut Persistence,
    owner_id: &str,
    batch_id: i64,
) -> Result<BatchStatusResponse, ApiError> {
    let batch: BulkBatch = load_owned_batch(persistence, owner_id, batch_id)?;
    Ok(BatchStatusResponse::from(&batch))
}

/// Lists a tenant's batches, newest first.
///
/// # Arguments
///
/// * `persistence` - The batch store
/// * `owner_id` - The tenant making the request
///
/// # Errors
///
/// Returns `ApiError::Internal` if the query fails.
pub fn list_batches(
    persistence: &mut Persistence,
    owner_id: &str,
) -> Result<ListBatchesResponse, ApiError> {
    let batches: Vec<BulkBatch> = persistence
        .list_batches(owner_id)
        .map_err(|err| translate_persistence_error(&err))?;

    Ok(ListBatchesResponse {
        batches: batches.iter().map(BatchStatusResponse::from).collect(),
    })
}

/// Requests cancellation of a batch.
///
/// Pending batches cancel immediately; processing batches stop after
/// the in-flight send finishes. Idempotent for already-cancelled
/// batches.
///
/// # Arguments
///
/// * `persistence` - The batch store
/// * `owner_id` - The tenant making the request
/// * `batch_id` - The batch to cancel
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the batch does not exist or
/// belongs to another tenant, and `ApiError::InvalidBatchState` if the
/// batch already completed or failed.
pub fn cancel_batch(
    persistence: &mut Persistence,
    owner_id: &str,
    batch_id: i64,
) -> Result<CancelBatchResponse, ApiError> {
    load_owned_batch(persistence, owner_id, batch_id)?;

    persistence
        .request_cancel(batch_id)
        .map_err(|err| translate_persistence_error(&err))?;

    let batch: BulkBatch = persistence
        .get_batch(batch_id)
        .map_err(|err| translate_persistence_error(&err))?;

    info!(batch_id, owner_id, status = %batch.status, "Cancellation requested");

    Ok(CancelBatchResponse {
        batch_id,
        status: batch.status.to_string(),
    })
}

/// Exports a batch's recipients as CSV.
///
/// Legal at any batch status; the export reflects whatever dispatch
/// progress has been made, in canonical row order.
///
/// # Arguments
///
/// * `persistence` - The batch store
/// * `owner_id` - The tenant making the request
/// * `batch_id` - The batch to export
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the batch does not exist or
/// belongs to another tenant.
pub fn export_batch(
    persistence: &mut Persistence,
    owner_id: &str,
    batch_id: i64,
) -> Result<Vec<u8>, ApiError> {
    load_owned_batch(persistence, owner_id, batch_id)?;

    let recipients: Vec<Recipient> = persistence
        .get_recipients(batch_id)
        .map_err(|err| translate_persistence_error(&err))?;

    debug!(batch_id, owner_id, rows = recipients.len(), "Exported batch");

    write_export_csv(&recipients)
}

/// Sets (or creates) a tenant's message limit.
///
/// # Arguments
///
/// * `persistence` - The batch store
/// * `owner_id` - The tenant whose limit is being set
/// * `message_limit` - Messages the subscription allows
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` for a negative limit and
/// `ApiError::Internal` if the upsert fails.
pub fn set_quota(
    persistence: &mut Persistence,
    owner_id: &str,
    message_limit: i64,
) -> Result<QuotaResponse, ApiError> {
    if message_limit < 0 {
        return Err(ApiError::InvalidInput {
            field: String::from("message_limit"),
            message: String::from("Message limit must not be negative"),
        });
    }

    persistence
        .set_quota(owner_id, message_limit)
        .map_err(|err| translate_persistence_error(&err))?;

    info!(owner_id, message_limit, "Set quota");

    let quota = persistence
        .get_quota(owner_id)
        .map_err(|err| translate_persistence_error(&err))?
        .ok_or_else(|| ApiError::Internal {
            message: format!("Quota for '{owner_id}' missing after upsert"),
        })?;

    Ok(QuotaResponse::from(&quota))
}

/// Retrieves a tenant's quota ledger entry.
///
/// # Arguments
///
/// * `persistence` - The batch store
/// * `owner_id` - The tenant to look up
///
/// # Returns
///
/// `None` for an unmetered tenant.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the query fails.
pub fn get_quota(
    persistence: &mut Persistence,
    owner_id: &str,
) -> Result<Option<QuotaResponse>, ApiError> {
    let quota = persistence
        .get_quota(owner_id)
        .map_err(|err| translate_persistence_error(&err))?;

    Ok(quota.as_ref().map(QuotaResponse::from))
}
