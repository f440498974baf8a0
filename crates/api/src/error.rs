// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::send_policy::SendPolicyError;
use wa_blast::CoreError;
use wa_blast_persistence::PersistenceError;

/// API-level errors.
///
/// These are distinct from core/persistence errors and represent the
/// API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The uploaded recipient source was rejected before any batch was
    /// created.
    SourceRejected {
        /// A human-readable description of why the source was rejected.
        message: String,
    },
    /// A send-policy rule was violated.
    SendPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An operation was invoked against a batch in the wrong state.
    InvalidBatchState {
        /// The batch the operation targeted.
        batch_id: i64,
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::SourceRejected { message } => {
                write!(f, "Recipient source rejected: {message}")
            }
            Self::SendPolicyViolation { message } => {
                write!(f, "Send policy violation: {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::InvalidBatchState { batch_id, message } => {
                write!(f, "Batch {batch_id} is in the wrong state: {message}")
            }
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<SendPolicyError> for ApiError {
    fn from(err: SendPolicyError) -> Self {
        Self::SendPolicyViolation {
            message: err.to_string(),
        }
    }
}

/// Translates a core ingestion error to an API error.
///
/// Ingestion-time failures surface synchronously and leave no partial
/// batch behind.
#[must_use]
pub fn translate_core_error(err: &CoreError) -> ApiError {
    match err {
        CoreError::MissingPhoneColumn { .. }
        | CoreError::UnparseableSource { .. }
        | CoreError::EmptySource => ApiError::SourceRejected {
            message: err.to_string(),
        },
        CoreError::DomainViolation(domain_err) => ApiError::InvalidInput {
            field: String::from("source"),
            message: domain_err.to_string(),
        },
    }
}

/// Translates a persistence error to an API error.
#[must_use]
pub fn translate_persistence_error(err: &PersistenceError) -> ApiError {
    match err {
        PersistenceError::BatchNotFound(batch_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Batch"),
            message: format!("No batch with ID {batch_id}"),
        },
        PersistenceError::InvalidBatchState {
            batch_id,
            status,
            operation,
        } => ApiError::InvalidBatchState {
            batch_id: *batch_id,
            message: format!("cannot {operation} while {status}"),
        },
        _ => ApiError::Internal {
            message: err.to_string(),
        },
    }
}
