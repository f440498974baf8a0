// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-recipient validation and dispatch state.

use crate::error::DomainError;
use crate::types::RecipientFields;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Outcome of validating one ingested row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    /// Phone normalized successfully and was the first occurrence
    Valid,
    /// Phone failed normalization; never dispatched
    Invalid,
    /// Phone repeats an earlier row's normalized phone; never dispatched
    Duplicate,
}

impl ValidationState {
    /// Returns the string representation of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Duplicate => "duplicate",
        }
    }

    /// Parses a state from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidValidationState` if the string is
    /// not a valid state.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "valid" => Ok(Self::Valid),
            "invalid" => Ok(Self::Invalid),
            "duplicate" => Ok(Self::Duplicate),
            _ => Err(DomainError::InvalidValidationState {
                state: s.to_string(),
            }),
        }
    }
}

impl FromStr for ValidationState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for ValidationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Delivery outcome for one recipient.
///
/// Only recipients with `ValidationState::Valid` ever leave `NotSent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    /// No send has been attempted
    NotSent,
    /// Provider accepted the message
    Sent,
    /// Provider rejected the message or the send errored
    Failed,
}

impl DispatchState {
    /// Returns the string representation of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotSent => "not_sent",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    /// Parses a state from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDispatchState` if the string is not
    /// a valid state.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "not_sent" => Ok(Self::NotSent),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            _ => Err(DomainError::InvalidDispatchState {
                state: s.to_string(),
            }),
        }
    }
}

impl FromStr for DispatchState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for DispatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One target row within a bulk batch.
///
/// `row_index` is the position of the row in the ingested source and
/// defines the canonical ordering used by validation, dispatch, and
/// export alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Database identifier; `None` until persisted.
    pub recipient_id: Option<i64>,
    /// Zero-based position of the row in the ingested source.
    pub row_index: usize,
    /// Canonical phone for valid rows; the raw value for invalid ones.
    pub phone: String,
    /// Extra columns from the source, usable as template fields.
    pub fields: RecipientFields,
    /// Validation outcome for this row.
    pub validation_state: ValidationState,
    /// Human-readable validation failures; empty unless invalid.
    pub validation_errors: Vec<String>,
    /// Delivery outcome for this row.
    pub dispatch_state: DispatchState,
    /// Provider or transport error from the last send attempt.
    pub dispatch_error: Option<String>,
}

impl Recipient {
    /// Creates a valid recipient awaiting dispatch.
    #[must_use]
    pub const fn valid(row_index: usize, phone: String, fields: RecipientFields) -> Self {
        Self {
            recipient_id: None,
            row_index,
            phone,
            fields,
            validation_state: ValidationState::Valid,
            validation_errors: Vec::new(),
            dispatch_state: DispatchState::NotSent,
            dispatch_error: None,
        }
    }

    /// Creates an invalid recipient carrying its validation failures.
    #[must_use]
    pub const fn invalid(
        row_index: usize,
        phone: String,
        fields: RecipientFields,
        validation_errors: Vec<String>,
    ) -> Self {
        Self {
            recipient_id: None,
            row_index,
            phone,
            fields,
            validation_state: ValidationState::Invalid,
            validation_errors,
            dispatch_state: DispatchState::NotSent,
            dispatch_error: None,
        }
    }

    /// Creates a duplicate recipient (repeat of an earlier row's phone).
    #[must_use]
    pub const fn duplicate(row_index: usize, phone: String, fields: RecipientFields) -> Self {
        Self {
            recipient_id: None,
            row_index,
            phone,
            fields,
            validation_state: ValidationState::Duplicate,
            validation_errors: Vec::new(),
            dispatch_state: DispatchState::NotSent,
            dispatch_error: None,
        }
    }

    /// Returns true if the dispatch loop should attempt this recipient.
    #[must_use]
    pub fn is_dispatchable(&self) -> bool {
        self.validation_state == ValidationState::Valid
            && self.dispatch_state == DispatchState::NotSent
    }
}
