// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Phone value is empty after trimming.
    EmptyPhone,
    /// Phone contains characters other than digits, separators, and a
    /// leading plus sign.
    PhoneInvalidCharacters {
        /// The raw phone value as ingested.
        phone: String,
    },
    /// Phone has fewer digits than the minimum.
    PhoneTooShort {
        /// The number of digits found.
        digits: usize,
        /// The minimum digit count.
        min: usize,
    },
    /// Phone has more digits than the maximum.
    PhoneTooLong {
        /// The number of digits found.
        digits: usize,
        /// The maximum digit count.
        max: usize,
    },
    /// Batch status string is not a recognized status.
    InvalidBatchStatus {
        /// The unrecognized status string.
        status: String,
    },
    /// Validation state string is not a recognized state.
    InvalidValidationState {
        /// The unrecognized state string.
        state: String,
    },
    /// Dispatch state string is not a recognized state.
    InvalidDispatchState {
        /// The unrecognized state string.
        state: String,
    },
    /// Batch status transition is not permitted.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition is not allowed.
        reason: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPhone => write!(f, "Phone number is empty"),
            Self::PhoneInvalidCharacters { phone } => {
                write!(f, "Phone number '{phone}' contains invalid characters")
            }
            Self::PhoneTooShort { digits, min } => {
                write!(
                    f,
                    "Phone number has {digits} digits. Must have at least {min}"
                )
            }
            Self::PhoneTooLong { digits, max } => {
                write!(
                    f,
                    "Phone number has {digits} digits. Must have at most {max}"
                )
            }
            Self::InvalidBatchStatus { status } => {
                write!(f, "Invalid batch status: {status}")
            }
            Self::InvalidValidationState { state } => {
                write!(f, "Invalid validation state: {state}")
            }
            Self::InvalidDispatchState { state } => {
                write!(f, "Invalid dispatch state: {state}")
            }
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Cannot transition batch from {from} to {to}: {reason}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
