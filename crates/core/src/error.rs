// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use wa_blast_domain::DomainError;

/// Errors that can occur while turning an uploaded source into
/// recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// No header matched a recognized phone column alias.
    MissingPhoneColumn {
        /// The headers that were present in the source.
        headers: Vec<String>,
    },
    /// The source could not be tokenized into rows at all.
    UnparseableSource {
        /// Why tokenization failed.
        reason: String,
    },
    /// The source contained a header row but no data rows.
    EmptySource,
    /// A domain rule was violated.
    DomainViolation(DomainError),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingPhoneColumn { headers } => {
                write!(
                    f,
                    "No phone column found. Expected one of 'phone', 'number', 'whatsapp', or 'telepon'; got: {}",
                    headers.join(", ")
                )
            }
            Self::UnparseableSource { reason } => {
                write!(f, "Recipient source could not be parsed: {reason}")
            }
            Self::EmptySource => write!(f, "Recipient source contains no data rows"),
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
