// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Phone number normalization rules.
//!
//! Recipient phone numbers arrive in whatever shape the operator's
//! spreadsheet used. Normalization strips formatting separators and
//! enforces the accepted shape: an optional leading plus sign followed
//! by digits only, within the configured length bounds. The canonical
//! form retains the plus sign so international prefixes survive
//! round-trips through persistence and export.

use crate::error::DomainError;

/// Minimum number of digits in a normalized phone number.
pub const MIN_PHONE_DIGITS: usize = 4;

/// Maximum number of digits in a normalized phone number (E.164 ceiling).
pub const MAX_PHONE_DIGITS: usize = 15;

/// Formatting characters stripped before shape validation.
const SEPARATORS: [char; 5] = [' ', '-', '(', ')', '.'];

/// Normalizes a raw phone value into its canonical form.
///
/// Strips separator characters (spaces, hyphens, parentheses, dots),
/// accepts an optional leading `+`, and requires every remaining
/// character to be an ASCII digit.
///
/// # Arguments
///
/// * `raw` - The phone value as it appeared in the ingested source
///
/// # Returns
///
/// The canonical phone string: digits only, prefixed with `+` when the
/// raw value carried one.
///
/// # Errors
///
/// Returns `DomainError::EmptyPhone` if the value is empty after
/// trimming, `DomainError::PhoneInvalidCharacters` if non-digit
/// characters remain after separator stripping, and
/// `DomainError::PhoneTooShort` / `DomainError::PhoneTooLong` if the
/// digit count falls outside the accepted bounds.
pub fn normalize_phone(raw: &str) -> Result<String, DomainError> {
    let trimmed: &str = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyPhone);
    }

    let stripped: String = trimmed
        .chars()
        .filter(|c| !SEPARATORS.contains(c))
        .collect();

    let (has_plus, digits) = match stripped.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, stripped.as_str()),
    };

    if digits.is_empty() {
        return Err(DomainError::EmptyPhone);
    }

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::PhoneInvalidCharacters {
            phone: raw.to_string(),
        });
    }

    let digit_count: usize = digits.len();
    if digit_count < MIN_PHONE_DIGITS {
        return Err(DomainError::PhoneTooShort {
            digits: digit_count,
            min: MIN_PHONE_DIGITS,
        });
    }
    if digit_count > MAX_PHONE_DIGITS {
        return Err(DomainError::PhoneTooLong {
            digits: digit_count,
            max: MAX_PHONE_DIGITS,
        });
    }

    if has_plus {
        Ok(format!("+{digits}"))
    } else {
        Ok(digits.to_string())
    }
}
