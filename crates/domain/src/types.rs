// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::validation::normalize_phone;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A phone number in canonical form.
///
/// Construction goes through [`Phone::parse`], so holding a `Phone`
/// means the value already passed separator stripping and shape
/// validation. Recipients that failed validation keep their raw string
/// instead and never become a `Phone`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phone {
    /// The canonical value: digits, optionally prefixed with `+`.
    value: String,
}

impl Phone {
    /// Parses a raw phone value into its canonical form.
    ///
    /// # Arguments
    ///
    /// * `raw` - The phone value as it appeared in the ingested source
    ///
    /// # Errors
    ///
    /// Returns the normalization error when the value is empty,
    /// contains invalid characters, or falls outside the digit bounds.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let value: String = normalize_phone(raw)?;
        Ok(Self { value })
    }

    /// Returns the canonical phone string.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Consumes the phone, returning the canonical string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.value
    }
}

impl FromStr for Phone {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Phone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// The extra columns attached to a recipient, usable as template fields.
///
/// Field order follows the column order of the ingested source. Lookups
/// are exact and case-sensitive; the first pair with a matching name
/// wins when a source repeats a column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientFields {
    /// Name/value pairs in source column order.
    pairs: Vec<(String, String)>,
}

impl RecipientFields {
    /// Creates an empty field set.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Creates a field set from name/value pairs, preserving their order.
    #[must_use]
    pub const fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// Appends a field at the end of the ordering.
    pub fn push(&mut self, name: String, value: String) {
        self.pairs.push((name, value));
    }

    /// Looks up a field value by exact, case-sensitive name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates name/value pairs in source column order.
    pub fn iter(&self) -> std::slice::Iter<'_, (String, String)> {
        self.pairs.iter()
    }

    /// Returns the field names in source column order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.pairs.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Returns the number of fields.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<'a> IntoIterator for &'a RecipientFields {
    type Item = &'a (String, String);
    type IntoIter = std::slice::Iter<'a, (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}
