// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Send policy validation.
//!
//! This module enforces the operator-facing rules a send request must
//! satisfy before a batch is created: a usable name and template, an
//! inter-message delay at or above the configured minimum, and at
//! least one valid recipient to dispatch to.

use thiserror::Error;

/// Send policy errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendPolicyError {
    /// The batch name is empty.
    #[error("Batch name must not be empty")]
    EmptyName,

    /// The message template is empty.
    #[error("Message template must not be empty")]
    EmptyTemplate,

    /// The inter-message delay is below the configured minimum.
    #[error("Delay of {delay_ms} ms is below the minimum of {min_delay_ms} ms")]
    DelayTooShort {
        /// The requested delay.
        delay_ms: u64,
        /// The configured minimum delay.
        min_delay_ms: u64,
    },

    /// The validated source contains no dispatchable recipients.
    #[error("Recipient source contains no valid recipients")]
    NoValidRecipients,
}

/// Send policy configuration.
pub struct SendPolicy {
    /// Minimum inter-message delay, in milliseconds.
    pub min_delay_ms: u64,
}

impl Default for SendPolicy {
    fn default() -> Self {
        Self { min_delay_ms: 1000 }
    }
}

impl SendPolicy {
    /// Validates a send request against the policy.
    ///
    /// # Arguments
    ///
    /// * `name` - The operator-chosen batch name
    /// * `template` - The message template
    /// * `delay_ms` - The requested inter-message delay
    /// * `valid_recipients` - Count of valid recipients after
    ///   validation and deduplication
    ///
    /// # Errors
    ///
    /// Returns a `SendPolicyError` if the request does not meet policy
    /// requirements.
    pub fn validate(
        &self,
        name: &str,
        template: &str,
        delay_ms: u64,
        valid_recipients: usize,
    ) -> Result<(), SendPolicyError> {
        if name.trim().is_empty() {
            return Err(SendPolicyError::EmptyName);
        }

        if template.trim().is_empty() {
            return Err(SendPolicyError::EmptyTemplate);
        }

        if delay_ms < self.min_delay_ms {
            return Err(SendPolicyError::DelayTooShort {
                delay_ms,
                min_delay_ms: self.min_delay_ms,
            });
        }

        if valid_recipients == 0 {
            return Err(SendPolicyError::NoValidRecipients);
        }

        Ok(())
    }
}
