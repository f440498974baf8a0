// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod batch;
mod batch_status;
mod error;
mod recipient;
mod template;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use batch::BulkBatch;
pub use batch_status::BatchStatus;
pub use recipient::{DispatchState, Recipient, ValidationState};
pub use template::{placeholders, render};

// Re-export public types
pub use error::DomainError;
pub use types::{Phone, RecipientFields};
pub use validation::{MAX_PHONE_DIGITS, MIN_PHONE_DIGITS, normalize_phone};
