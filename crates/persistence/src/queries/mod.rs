// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries for the batch store.
//!
//! ## Module Organization
//!
//! - `batches` — Batch row reads and pending-batch listings
//! - `recipients` — Recipient reads in canonical row order
//! - `quotas` — Tenant quota ledger reads

pub mod batches;
pub mod quotas;
pub mod recipients;
