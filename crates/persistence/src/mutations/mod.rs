// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations for the batch store.
//!
//! ## Module Organization
//!
//! - `batches` — Batch creation, the exclusive dispatch claim, the
//!   cancellation path, and terminal transitions
//! - `recipients` — Per-recipient dispatch result recording
//! - `quotas` — Tenant quota ledger writes
//!
//! Mutations that touch both a recipient and its batch's counters run
//! inside one transaction so progress readers always see the pair
//! move together.

pub mod batches;
pub mod quotas;
pub mod recipients;
