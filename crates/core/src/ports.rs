// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Contracts for the external collaborators of the dispatch loop.
//!
//! The engine depends on two narrow seams: a quota service that
//! reserves message allotment per tenant, and a provider transport
//! that performs the actual delivery. Both are intentionally
//! infallible at the signature level; implementations fold their
//! internal failures into the returned outcome so dispatch never has
//! to reason about transport exceptions.

use async_trait::async_trait;

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// Whether the provider accepted the message.
    pub success: bool,
    /// Provider or transport error detail when the send failed.
    pub error: Option<String>,
}

impl SendOutcome {
    /// A successful delivery.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A failed delivery carrying its error detail.
    #[must_use]
    pub const fn failure(error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
        }
    }
}

/// Result of a quota reservation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    /// Whether the reservation was granted.
    pub allowed: bool,
}

impl QuotaDecision {
    /// A granted reservation.
    #[must_use]
    pub const fn allowed() -> Self {
        Self { allowed: true }
    }

    /// A denied reservation.
    #[must_use]
    pub const fn denied() -> Self {
        Self { allowed: false }
    }
}

/// Delivers one rendered message through a provider instance.
///
/// Implementations must fold every failure mode (provider rejection,
/// connectivity loss, timeout, malformed response) into a
/// [`SendOutcome`]; a failed send is a per-recipient fact, never a
/// dispatch-loop fault.
#[async_trait]
pub trait ProviderTransport: Send + Sync {
    /// Sends one message to one phone through the given instance.
    async fn send(&self, instance_id: &str, phone: &str, body: &str) -> SendOutcome;
}

/// Reserves message allotment for a tenant before each send.
///
/// A denied reservation is a hard stop for the batch: dispatch marks
/// the batch failed and does not retry.
#[async_trait]
pub trait QuotaGuard: Send + Sync {
    /// Attempts to reserve `count` messages for the tenant.
    async fn check_and_reserve(&self, tenant_id: &str, count: u32) -> QuotaDecision;
}
