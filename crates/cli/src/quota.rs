// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Quota guard backed by the tenant quota ledger.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use wa_blast::{QuotaDecision, QuotaGuard};
use wa_blast_persistence::SqlitePersistence;

/// Quota guard that reserves allotment from the persisted ledger.
///
/// Tenants without a ledger row are unmetered and always allowed. A
/// ledger read or write failure is reported as a denial; the dispatch
/// loop then fails the batch rather than sending unmetered.
pub struct SubscriptionQuotaGuard {
    /// The shared batch store holding the quota ledger.
    persistence: Arc<Mutex<SqlitePersistence>>,
}

impl SubscriptionQuotaGuard {
    /// Creates a guard over the shared batch store.
    #[must_use]
    pub const fn new(persistence: Arc<Mutex<SqlitePersistence>>) -> Self {
        Self { persistence }
    }
}

#[async_trait]
impl QuotaGuard for SubscriptionQuotaGuard {
    async fn check_and_reserve(&self, tenant_id: &str, count: u32) -> QuotaDecision {
        let mut persistence = self.persistence.lock().await;

        match persistence.try_reserve_quota(tenant_id, i64::from(count)) {
            Ok(true) => QuotaDecision::allowed(),
            Ok(false) => {
                info!(tenant_id, count, "Quota reservation denied");
                QuotaDecision::denied()
            }
            Err(err) => {
                error!(tenant_id, error = %err, "Quota ledger unavailable");
                QuotaDecision::denied()
            }
        }
    }
}
