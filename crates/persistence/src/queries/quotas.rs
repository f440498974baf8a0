// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tenant quota ledger queries.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::QuotaStatus;
use crate::diesel_schema::tenant_quotas;
use crate::error::PersistenceError;

/// Retrieves a tenant's quota ledger entry.
///
/// Returns `None` for a tenant with no ledger row; such tenants are
/// unmetered.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_quota(
    conn: &mut SqliteConnection,
    owner_id: &str,
) -> Result<Option<QuotaStatus>, PersistenceError> {
    tenant_quotas::table
        .filter(tenant_quotas::owner_id.eq(owner_id))
        .first::<QuotaStatus>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_quota: {e}")))
}
