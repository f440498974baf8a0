// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tenant quota ledger writes.
//!
//! Reservation is a conditional increment: the update only lands when
//! the tenant still has allotment left, so two dispatch loops for the
//! same tenant can never jointly overrun the limit.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::diesel_schema::tenant_quotas;
use crate::error::PersistenceError;

/// Sets (or creates) a tenant's message limit.
///
/// An existing ledger row keeps its `messages_used`; only the limit
/// changes.
///
/// # Errors
///
/// Returns an error if the upsert fails.
pub fn set_quota(
    conn: &mut SqliteConnection,
    owner_id: &str,
    message_limit: i64,
) -> Result<(), PersistenceError> {
    info!(owner_id, message_limit, "Setting tenant quota");

    diesel::insert_into(tenant_quotas::table)
        .values((
            tenant_quotas::owner_id.eq(owner_id),
            tenant_quotas::message_limit.eq(message_limit),
        ))
        .on_conflict(tenant_quotas::owner_id)
        .do_update()
        .set(tenant_quotas::message_limit.eq(message_limit))
        .execute(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("set_quota: {e}")))?;

    Ok(())
}

/// Attempts to reserve `count` messages for a tenant.
///
/// A tenant with no ledger row is unmetered and is always allowed.
/// For metered tenants the reservation is a conditional increment
/// that fails when it would exceed the limit.
///
/// # Returns
///
/// `true` if the reservation was granted.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn try_reserve(
    conn: &mut SqliteConnection,
    owner_id: &str,
    count: i64,
) -> Result<bool, PersistenceError> {
    conn.transaction::<bool, PersistenceError, _>(|conn| {
        let metered: bool = tenant_quotas::table
            .filter(tenant_quotas::owner_id.eq(owner_id))
            .count()
            .get_result::<i64>(conn)?
            > 0;

        if !metered {
            return Ok(true);
        }

        let rows: usize = diesel::update(
            tenant_quotas::table
                .filter(tenant_quotas::owner_id.eq(owner_id))
                .filter(tenant_quotas::messages_used.le(tenant_quotas::message_limit - count)),
        )
        .set(tenant_quotas::messages_used.eq(tenant_quotas::messages_used + count))
        .execute(conn)?;

        if rows == 0 {
            debug!(owner_id, count, "Quota reservation denied");
        }
        Ok(rows == 1)
    })
}
