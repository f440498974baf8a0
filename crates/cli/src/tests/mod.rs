// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod dispatcher_tests;

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use wa_blast::{ProviderTransport, QuotaDecision, QuotaGuard, SendOutcome};
use wa_blast_domain::{BulkBatch, Recipient, RecipientFields};
use wa_blast_persistence::SqlitePersistence;

pub fn shared_store() -> Arc<Mutex<SqlitePersistence>> {
    Arc::new(Mutex::new(SqlitePersistence::new_in_memory().unwrap()))
}

/// Creates a pending batch of valid recipients with a `name` field and
/// returns its ID. Delay is zero so tests run instantly.
pub async fn seed_batch(
    store: &Arc<Mutex<SqlitePersistence>>,
    template: &str,
    rows: &[(&str, &str)],
) -> i64 {
    let batch = BulkBatch::new(
        String::from("acme"),
        String::from("primary"),
        String::from("launch"),
        template.to_string(),
        0,
        rows.len(),
    );
    let recipients: Vec<Recipient> = rows
        .iter()
        .enumerate()
        .map(|(row_index, (phone, name))| {
            let mut fields = RecipientFields::new();
            fields.push(String::from("name"), (*name).to_string());
            Recipient::valid(row_index, (*phone).to_string(), fields)
        })
        .collect();

    store
        .lock()
        .await
        .create_batch(&batch, &recipients)
        .unwrap()
}

/// Transport that records every send and fails scripted phones.
pub struct FakeTransport {
    /// Recorded `(phone, body)` pairs in send order.
    pub sent: std::sync::Mutex<Vec<(String, String)>>,
    /// Phones whose sends fail.
    pub fail_phones: Vec<String>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
            fail_phones: Vec::new(),
        }
    }

    pub fn failing(fail_phones: &[&str]) -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
            fail_phones: fail_phones.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    pub fn sent_phones(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(phone, _)| phone.clone())
            .collect()
    }
}

#[async_trait]
impl ProviderTransport for FakeTransport {
    async fn send(&self, _instance_id: &str, phone: &str, body: &str) -> SendOutcome {
        self.sent
            .lock()
            .unwrap()
            .push((phone.to_string(), body.to_string()));

        if self.fail_phones.iter().any(|failing| failing == phone) {
            SendOutcome::failure(String::from("instance disconnected"))
        } else {
            SendOutcome::ok()
        }
    }
}

/// Transport that requests cancellation after a scripted number of
/// successful sends, mimicking an operator cancelling mid-flight.
pub struct CancellingTransport {
    store: Arc<Mutex<SqlitePersistence>>,
    batch_id: AtomicI64,
    cancel_after: usize,
    sends: AtomicUsize,
}

impl CancellingTransport {
    pub fn new(store: Arc<Mutex<SqlitePersistence>>, cancel_after: usize) -> Self {
        Self {
            store,
            batch_id: AtomicI64::new(0),
            cancel_after,
            sends: AtomicUsize::new(0),
        }
    }

    pub fn set_batch_id(&self, batch_id: i64) {
        self.batch_id.store(batch_id, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProviderTransport for CancellingTransport {
    async fn send(&self, _instance_id: &str, _phone: &str, _body: &str) -> SendOutcome {
        let count: usize = self.sends.fetch_add(1, Ordering::SeqCst) + 1;
        if count == self.cancel_after {
            let batch_id: i64 = self.batch_id.load(Ordering::SeqCst);
            self.store
                .lock()
                .await
                .request_cancel(batch_id)
                .expect("cancel request should succeed");
        }
        SendOutcome::ok()
    }
}

/// Quota guard that allows a fixed number of reservations.
pub struct LimitedQuota {
    remaining: AtomicI64,
}

impl LimitedQuota {
    pub fn new(allowed: i64) -> Self {
        Self {
            remaining: AtomicI64::new(allowed),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(i64::MAX)
    }
}

#[async_trait]
impl QuotaGuard for LimitedQuota {
    async fn check_and_reserve(&self, _tenant_id: &str, count: u32) -> QuotaDecision {
        let taken: i64 = i64::from(count);
        if self.remaining.fetch_sub(taken, Ordering::SeqCst) >= taken {
            QuotaDecision::allowed()
        } else {
            QuotaDecision::denied()
        }
    }
}
