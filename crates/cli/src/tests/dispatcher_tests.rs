// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Dispatch runtime tests.

use crate::dispatcher::Dispatcher;
use crate::events::DispatchEvent;
use crate::tests::{CancellingTransport, FakeTransport, LimitedQuota, seed_batch, shared_store};
use std::sync::Arc;
use tokio::sync::Mutex;
use wa_blast_domain::DispatchState;
use wa_blast_persistence::{PersistenceError, SqlitePersistence};

fn dispatcher(
    store: &Arc<Mutex<SqlitePersistence>>,
    transport: Arc<dyn wa_blast::ProviderTransport>,
    quota: Arc<dyn wa_blast::QuotaGuard>,
) -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(Arc::clone(store), transport, quota, 3))
}

#[tokio::test]
async fn test_dispatch_completes_batch_in_canonical_order() {
    let store = shared_store();
    let batch_id = seed_batch(
        &store,
        "Hello",
        &[("0811", "Alice"), ("0822", "Bob"), ("0833", "Carol")],
    )
    .await;

    let transport = Arc::new(FakeTransport::new());
    let runner = dispatcher(
        &store,
        transport.clone(),
        Arc::new(LimitedQuota::unlimited()),
    );

    runner.dispatch_batch(batch_id).await.unwrap();

    assert_eq!(transport.sent_phones(), vec!["0811", "0822", "0833"]);

    let batch = store.lock().await.get_batch(batch_id).unwrap();
    assert_eq!(batch.status.as_str(), "completed");
    assert_eq!(batch.sent_count, 3);
    assert_eq!(batch.failed_count, 0);
    assert!(batch.started_at.is_some());
    assert!(batch.completed_at.is_some());
}

#[tokio::test]
async fn test_dispatch_renders_template_per_recipient() {
    let store = shared_store();
    let batch_id = seed_batch(
        &store,
        "Hi {{name}}, confirm at {{phone}}",
        &[("0811", "Alice"), ("0822", "Bob")],
    )
    .await;

    let transport = Arc::new(FakeTransport::new());
    let runner = dispatcher(
        &store,
        transport.clone(),
        Arc::new(LimitedQuota::unlimited()),
    );

    runner.dispatch_batch(batch_id).await.unwrap();

    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent[0].1, "Hi Alice, confirm at 0811");
    assert_eq!(sent[1].1, "Hi Bob, confirm at 0822");
}

#[tokio::test]
async fn test_failed_send_is_recorded_and_loop_continues() {
    let store = shared_store();
    let batch_id = seed_batch(
        &store,
        "Hello",
        &[("0811", "Alice"), ("0822", "Bob"), ("0833", "Carol")],
    )
    .await;

    let transport = Arc::new(FakeTransport::failing(&["0822"]));
    let runner = dispatcher(
        &store,
        transport.clone(),
        Arc::new(LimitedQuota::unlimited()),
    );

    runner.dispatch_batch(batch_id).await.unwrap();

    let batch = store.lock().await.get_batch(batch_id).unwrap();
    assert_eq!(batch.status.as_str(), "completed", "partial failure never fails the batch");
    assert_eq!(batch.sent_count, 2);
    assert_eq!(batch.failed_count, 1);

    let recipients = store.lock().await.get_recipients(batch_id).unwrap();
    let failed = recipients
        .iter()
        .find(|recipient| recipient.phone == "0822")
        .unwrap();
    assert_eq!(failed.dispatch_state, DispatchState::Failed);
    assert_eq!(
        failed.dispatch_error.as_deref(),
        Some("instance disconnected")
    );
}

#[tokio::test]
async fn test_quota_denial_hard_stops_the_batch() {
    let store = shared_store();
    let batch_id = seed_batch(
        &store,
        "Hello",
        &[
            ("0811", "A"),
            ("0822", "B"),
            ("0833", "C"),
            ("0844", "D"),
            ("0855", "E"),
        ],
    )
    .await;

    let transport = Arc::new(FakeTransport::new());
    let runner = dispatcher(&store, transport.clone(), Arc::new(LimitedQuota::new(2)));

    runner.dispatch_batch(batch_id).await.unwrap();

    assert_eq!(transport.sent_phones().len(), 2, "no send after the denial");

    let batch = store.lock().await.get_batch(batch_id).unwrap();
    assert_eq!(batch.status.as_str(), "failed");
    assert_eq!(batch.sent_count, 2);
    assert_eq!(
        batch.failure_reason.as_deref(),
        Some("Message quota exhausted")
    );

    let recipients = store.lock().await.get_recipients(batch_id).unwrap();
    let not_sent = recipients
        .iter()
        .filter(|recipient| recipient.dispatch_state == DispatchState::NotSent)
        .count();
    assert_eq!(not_sent, 3, "undispatched recipients stay not_sent");
}

#[tokio::test]
async fn test_cancellation_stops_after_in_flight_send() {
    let store = shared_store();
    let batch_id = seed_batch(
        &store,
        "Hello",
        &[
            ("0811", "A"),
            ("0822", "B"),
            ("0833", "C"),
            ("0844", "D"),
            ("0855", "E"),
        ],
    )
    .await;

    let transport = Arc::new(CancellingTransport::new(Arc::clone(&store), 3));
    transport.set_batch_id(batch_id);
    let runner = dispatcher(
        &store,
        transport.clone(),
        Arc::new(LimitedQuota::unlimited()),
    );

    runner.dispatch_batch(batch_id).await.unwrap();

    let batch = store.lock().await.get_batch(batch_id).unwrap();
    assert_eq!(batch.status.as_str(), "cancelled");
    assert_eq!(batch.sent_count, 3, "the in-flight send finished and counted");
    assert!(batch.completed_at.is_some());

    let recipients = store.lock().await.get_recipients(batch_id).unwrap();
    let not_sent = recipients
        .iter()
        .filter(|recipient| recipient.dispatch_state == DispatchState::NotSent)
        .count();
    assert_eq!(not_sent, 2);
}

#[tokio::test]
async fn test_lost_claim_skips_quietly() {
    let store = shared_store();
    let batch_id = seed_batch(&store, "Hello", &[("0811", "Alice")]).await;

    // Another loop already claimed the batch.
    assert!(store.lock().await.claim_batch(batch_id).unwrap());

    let transport = Arc::new(FakeTransport::new());
    let runner = dispatcher(
        &store,
        transport.clone(),
        Arc::new(LimitedQuota::unlimited()),
    );

    runner.dispatch_batch(batch_id).await.unwrap();

    assert!(transport.sent_phones().is_empty(), "losing loop sends nothing");
    let batch = store.lock().await.get_batch(batch_id).unwrap();
    assert_eq!(batch.status.as_str(), "processing");
}

#[tokio::test]
async fn test_dispatching_unknown_batch_is_an_error() {
    let store = shared_store();
    let runner = dispatcher(
        &store,
        Arc::new(FakeTransport::new()),
        Arc::new(LimitedQuota::unlimited()),
    );

    let err = runner.dispatch_batch(999).await.unwrap_err();

    assert!(matches!(err, PersistenceError::BatchNotFound(999)));
}

#[tokio::test]
async fn test_run_pending_dispatches_every_pending_batch() {
    let store = shared_store();
    let first = seed_batch(&store, "Hello", &[("0811", "Alice")]).await;
    let second = seed_batch(&store, "Hello", &[("0822", "Bob")]).await;

    let transport = Arc::new(FakeTransport::new());
    let runner = dispatcher(
        &store,
        transport.clone(),
        Arc::new(LimitedQuota::unlimited()),
    );

    runner.run_pending().await.unwrap();

    let mut persistence = store.lock().await;
    assert_eq!(
        persistence.get_batch(first).unwrap().status.as_str(),
        "completed"
    );
    assert_eq!(
        persistence.get_batch(second).unwrap().status.as_str(),
        "completed"
    );
    assert!(persistence.list_pending_batch_ids().unwrap().is_empty());
}

#[tokio::test]
async fn test_dispatch_emits_progress_events() {
    let store = shared_store();
    let batch_id = seed_batch(&store, "Hello", &[("0811", "Alice"), ("0822", "Bob")]).await;

    let runner = dispatcher(
        &store,
        Arc::new(FakeTransport::new()),
        Arc::new(LimitedQuota::unlimited()),
    );
    let mut events = runner.subscribe();

    runner.dispatch_batch(batch_id).await.unwrap();

    assert!(matches!(
        events.try_recv(),
        Ok(DispatchEvent::BatchStarted {
            total_recipients: 2,
            ..
        })
    ));
    assert!(matches!(
        events.try_recv(),
        Ok(DispatchEvent::MessageSent { .. })
    ));
    assert!(matches!(
        events.try_recv(),
        Ok(DispatchEvent::MessageSent { .. })
    ));
    assert!(matches!(
        events.try_recv(),
        Ok(DispatchEvent::BatchCompleted {
            sent_count: 2,
            failed_count: 0,
            ..
        })
    ));
}
