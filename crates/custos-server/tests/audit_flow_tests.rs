//! End-to-end audit flow over the in-memory store
//!
//! Exercises the full write-read lifecycle a collaborating service sees:
//! record events through the typed helpers, search them, export them with
//! the meta-audit row, and render the dashboard feed.

use std::sync::Arc;

use custos_server::audit::{
    Actor, AuditError, AuditService, AuditTarget, EventFilter, EventStore, EventType,
    MemoryEventStore, NewAuditEvent, Severity,
};
use custos_server::features::activity::queries::recent::{self, RecentActivityQuery};
use custos_server::features::audit::queries::export::{self, ExportAuditQuery};
use custos_server::features::audit::queries::search::{self, SearchAuditQuery};
use serde_json::json;
use uuid::Uuid;

struct Client {
    id: Uuid,
    name: &'static str,
}

impl AuditTarget for Client {
    fn target_type(&self) -> &'static str {
        "Client"
    }

    fn target_id(&self) -> String {
        self.id.to_string()
    }

    fn target_repr(&self) -> String {
        self.name.to_string()
    }
}

fn setup() -> (AuditService, Arc<MemoryEventStore>) {
    let store = Arc::new(MemoryEventStore::new());
    (AuditService::new(store.clone()), store)
}

#[tokio::test]
async fn full_day_in_the_life() {
    let (service, store) = setup();
    let adviser = Actor::new(Uuid::new_v4(), "adviser@example.com");
    let admin = Actor::new(Uuid::new_v4(), "admin@example.com");
    let client = Client {
        id: Uuid::new_v4(),
        name: "John Smith",
    };

    // Morning: adviser logs in, views a client, updates them.
    service
        .log_auth_event(
            EventType::AuthLogin,
            Some(&adviser),
            Some("203.0.113.7".to_string()),
            Some("Mozilla/5.0"),
            true,
            None,
        )
        .await
        .unwrap();

    service
        .log_data_access(EventType::DataView, &adviser, &client, Some(client.id), None, None)
        .await
        .unwrap();

    service
        .log_data_change(
            EventType::DataUpdate,
            &adviser,
            &client,
            Some(json!({"risk_profile": "balanced"})),
            Some(json!({"risk_profile": "growth"})),
            Some(client.id),
            None,
            None,
        )
        .await
        .unwrap();

    // Someone also fails to log in.
    service
        .log_auth_event(EventType::AuthLoginFailed, None, None, None, false, None)
        .await
        .unwrap();

    assert_eq!(store.len(), 4);

    // Compliance searches for the adviser's changes.
    let dyn_store: Arc<dyn EventStore> = store.clone();
    let response = search::handle(
        &dyn_store,
        SearchAuditQuery {
            user_id: Some(adviser.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(response.items.len(), 3);
    assert!(response
        .items
        .iter()
        .all(|row| row.user_email == "adviser@example.com"));

    // Severity filter picks up only the failed login.
    let filter = EventFilter {
        severity: Some(Severity::Warning),
        ..Default::default()
    };
    let warnings = store.query(&filter).await.unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].event_type, "auth.login_failed");

    // Export everything; the export itself is meta-audited.
    let exported = export::handle(&dyn_store, &admin, None, ExportAuditQuery::default())
        .await
        .unwrap();
    assert_eq!(exported.result_count, 4);

    let logs = store.query_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].user_email, "admin@example.com");
    assert_eq!(logs[0].result_count, 4);

    // The export wrote a query-log row, not an audit event.
    assert_eq!(store.len(), 4);

    // Dashboard feed renders all of it.
    let feed = recent::handle(&dyn_store, RecentActivityQuery::default())
        .await
        .unwrap();
    assert_eq!(feed.len(), 4);
    assert!(feed.iter().any(|item| item.title == "Data Updated"));
}

#[tokio::test]
async fn history_cannot_be_rewritten() {
    let (service, store) = setup();
    let adviser = Actor::new(Uuid::new_v4(), "adviser@example.com");

    let recorded = service
        .log_auth_event(EventType::AuthLogin, Some(&adviser), None, None, true, None)
        .await
        .unwrap();

    // Replaying the same event id is rejected.
    let mut replay = NewAuditEvent::builder(EventType::AuthLogout).build();
    replay.id = recorded.id;
    let err = store.append(replay).await.unwrap_err();
    assert!(matches!(err, AuditError::ImmutabilityViolation));

    // So is deletion.
    let err = service.delete_event(recorded.id).await.unwrap_err();
    assert!(matches!(err, AuditError::ImmutabilityViolation));

    // The original event is untouched.
    let stored = store.get(recorded.id).await.unwrap().unwrap();
    assert_eq!(stored.event_type, "auth.login");
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn email_snapshot_survives_the_actor() {
    let (service, store) = setup();
    let departed = Actor::new(Uuid::new_v4(), "leaver@example.com");

    service
        .log_auth_event(EventType::AuthLogin, Some(&departed), None, None, true, None)
        .await
        .unwrap();

    // The account is gone; the trail still names them.
    drop(departed);

    let events = store.query(&EventFilter::default()).await.unwrap();
    assert_eq!(events[0].user_email, "leaver@example.com");
}
