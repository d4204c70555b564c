//! Typed write surface for the audit trail
//!
//! Collaborating services call these helpers synchronously after finishing
//! a business operation. Each call appends exactly one event and mirrors
//! one structured log line. There are no retries: a failed append surfaces
//! to the caller rather than dropping a compliance record.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{info, warn};
use uuid::Uuid;

use super::context::RequestMeta;
use super::error::{AuditError, AuditResult};
use super::models::{
    Actor, AuditEvent, AuditTarget, EventType, NewAuditEvent, Severity,
};
use super::store::EventStore;

/// Audit write service
///
/// Holds only the store handle; safe to clone and share across tasks.
#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn EventStore>,
}

impl AuditService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    /// Generic passthrough for pre-built events
    pub async fn log(&self, event: NewAuditEvent) -> AuditResult<AuditEvent> {
        let recorded = self.store.append(event).await?;
        mirror(&recorded);
        Ok(recorded)
    }

    /// Record an authentication outcome
    ///
    /// Failed attempts log at Warning. The actor is absent for failures
    /// against unknown accounts; the event is still recorded.
    pub async fn log_auth_event(
        &self,
        event_type: EventType,
        actor: Option<&Actor>,
        ip: Option<String>,
        user_agent: Option<&str>,
        success: bool,
        details: Option<JsonValue>,
    ) -> AuditResult<AuditEvent> {
        require_category(event_type, "auth.")?;

        let severity = if success {
            Severity::Info
        } else {
            Severity::Warning
        };

        let mut builder = NewAuditEvent::builder(event_type)
            .severity(severity)
            .ip_address(ip)
            .description(match actor {
                Some(a) => format!("{} for {}", event_type.label(), a.email),
                None => event_type.label().to_string(),
            });

        if let Some(actor) = actor {
            builder = builder.actor(actor);
        }
        if let Some(ua) = user_agent {
            builder = builder.user_agent(ua);
        }
        if let Some(details) = details {
            builder = builder.data(details);
        }

        self.log(builder.build()).await
    }

    /// Record a read of business data (view, download, export)
    pub async fn log_data_access(
        &self,
        event_type: EventType,
        actor: &Actor,
        target: &dyn AuditTarget,
        client_id: Option<Uuid>,
        ip: Option<String>,
        details: Option<JsonValue>,
    ) -> AuditResult<AuditEvent> {
        require_category(event_type, "data.")?;

        let mut builder = NewAuditEvent::builder(event_type)
            .actor(actor)
            .target(target)
            .client_id(client_id)
            .ip_address(ip)
            .description(format!(
                "{}: {}",
                event_type.label(),
                target.target_repr()
            ));

        if let Some(details) = details {
            builder = builder.data(details);
        }

        self.log(builder.build()).await
    }

    /// Record a mutation of business data, with before/after snapshots
    #[allow(clippy::too_many_arguments)]
    pub async fn log_data_change(
        &self,
        event_type: EventType,
        actor: &Actor,
        target: &dyn AuditTarget,
        old_values: Option<JsonValue>,
        new_values: Option<JsonValue>,
        client_id: Option<Uuid>,
        ip: Option<String>,
        description: Option<String>,
    ) -> AuditResult<AuditEvent> {
        require_category(event_type, "data.")?;

        let mut builder = NewAuditEvent::builder(event_type)
            .actor(actor)
            .target(target)
            .client_id(client_id)
            .ip_address(ip)
            .description(description.unwrap_or_else(|| {
                format!("{}: {}", event_type.label(), target.target_repr())
            }));

        if let Some(old_values) = old_values {
            builder = builder.old_values(old_values);
        }
        if let Some(new_values) = new_values {
            builder = builder.new_values(new_values);
        }

        self.log(builder.build()).await
    }

    /// Record a document lifecycle event
    pub async fn log_document_event(
        &self,
        event_type: EventType,
        actor: &Actor,
        document: &dyn AuditTarget,
        client_id: Option<Uuid>,
        ip: Option<String>,
        details: Option<JsonValue>,
    ) -> AuditResult<AuditEvent> {
        require_category(event_type, "doc.")?;

        let mut builder = NewAuditEvent::builder(event_type)
            .actor(actor)
            .target(document)
            .client_id(client_id)
            .ip_address(ip)
            .description(format!(
                "{}: {}",
                event_type.label(),
                document.target_repr()
            ));

        if let Some(details) = details {
            builder = builder.data(details);
        }

        self.log(builder.build()).await
    }

    /// Record a system event with no acting user
    ///
    /// Severity defaults to Info; callers recording failures pass an
    /// explicit severity.
    pub async fn log_system_event(
        &self,
        event_type: EventType,
        description: Option<String>,
        severity: Option<Severity>,
        details: Option<JsonValue>,
    ) -> AuditResult<AuditEvent> {
        require_category(event_type, "sys.")?;

        let severity = severity.unwrap_or_default();

        let mut builder = NewAuditEvent::builder(event_type)
            .severity(severity)
            .description(description.unwrap_or_else(|| event_type.label().to_string()));

        if let Some(details) = details {
            builder = builder.data(details);
        }

        self.log(builder.build()).await
    }

    /// Record an event with network context captured from the request
    pub async fn log_request(
        &self,
        event_type: EventType,
        actor: Option<&Actor>,
        target: Option<&dyn AuditTarget>,
        meta: &RequestMeta,
        details: Option<JsonValue>,
    ) -> AuditResult<AuditEvent> {
        let mut builder = NewAuditEvent::builder(event_type)
            .ip_address(meta.ip_address.clone())
            .user_agent(meta.user_agent.clone())
            .request_id(meta.request_id.clone());

        if let Some(actor) = actor {
            builder = builder.actor(actor);
        }
        if let Some(target) = target {
            builder = builder.target(target);
            builder = builder.description(format!(
                "{}: {}",
                event_type.label(),
                target.target_repr()
            ));
        } else {
            builder = builder.description(event_type.label().to_string());
        }
        if let Some(details) = details {
            builder = builder.data(details);
        }

        self.log(builder.build()).await
    }

    /// Deletion is not part of the model. Always fails.
    pub async fn delete_event(&self, id: Uuid) -> AuditResult<()> {
        self.store.delete(id).await
    }
}

fn require_category(event_type: EventType, prefix: &str) -> AuditResult<()> {
    if event_type.as_str().starts_with(prefix) {
        Ok(())
    } else {
        Err(AuditError::validation(format!(
            "Event type '{}' is not a {}* event",
            event_type,
            prefix
        )))
    }
}

/// Mirror a recorded event to the process log
fn mirror(event: &AuditEvent) {
    match event.severity.as_str() {
        "warning" | "error" | "critical" => warn!(
            event_id = %event.id,
            event_type = %event.event_type,
            severity = %event.severity,
            user_email = %event.user_email,
            "Audit event recorded"
        ),
        _ => info!(
            event_id = %event.id,
            event_type = %event.event_type,
            user_email = %event.user_email,
            "Audit event recorded"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::models::TargetRef;
    use crate::audit::store::MemoryEventStore;
    use serde_json::json;

    struct Doc {
        id: Uuid,
        name: &'static str,
    }

    impl AuditTarget for Doc {
        fn target_type(&self) -> &'static str {
            "Document"
        }

        fn target_id(&self) -> String {
            self.id.to_string()
        }

        fn target_repr(&self) -> String {
            self.name.to_string()
        }
    }

    fn service() -> (AuditService, Arc<MemoryEventStore>) {
        let store = Arc::new(MemoryEventStore::new());
        (AuditService::new(store.clone()), store)
    }

    fn adviser() -> Actor {
        Actor::new(Uuid::new_v4(), "adviser@example.com")
    }

    #[tokio::test]
    async fn successful_login_snapshots_email() {
        let (service, _) = service();
        let actor = adviser();

        let event = service
            .log_auth_event(
                EventType::AuthLogin,
                Some(&actor),
                Some("203.0.113.7".to_string()),
                Some("Mozilla/5.0"),
                true,
                None,
            )
            .await
            .unwrap();

        assert_eq!(event.event_type, "auth.login");
        assert_eq!(event.severity, "info");
        assert_eq!(event.user_email, "adviser@example.com");
        assert_eq!(event.ip_address.as_deref(), Some("203.0.113.7"));
    }

    #[tokio::test]
    async fn failed_login_without_actor_is_warning() {
        let (service, store) = service();

        let event = service
            .log_auth_event(
                EventType::AuthLoginFailed,
                None,
                Some("203.0.113.7".to_string()),
                None,
                false,
                Some(json!({"attempted_email": "ghost@example.com"})),
            )
            .await
            .unwrap();

        assert_eq!(event.severity, "warning");
        assert_eq!(event.user_id, None);
        assert!(event.user_email.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn auth_helper_rejects_other_categories() {
        let (service, store) = service();

        let err = service
            .log_auth_event(EventType::DataView, None, None, None, true, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AuditError::Validation(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn data_change_captures_target_and_diff() {
        let (service, _) = service();
        let actor = adviser();
        let doc = Doc {
            id: Uuid::new_v4(),
            name: "KYC pack",
        };

        let event = service
            .log_data_change(
                EventType::DataUpdate,
                &actor,
                &doc,
                Some(json!({"status": "draft"})),
                Some(json!({"status": "final"})),
                None,
                None,
                None,
            )
            .await
            .unwrap();

        assert_eq!(event.target_type, "Document");
        assert_eq!(event.target_id, doc.id.to_string());
        assert_eq!(event.target_repr, "KYC pack");
        assert_eq!(event.old_values, json!({"status": "draft"}));
        assert_eq!(event.new_values, json!({"status": "final"}));
        assert_eq!(event.description, "Data Updated: KYC pack");
    }

    #[tokio::test]
    async fn document_event_requires_doc_category() {
        let (service, _) = service();
        let actor = adviser();
        let doc = Doc {
            id: Uuid::new_v4(),
            name: "Q3 report",
        };

        let ok = service
            .log_document_event(EventType::DocDownload, &actor, &doc, None, None, None)
            .await;
        assert!(ok.is_ok());

        let err = service
            .log_document_event(EventType::AuthLogin, &actor, &doc, None, None, None)
            .await;
        assert!(matches!(err, Err(AuditError::Validation(_))));
    }

    #[tokio::test]
    async fn system_event_severity_defaults_to_info() {
        let (service, _) = service();

        let event = service
            .log_system_event(EventType::SysIntegrationError, None, None, None)
            .await
            .unwrap();
        assert_eq!(event.severity, "info");
        assert_eq!(event.user_id, None);

        let event = service
            .log_system_event(
                EventType::SysIntegrationError,
                Some("Custodian feed timed out".to_string()),
                Some(Severity::Error),
                Some(json!({"integration": "custodian"})),
            )
            .await
            .unwrap();
        assert_eq!(event.severity, "error");
    }

    #[tokio::test]
    async fn log_request_carries_network_context() {
        let (service, _) = service();
        let actor = adviser();
        let meta = RequestMeta {
            ip_address: Some("198.51.100.9".to_string()),
            user_agent: "curl/8.0".to_string(),
            request_id: "req-7".to_string(),
        };

        let event = service
            .log_request(EventType::CommBriefingSent, Some(&actor), None, &meta, None)
            .await
            .unwrap();

        assert_eq!(event.ip_address.as_deref(), Some("198.51.100.9"));
        assert_eq!(event.user_agent, "curl/8.0");
        assert_eq!(event.request_id, "req-7");
    }

    #[tokio::test]
    async fn delete_always_fails_and_leaves_storage_intact() {
        let (service, store) = service();
        let actor = adviser();

        let event = service
            .log_auth_event(EventType::AuthLogout, Some(&actor), None, None, true, None)
            .await
            .unwrap();

        let err = service.delete_event(event.id).await.unwrap_err();
        assert!(matches!(err, AuditError::ImmutabilityViolation));
        assert_eq!(store.len(), 1);
        assert!(store.get(event.id).await.unwrap().is_some());
    }

    #[test]
    fn target_ref_roundtrip() {
        let doc = Doc {
            id: Uuid::new_v4(),
            name: "Fact find",
        };
        let target = TargetRef::of(&doc);
        assert_eq!(target.target_type, "Document");
        assert_eq!(target.target_repr, "Fact find");
    }
}
