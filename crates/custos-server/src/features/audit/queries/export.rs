//! Bounded bulk export
//!
//! Every export call writes one `audit_query_log` row recording who pulled
//! what, even when the result set is empty. The row is written after the
//! read so the recorded count is exact.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::AuditEventRow;
use crate::audit::{
    Actor, AuditResult, EventFilter, EventStore, EventType, NewQueryLog, QueryKind,
    EXPORT_MAX_ROWS,
};

/// Query-string parameters for `GET /api/v1/audit/export`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExportAuditQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportAuditResponse {
    pub items: Vec<AuditEventRow>,
    pub result_count: i64,
    pub truncated: bool,
}

impl ExportAuditQuery {
    pub fn to_filter(&self) -> AuditResult<EventFilter> {
        let event_type = self
            .event_type
            .as_deref()
            .map(str::parse::<EventType>)
            .transpose()?;

        Ok(EventFilter {
            event_type,
            start_time: self.start_date,
            end_time: self.end_date,
            limit: EXPORT_MAX_ROWS,
            ..Default::default()
        })
    }

    /// Filter parameters as recorded in the query log
    fn params_json(&self) -> serde_json::Value {
        json!({
            "start_date": self.start_date,
            "end_date": self.end_date,
            "event_type": self.event_type,
        })
    }
}

#[tracing::instrument(skip(store, exporter))]
pub async fn handle(
    store: &Arc<dyn EventStore>,
    exporter: &Actor,
    exporter_ip: Option<String>,
    query: ExportAuditQuery,
) -> AuditResult<ExportAuditResponse> {
    let filter = query.to_filter()?;

    let events = store.query(&filter).await?;
    let result_count = events.len() as i64;

    store
        .record_query_log(NewQueryLog {
            user_id: Some(exporter.id),
            user_email: exporter.email.clone(),
            query_type: QueryKind::Export,
            query_params: query.params_json(),
            result_count,
            ip_address: exporter_ip,
        })
        .await?;

    tracing::info!(
        user_email = %exporter.email,
        result_count,
        "Audit export performed"
    );

    Ok(ExportAuditResponse {
        items: events.iter().map(AuditEventRow::from).collect(),
        result_count,
        truncated: result_count == EXPORT_MAX_ROWS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditError, MemoryEventStore, NewAuditEvent};
    use uuid::Uuid;

    fn exporter() -> Actor {
        Actor::new(Uuid::new_v4(), "admin@example.com")
    }

    #[tokio::test]
    async fn empty_export_still_writes_query_log() {
        let store = Arc::new(MemoryEventStore::new());
        let dyn_store: Arc<dyn EventStore> = store.clone();

        let response = handle(
            &dyn_store,
            &exporter(),
            Some("203.0.113.7".to_string()),
            ExportAuditQuery::default(),
        )
        .await
        .unwrap();

        assert!(response.items.is_empty());
        assert_eq!(response.result_count, 0);

        let logs = store.query_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].result_count, 0);
        assert_eq!(logs[0].query_type, "export");
        assert_eq!(logs[0].user_email, "admin@example.com");
        assert_eq!(logs[0].ip_address.as_deref(), Some("203.0.113.7"));
    }

    #[tokio::test]
    async fn query_log_records_exact_count_and_params() {
        let store = Arc::new(MemoryEventStore::new());
        for _ in 0..3 {
            store
                .append(NewAuditEvent::builder(EventType::AuthLogin).build())
                .await
                .unwrap();
        }
        store
            .append(NewAuditEvent::builder(EventType::DocUpload).build())
            .await
            .unwrap();
        let dyn_store: Arc<dyn EventStore> = store.clone();

        let query = ExportAuditQuery {
            event_type: Some("auth.login".to_string()),
            ..Default::default()
        };
        let response = handle(&dyn_store, &exporter(), None, query).await.unwrap();

        assert_eq!(response.result_count, 3);
        assert!(!response.truncated);

        let logs = store.query_logs();
        assert_eq!(logs[0].result_count, 3);
        assert_eq!(logs[0].query_params["event_type"], "auth.login");
    }

    #[tokio::test]
    async fn export_is_capped() {
        let store = Arc::new(MemoryEventStore::new());
        for _ in 0..(EXPORT_MAX_ROWS as usize + 50) {
            store
                .append(NewAuditEvent::builder(EventType::DataView).build())
                .await
                .unwrap();
        }
        let dyn_store: Arc<dyn EventStore> = store.clone();

        let response = handle(&dyn_store, &exporter(), None, ExportAuditQuery::default())
            .await
            .unwrap();

        assert_eq!(response.result_count, EXPORT_MAX_ROWS);
        assert!(response.truncated);
        assert_eq!(store.query_logs()[0].result_count, EXPORT_MAX_ROWS);
    }

    #[tokio::test]
    async fn bad_event_type_fails_before_any_write() {
        let store = Arc::new(MemoryEventStore::new());
        let dyn_store: Arc<dyn EventStore> = store.clone();

        let query = ExportAuditQuery {
            event_type: Some("nonsense".to_string()),
            ..Default::default()
        };
        let err = handle(&dyn_store, &exporter(), None, query).await.unwrap_err();

        assert!(matches!(err, AuditError::Validation(_)));
        assert!(store.query_logs().is_empty());
    }
}
