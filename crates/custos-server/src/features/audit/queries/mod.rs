//! Read operations over the audit trail

pub mod export;
pub mod search;

pub use export::{ExportAuditQuery, ExportAuditResponse};
pub use search::{SearchAuditQuery, SearchAuditResponse};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::audit::AuditEvent;

/// Stable wire shape for an audit event row
///
/// Internal columns (request_id, old/new value snapshots, household link)
/// stay out of the API payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEventRow {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub severity: String,
    pub user_email: String,
    pub target_type: String,
    pub target_id: String,
    pub target_repr: String,
    pub description: String,
    pub ip_address: Option<String>,
    pub data: JsonValue,
}

impl From<&AuditEvent> for AuditEventRow {
    fn from(event: &AuditEvent) -> Self {
        Self {
            id: event.id,
            timestamp: event.timestamp,
            event_type: event.event_type.clone(),
            severity: event.severity.clone(),
            user_email: event.user_email.clone(),
            target_type: event.target_type.clone(),
            target_id: event.target_id.clone(),
            target_repr: event.target_repr.clone(),
            description: event.description.clone(),
            ip_address: event.ip_address.clone(),
            data: event.data.clone(),
        }
    }
}
