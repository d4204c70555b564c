//! Filtered audit search

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuditEventRow;
use crate::api::response::PaginationMeta;
use crate::audit::{AuditResult, EventFilter, EventStore, EventType, Severity};
use crate::features::shared::PaginationParams;

/// Query-string parameters for `GET /api/v1/audit`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchAuditQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub household_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchAuditResponse {
    pub items: Vec<AuditEventRow>,
    pub pagination: PaginationMeta,
}

impl SearchAuditQuery {
    /// Pagination view over the page/per_page parameters
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Parse the string filters into the typed event filter
    ///
    /// Unknown event types or severities are rejected rather than silently
    /// matching nothing.
    pub fn to_filter(&self) -> AuditResult<EventFilter> {
        let event_type = self
            .event_type
            .as_deref()
            .map(str::parse::<EventType>)
            .transpose()?;
        let severity = self
            .severity
            .as_deref()
            .map(str::parse::<Severity>)
            .transpose()?;

        Ok(EventFilter {
            event_type,
            severity,
            user_id: self.user_id,
            target_type: self.target_type.clone(),
            target_id: self.target_id.clone(),
            client_id: self.client_id,
            household_id: self.household_id,
            start_time: self.start_time,
            end_time: self.end_time,
            limit: self.pagination().per_page(),
            offset: self.pagination().offset(),
        })
    }
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &Arc<dyn EventStore>,
    query: SearchAuditQuery,
) -> AuditResult<SearchAuditResponse> {
    let filter = query.to_filter()?;

    let events = store.query(&filter).await?;
    let total = store.count(&filter).await?;

    let items = events.iter().map(AuditEventRow::from).collect();
    let pagination = query.pagination();

    Ok(SearchAuditResponse {
        items,
        pagination: PaginationMeta::new(pagination.page(), pagination.per_page(), total),
    })
}
