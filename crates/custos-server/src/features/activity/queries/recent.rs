//! Recent activity feed

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audit::{ActivityItem, AuditResult, EventFilter, EventStore};

/// Default number of feed items
pub const DEFAULT_FEED_LIMIT: i64 = 20;

/// Maximum number of feed items per request
pub const MAX_FEED_LIMIT: i64 = 100;

/// Query-string parameters for `GET /api/v1/activity/recent`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecentActivityQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl RecentActivityQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, MAX_FEED_LIMIT)
    }
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &Arc<dyn EventStore>,
    query: RecentActivityQuery,
) -> AuditResult<Vec<ActivityItem>> {
    let filter = EventFilter {
        limit: query.limit(),
        ..Default::default()
    };

    let events = store.query(&filter).await?;
    Ok(events.iter().map(ActivityItem::from_event).collect())
}
