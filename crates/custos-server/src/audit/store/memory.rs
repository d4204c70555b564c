//! In-memory event store
//!
//! Mirrors the PostgreSQL store's semantics (duplicate-id rejection,
//! newest-first ordering with id tie-break, limit clamping) without a
//! database. Used by unit and integration tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::EventStore;
use crate::audit::error::{AuditError, AuditResult};
use crate::audit::models::{
    AuditEvent, AuditQueryLog, EventFilter, NewAuditEvent, NewQueryLog,
};

#[derive(Default)]
struct Inner {
    events: Vec<AuditEvent>,
    ids: HashSet<Uuid>,
    query_logs: Vec<AuditQueryLog>,
}

/// Event store held entirely in process memory
#[derive(Default)]
pub struct MemoryEventStore {
    inner: Mutex<Inner>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events
    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of recorded meta-audit rows, oldest first
    pub fn query_logs(&self) -> Vec<AuditQueryLog> {
        self.lock().query_logs.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock means a test already panicked; propagating the
        // inner state is still sound for reads and appends.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn matches(event: &AuditEvent, filter: &EventFilter) -> bool {
    if let Some(event_type) = filter.event_type {
        if event.event_type != event_type.as_str() {
            return false;
        }
    }
    if let Some(severity) = filter.severity {
        if event.severity != severity.as_str() {
            return false;
        }
    }
    if let Some(user_id) = filter.user_id {
        if event.user_id != Some(user_id) {
            return false;
        }
    }
    if let Some(ref target_type) = filter.target_type {
        if &event.target_type != target_type {
            return false;
        }
    }
    if let Some(ref target_id) = filter.target_id {
        if &event.target_id != target_id {
            return false;
        }
    }
    if let Some(client_id) = filter.client_id {
        if event.client_id != Some(client_id) {
            return false;
        }
    }
    if let Some(household_id) = filter.household_id {
        if event.household_id != Some(household_id) {
            return false;
        }
    }
    if let Some(start_time) = filter.start_time {
        if event.timestamp < start_time {
            return false;
        }
    }
    if let Some(end_time) = filter.end_time {
        if event.timestamp > end_time {
            return false;
        }
    }
    true
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn append(&self, event: NewAuditEvent) -> AuditResult<AuditEvent> {
        let row = event.into_event();
        let mut inner = self.lock();

        if !inner.ids.insert(row.id) {
            return Err(AuditError::ImmutabilityViolation);
        }

        inner.events.push(row.clone());
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> AuditResult<Option<AuditEvent>> {
        Ok(self.lock().events.iter().find(|e| e.id == id).cloned())
    }

    async fn query(&self, filter: &EventFilter) -> AuditResult<Vec<AuditEvent>> {
        let inner = self.lock();

        let mut results: Vec<AuditEvent> = inner
            .events
            .iter()
            .filter(|e| matches(e, filter))
            .cloned()
            .collect();

        results.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });

        let offset = filter.offset.max(0) as usize;
        let limit = filter.effective_limit() as usize;

        Ok(results.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: &EventFilter) -> AuditResult<i64> {
        let inner = self.lock();
        Ok(inner.events.iter().filter(|e| matches(e, filter)).count() as i64)
    }

    async fn record_query_log(&self, log: NewQueryLog) -> AuditResult<AuditQueryLog> {
        let row = log.into_row();
        self.lock().query_logs.push(row.clone());
        Ok(row)
    }
}
