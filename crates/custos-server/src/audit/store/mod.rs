//! Event store backends
//!
//! The [`EventStore`] trait is the seam between the audit service and
//! durable storage. Production runs on PostgreSQL; tests exercise the same
//! service logic against the in-memory store.

mod memory;
mod pg;

pub use memory::MemoryEventStore;
pub use pg::PgEventStore;

use async_trait::async_trait;
use uuid::Uuid;

use super::error::AuditResult;
use super::models::{AuditEvent, AuditQueryLog, EventFilter, NewAuditEvent, NewQueryLog};

/// Append-only storage for audit events
///
/// Implementations must reject any append that would reuse an existing
/// event id, and must never expose an update or delete path.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a new event. Fails with
    /// [`AuditError::ImmutabilityViolation`](super::error::AuditError::ImmutabilityViolation)
    /// if an event with the same id already exists.
    async fn append(&self, event: NewAuditEvent) -> AuditResult<AuditEvent>;

    /// Fetch a single event by id
    async fn get(&self, id: Uuid) -> AuditResult<Option<AuditEvent>>;

    /// Events cannot be deleted. Always fails.
    async fn delete(&self, id: Uuid) -> AuditResult<()> {
        let _ = id;
        Err(super::error::AuditError::ImmutabilityViolation)
    }

    /// Query events matching the filter, newest first
    async fn query(&self, filter: &EventFilter) -> AuditResult<Vec<AuditEvent>>;

    /// Count events matching the filter, ignoring limit and offset
    async fn count(&self, filter: &EventFilter) -> AuditResult<i64>;

    /// Record that somebody read the audit trail
    async fn record_query_log(&self, log: NewQueryLog) -> AuditResult<AuditQueryLog>;
}
