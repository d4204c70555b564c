//! Append-only audit trail
//!
//! This module owns the compliance record for the whole platform: who did
//! what, to which entity, from where, and when. Events are written once
//! and never changed; mutation attempts fail with
//! [`AuditError::ImmutabilityViolation`].
//!
//! # Architecture
//!
//! - [`models`] — event taxonomy, builder, filters
//! - [`store`] — the [`EventStore`] seam with PostgreSQL and in-memory
//!   backends
//! - [`service`] — typed write helpers for collaborating services
//! - [`activity`] — dashboard feed rendering
//! - [`context`] — per-request network context capture
//!
//! # Example: Recording an Event
//!
//! ```no_run
//! use std::sync::Arc;
//! use custos_server::audit::{
//!     Actor, AuditService, EventType, MemoryEventStore,
//! };
//! use uuid::Uuid;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = AuditService::new(Arc::new(MemoryEventStore::new()));
//! let actor = Actor::new(Uuid::new_v4(), "adviser@example.com");
//!
//! let event = service
//!     .log_auth_event(EventType::AuthLogin, Some(&actor), None, None, true, None)
//!     .await?;
//! println!("Recorded audit event: {}", event.id);
//! # Ok(())
//! # }
//! ```

pub mod activity;
pub mod context;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use activity::{classify, describe, title_for, ActivityCategory, ActivityItem};
pub use context::RequestMeta;
pub use error::{AuditError, AuditResult};
pub use models::{
    Actor, AuditEvent, AuditEventBuilder, AuditQueryLog, AuditTarget, EventFilter, EventType,
    NewAuditEvent, NewQueryLog, QueryKind, Severity, TargetRef, DEFAULT_QUERY_LIMIT,
    EXPORT_MAX_ROWS, MAX_QUERY_LIMIT,
};
pub use service::AuditService;
pub use store::{EventStore, MemoryEventStore, PgEventStore};
