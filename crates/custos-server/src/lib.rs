//! Custos Server Library
//!
//! Audit/compliance service for a wealth-management back office.
//!
//! # Overview
//!
//! The server owns the append-only audit trail and exposes it over a REST
//! API:
//!
//! - **Event Store**: immutable, indexed audit event storage (PostgreSQL)
//! - **Audit Service**: typed write helpers for the CRUD/auth collaborators
//! - **Query/Export Gateway**: admin-only search and bulk export, with the
//!   export itself meta-audited
//! - **Activity Feed**: dashboard-friendly rendering of recent events
//!
//! # Architecture
//!
//! Collaborating services (the CRUD and authentication layers) call the
//! [`audit::AuditService`] synchronously after completing a business
//! operation. Each call appends exactly one [`audit::AuditEvent`] and
//! mirrors one structured log line. Events are never updated or deleted;
//! any attempt fails with [`audit::AuditError::ImmutabilityViolation`].
//!
//! Read access goes through `/api/v1/audit` (filtered search),
//! `/api/v1/audit/export` (bounded bulk export, writes one
//! `audit_query_log` row per call), and `/api/v1/activity/recent`
//! (dashboard feed).
//!
//! ## Framework Stack
//!
//! - **Axum**: HTTP routing and extractors
//! - **SQLx**: PostgreSQL access and migrations
//! - **Tower**: middleware (tracing, CORS)

pub mod api;
pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;

pub use error::{AppError, ServerResult};
