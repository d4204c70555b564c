//! Audit trail feature slice
//!
//! Read-only HTTP surface over the event store. Writes happen through
//! [`crate::audit::AuditService`], never through this API.

pub mod queries;
pub mod routes;

pub use routes::audit_routes;
