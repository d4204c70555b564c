//! Feature modules implementing the Custos API
//!
//! Each feature is a vertical slice with its own queries and routes:
//!
//! - **audit**: admin-only search and export over the audit trail
//! - **activity**: dashboard feed of recent events
//!
//! All slices are read-only over the event store. Writes enter through
//! [`crate::audit::AuditService`] from collaborating services, not over
//! HTTP.

pub mod activity;
pub mod audit;
pub mod shared;

use axum::Router;

use crate::audit::AuditService;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Audit service wrapping the event store
    pub audit: AuditService,
}

/// Creates the main API router with all feature routes mounted
///
/// - `/audit` - audit search and export
/// - `/activity` - recent activity feed
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/audit", audit::audit_routes())
        .nest("/activity", activity::activity_routes())
        .with_state(state)
}
