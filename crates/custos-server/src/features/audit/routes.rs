//! Audit API routes
//!
//! Admin-only read access to the audit trail:
//!
//! - `GET /api/v1/audit` - filtered search with pagination
//! - `GET /api/v1/audit/export` - bounded bulk export (meta-audited)

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::json;

use super::queries::{export, search, ExportAuditQuery, SearchAuditQuery};
use crate::api::response::ApiResponse;
use crate::audit::RequestMeta;
use crate::error::ServerResult;
use crate::features::FeatureState;
use crate::middleware::AdminUser;

/// Creates the audit router with all routes configured
pub fn audit_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(search_audit))
        .route("/export", get(export_audit))
}

/// Search the audit trail
///
/// # Endpoint
///
/// `GET /api/v1/audit`
async fn search_audit(
    _admin: AdminUser,
    State(state): State<FeatureState>,
    Query(query): Query<SearchAuditQuery>,
) -> ServerResult<impl IntoResponse> {
    let response = search::handle(state.audit.store(), query).await?;
    let meta = serde_json::to_value(&response.pagination)
        .unwrap_or_else(|_| json!({}));
    Ok(ApiResponse::success_with_meta(response.items, meta))
}

/// Export audit events in bulk
///
/// Writes one query-log row per call, empty results included.
///
/// # Endpoint
///
/// `GET /api/v1/audit/export`
async fn export_audit(
    admin: AdminUser,
    meta: RequestMeta,
    State(state): State<FeatureState>,
    Query(query): Query<ExportAuditQuery>,
) -> ServerResult<impl IntoResponse> {
    let response = export::handle(
        state.audit.store(),
        &admin.0.actor,
        meta.ip_address.clone(),
        query,
    )
    .await?;

    let meta = json!({
        "result_count": response.result_count,
        "truncated": response.truncated,
    });
    Ok(ApiResponse::success_with_meta(response.items, meta))
}
