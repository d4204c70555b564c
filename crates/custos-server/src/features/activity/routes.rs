//! Activity feed API routes
//!
//! - `GET /api/v1/activity/recent` - recent events rendered for the
//!   dashboard; any authenticated caller

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};

use super::queries::{recent, RecentActivityQuery};
use crate::api::response::ApiResponse;
use crate::error::ServerResult;
use crate::features::FeatureState;
use crate::middleware::AuthenticatedUser;

/// Creates the activity router with all routes configured
pub fn activity_routes() -> Router<FeatureState> {
    Router::new().route("/recent", get(recent_activity))
}

/// Recent activity for the dashboard
///
/// # Endpoint
///
/// `GET /api/v1/activity/recent`
async fn recent_activity(
    _user: AuthenticatedUser,
    State(state): State<FeatureState>,
    Query(query): Query<RecentActivityQuery>,
) -> ServerResult<impl IntoResponse> {
    let items = recent::handle(state.audit.store(), query).await?;
    Ok(ApiResponse::success(items))
}
