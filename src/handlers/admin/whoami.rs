use axum::extract::{Extension, State};

use crate::app::AppState;
use crate::auth::Principal;
use crate::middleware::{ApiResponse, ApiResult, Session};

/// GET /api/admin/whoami - the signed-in principal with its current stored role
pub async fn get(State(state): State<AppState>, Extension(session): Extension<Session>) -> ApiResult<Principal> {
    let principal = state.content.guard().current(session.principal()).await?;
    Ok(ApiResponse::success(principal))
}
