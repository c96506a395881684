use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::{Principal, Role};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Session};

#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// POST /api/admin/admins/grant - give an existing principal an admin role (SUPER_ADMIN only)
pub async fn grant(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    payload: Result<Json<GrantRequest>, JsonRejection>,
) -> ApiResult<Principal> {
    let Json(request) = payload?;
    let email = request.email.trim();
    if email.is_empty() {
        return Err(ApiError::bad_request("Email is required"));
    }

    let granted = state
        .content
        .guard()
        .grant_role(session.principal(), email, request.role.unwrap_or(Role::SuperAdmin))
        .await?;
    Ok(ApiResponse::success(granted))
}
