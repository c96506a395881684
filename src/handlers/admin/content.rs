use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::content::ListView;
use crate::error::ApiError;
use crate::handlers::{body_to_row, parse_kind};
use crate::middleware::{ApiResponse, ApiResult, Session};
use crate::store::Row;

/// GET /api/admin/:kind - every row, in admin order
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(kind): Path<String>,
    Query(filters): Query<BTreeMap<String, String>>,
) -> ApiResult<Vec<Row>> {
    let kind = parse_kind(&kind)?;
    state.content.guard().require_authenticated(session.principal())?;
    let rows = state.content.list(kind, ListView::Admin, &filters).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/admin/:kind/:key - one row by stable key, published or not
pub async fn get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((kind, key)): Path<(String, String)>,
) -> ApiResult<Row> {
    let kind = parse_kind(&kind)?;
    state.content.guard().require_authenticated(session.principal())?;
    state
        .content
        .get_one(kind, &key)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("No {} record with key {}", kind, key)))
}

/// POST /api/admin/:kind - create
pub async fn post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(kind): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Row> {
    let kind = parse_kind(&kind)?;
    let input = body_to_row(payload)?;
    let created = state.content.create(session.principal(), kind, input).await?;
    Ok(ApiResponse::created(created))
}

/// PATCH /api/admin/:kind/:key - partial update (upsert for natural keys)
pub async fn patch(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((kind, key)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Row> {
    let kind = parse_kind(&kind)?;
    let input = body_to_row(payload)?;
    let updated = state.content.update(session.principal(), kind, &key, input).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/admin/:kind/:key - hard delete, idempotent
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((kind, key)): Path<(String, String)>,
) -> ApiResult<Value> {
    let kind = parse_kind(&kind)?;
    state.content.delete(session.principal(), kind, &key).await?;
    Ok(ApiResponse::success(json!({ "deleted": key })))
}

/// POST /api/admin/:kind/:key/publish
pub async fn publish(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((kind, key)): Path<(String, String)>,
) -> ApiResult<Row> {
    let kind = parse_kind(&kind)?;
    let row = state.content.publish(session.principal(), kind, &key).await?;
    Ok(ApiResponse::success(row))
}

/// POST /api/admin/:kind/:key/unpublish
pub async fn unpublish(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((kind, key)): Path<(String, String)>,
) -> ApiResult<Row> {
    let kind = parse_kind(&kind)?;
    let row = state.content.unpublish(session.principal(), kind, &key).await?;
    Ok(ApiResponse::success(row))
}
