use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};

use crate::app::AppState;
use crate::content::ListView;
use crate::error::ApiError;
use crate::handlers::parse_kind;
use crate::middleware::{ApiResponse, ApiResult};
use crate::store::Row;

/// GET /api/public/:kind - published rows in public order
pub async fn list(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(filters): Query<BTreeMap<String, String>>,
) -> ApiResult<Vec<Row>> {
    let kind = parse_kind(&kind)?;
    let rows = state.content.list(kind, ListView::Public, &filters).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/public/:kind/:key - one published row by slug or natural key
pub async fn get(
    State(state): State<AppState>,
    Path((kind, key)): Path<(String, String)>,
) -> ApiResult<Row> {
    let kind = parse_kind(&kind)?;
    state
        .content
        .find_published(kind, &key)
        .await
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("No published {} found for {}", kind, key)))
}
