use axum::{
    body::Bytes,
    extract::{Extension, Path, Query, State},
    http::{header, HeaderMap},
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::filter::SortDirection;
use crate::media::{ListOptions, MediaEntry, SortColumn};
use crate::middleware::{ApiResponse, ApiResult, Session};

#[derive(Debug, Default, Deserialize)]
pub struct MediaQuery {
    /// Folder within the bucket; root when absent.
    pub path: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// `name` or `created_at`, optionally suffixed with `:asc` / `:desc`.
    pub sort: Option<String>,
}

impl MediaQuery {
    fn options(&self) -> Result<ListOptions, ApiError> {
        let mut options = ListOptions::default();
        if let Some(limit) = self.limit {
            options.limit = limit;
        }
        if let Some(offset) = self.offset {
            options.offset = offset;
        }
        if let Some(sort) = &self.sort {
            let (column, direction) = sort.split_once(':').unwrap_or((sort.as_str(), ""));
            options.sort_by = match column {
                "name" => SortColumn::Name,
                "created_at" => SortColumn::CreatedAt,
                other => return Err(ApiError::bad_request(format!("Cannot sort media by {}", other))),
            };
            options.direction = match direction.to_ascii_lowercase().as_str() {
                "" if options.sort_by == SortColumn::Name => SortDirection::Asc,
                "" | "desc" => SortDirection::Desc,
                "asc" => SortDirection::Asc,
                other => return Err(ApiError::bad_request(format!("Invalid sort direction: {}", other))),
            };
        }
        Ok(options)
    }
}

/// GET /api/admin/media - list objects with public URLs and inferred kinds
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<MediaQuery>,
) -> ApiResult<Vec<MediaEntry>> {
    let options = query.options()?;
    let path = query.path.as_deref().unwrap_or_default();
    let entries = state.media.list(session.principal(), path, &options).await?;
    Ok(ApiResponse::success(entries))
}

/// PUT /api/admin/media/:name - raw body upload; never overwrites
pub async fn put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<MediaEntry> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let entry = state
        .media
        .upload(session.principal(), &name, body.to_vec(), content_type.as_deref())
        .await?;
    Ok(ApiResponse::created(entry))
}

/// DELETE /api/admin/media/:name
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(name): Path<String>,
) -> ApiResult<Value> {
    state.media.delete(session.principal(), &name).await?;
    Ok(ApiResponse::success(json!({ "deleted": name })))
}
