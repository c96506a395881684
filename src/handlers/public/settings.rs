use std::collections::BTreeMap;

use axum::extract::State;

use crate::app::AppState;
use crate::content::{ContentKind, ListView, SiteSettings};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/public/settings - stored settings merged over the documented defaults
pub async fn get(State(state): State<AppState>) -> ApiResult<SiteSettings> {
    let rows = state
        .content
        .list(ContentKind::Settings, ListView::Public, &BTreeMap::new())
        .await?;
    Ok(ApiResponse::success(SiteSettings::from_rows(&rows)))
}
