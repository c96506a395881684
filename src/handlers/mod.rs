// handlers/mod.rs - two access tiers
//
// public: no session needed, published content only (/api/public/*, /api/contact)
// admin:  session resolved by middleware, every operation decided by the guard (/api/admin/*)

pub mod admin;
pub mod public;

use axum::{extract::rejection::JsonRejection, Json};
use serde_json::Value;

use crate::content::ContentKind;
use crate::error::ApiError;
use crate::store::Row;

/// Resolves the `:kind` path segment.
pub(crate) fn parse_kind(segment: &str) -> Result<ContentKind, ApiError> {
    segment
        .parse::<ContentKind>()
        .map_err(|e| ApiError::not_found(e.to_string()))
}

/// Request bodies for content writes must be JSON objects.
pub(crate) fn body_to_row(payload: Result<Json<Value>, JsonRejection>) -> Result<Row, ApiError> {
    let Json(value) = payload?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}
