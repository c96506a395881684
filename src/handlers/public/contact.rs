use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::app::AppState;
use crate::mailer::{ContactForm, ContactReceipt};
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/contact - validate and forward a contact-form submission
pub async fn post(
    State(state): State<AppState>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> ApiResult<ContactReceipt> {
    let Json(form) = payload?;
    let receipt = state.mailer.submit(&form).await?;
    Ok(ApiResponse::success(receipt))
}
