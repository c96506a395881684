use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{decode_jwt, SessionPrincipal};

/// The request's verified session, if any. Inserted for every request; the guard decides what
/// an absent session may do.
#[derive(Clone, Debug, Default)]
pub struct Session(pub Option<SessionPrincipal>);

impl Session {
    pub fn principal(&self) -> Option<&SessionPrincipal> {
        self.0.as_ref()
    }
}

/// Resolves the bearer token into a [`Session`]. Never rejects: a missing, malformed or expired
/// token simply yields an anonymous session.
pub async fn session_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match extract_bearer(&headers) {
        Ok(Some(token)) => match decode_jwt(token, &state.config.security.jwt_secret) {
            Ok(claims) => Some(SessionPrincipal::from(claims)),
            Err(e) => {
                tracing::debug!("ignoring bearer token: {}", e);
                None
            }
        },
        Ok(None) => None,
        Err(msg) => {
            tracing::debug!("ignoring authorization header: {}", msg);
            None
        }
    };

    request.extensions_mut().insert(Session(session));
    next.run(request).await
}

/// Extract the bearer token from the Authorization header
fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, &'static str> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim())),
        Some(_) => Err("Empty bearer token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
