//! Application state and router assembly shared by the server binary and the integration tests.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::content::ContentActions;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::handlers;
use crate::mailer::{MailError, Mailer};
use crate::media::{LocalObjectStore, MediaLibrary, ObjectStore};
use crate::middleware::session_middleware;
use crate::revalidate::{HttpRevalidator, NoopRevalidator, RevalidateError, Revalidator};
use crate::store::{ContentStore, MemoryStore, PgStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error(transparent)]
    Revalidate(#[from] RevalidateError),

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),
}

/// Collaborators shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ContentStore>,
    pub content: ContentActions,
    pub media: Arc<MediaLibrary>,
    pub mailer: Arc<Mailer>,
    /// Directory served at `/media` when the local object store is in use.
    pub media_root: Option<PathBuf>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn ContentStore>,
        objects: Arc<dyn ObjectStore>,
        revalidator: Arc<dyn Revalidator>,
        mailer: Mailer,
    ) -> Self {
        let content = ContentActions::new(store.clone(), revalidator);
        let media = MediaLibrary::new(objects, content.guard().clone());
        Self {
            config: Arc::new(config),
            store,
            content,
            media: Arc::new(media),
            mailer: Arc::new(mailer),
            media_root: None,
        }
    }

    /// Wires production collaborators from configuration. Without `DATABASE_URL` content lives
    /// in memory for the lifetime of the process.
    pub fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        if config.security.jwt_secret.trim().is_empty() {
            return Err(StartupError::ConfigMissing("SECURITY_JWT_SECRET"));
        }

        let store: Arc<dyn ContentStore> = match &config.database.url {
            Some(_) => Arc::new(PgStore::new(DatabaseManager::connect(&config.database)?)),
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory content store");
                Arc::new(MemoryStore::new())
            }
        };

        let revalidator: Arc<dyn Revalidator> = match HttpRevalidator::from_config(&config.revalidate)? {
            Some(http) => Arc::new(http),
            None => {
                tracing::info!("REVALIDATE_URL not set, page invalidation disabled");
                Arc::new(NoopRevalidator)
            }
        };

        let mailer = Mailer::from_config(&config.mail)?;
        if !mailer.is_configured() {
            tracing::warn!("MAIL_API_KEY not set, contact submissions will be simulated");
        }

        let local = LocalObjectStore::new(&config.storage.root, config.storage.public_base_url.clone());
        let media_root = local.root().to_path_buf();

        let mut state = Self::new(config, store, Arc::new(local), revalidator, mailer);
        state.media_root = Some(media_root);
        Ok(state)
    }
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        .merge(admin_routes());

    if let Some(root) = &state.media_root {
        app = app.nest_service("/media", ServeDir::new(root));
    }

    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config);

    let app = app
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors);

    let app = if state.config.api.enable_request_logging {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    };
    app.with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/api/public/settings", get(public::settings_get))
        .route("/api/public/:kind", get(public::content_list))
        .route("/api/public/:kind/:key", get(public::content_get))
        .route("/api/contact", post(public::contact_post))
}

fn admin_routes() -> Router<AppState> {
    use handlers::admin;

    Router::new()
        .route("/api/admin/whoami", get(admin::whoami_get))
        .route("/api/admin/admins/grant", post(admin::grant_post))
        .route("/api/admin/media", get(admin::media_list))
        .route("/api/admin/media/:name", put(admin::media_put).delete(admin::media_delete))
        .route("/api/admin/:kind", get(admin::content_list).post(admin::content_post))
        .route(
            "/api/admin/:kind/:key",
            get(admin::content_get)
                .patch(admin::content_patch)
                .delete(admin::content_delete),
        )
        .route("/api/admin/:kind/:key/publish", post(admin::content_publish))
        .route("/api/admin/:kind/:key/unpublish", post(admin::content_unpublish))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }
    if config.security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Site CMS API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "public": "/api/public/:kind[/:key]",
                "settings": "/api/public/settings",
                "contact": "/api/contact",
                "admin": "/api/admin/:kind[/:key[/publish|/unpublish]] (bearer token)",
                "media": "/api/admin/media[/:name] (bearer token)",
                "grant": "/api/admin/admins/grant (bearer token, SUPER_ADMIN)",
                "health": "/health"
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database": "degraded",
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
