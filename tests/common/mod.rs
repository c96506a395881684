#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use uuid::Uuid;

use site_cms_api::app::{self, AppState};
use site_cms_api::auth::{generate_jwt, Claims, Role};
use site_cms_api::config::AppConfig;
use site_cms_api::mailer::Mailer;
use site_cms_api::media::MemoryObjectStore;
use site_cms_api::revalidate::RecordingRevalidator;
use site_cms_api::store::MemoryStore;

pub const MEDIA_BASE_URL: &str = "http://media.test/site-media";

/// One in-process server per test, bound to an ephemeral port, with every external
/// collaborator replaced by an inspectable in-memory double.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub config: AppConfig,
    pub store: Arc<MemoryStore>,
    pub objects: Arc<MemoryObjectStore>,
    pub revalidator: Arc<RecordingRevalidator>,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let mailer = Mailer::new(None, "site@test", "inbox@test", Duration::from_millis(20));
        Self::spawn_with_mailer(mailer).await
    }

    pub async fn spawn_with_mailer(mailer: Mailer) -> Result<Self> {
        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;

        let store = Arc::new(MemoryStore::new());
        let objects = Arc::new(MemoryObjectStore::new(MEDIA_BASE_URL));
        let revalidator = Arc::new(RecordingRevalidator::new());

        let state = AppState::new(
            config.clone(),
            store.clone(),
            objects.clone(),
            revalidator.clone(),
            mailer,
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app::router(state)).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            config,
            store,
            objects,
            revalidator,
        })
    }

    /// Registers a principal with the given stored role and returns a bearer token for it.
    pub async fn login(&self, email: &str, role: Option<Role>) -> Result<(Uuid, String)> {
        let id = Uuid::new_v4();
        self.store.add_principal(id, email, role).await;
        Ok((id, self.token_for(id, email)?))
    }

    pub async fn super_admin(&self) -> Result<String> {
        Ok(self.login("root@site.test", Some(Role::SuperAdmin)).await?.1)
    }

    pub fn token_for(&self, id: Uuid, email: &str) -> Result<String> {
        let claims = Claims::new(id, email, 1);
        Ok(generate_jwt(&claims, &self.config.security.jwt_secret)?)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and returns the status with the decoded JSON body (`Null` when empty).
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let json = if text.is_empty() { Value::Null } else { serde_json::from_str(&text)? };
        Ok((status, json))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, path, token, Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PATCH, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, path, token, None).await
    }

    /// Raw-body upload as the admin UI does it.
    pub async fn upload(
        &self,
        name: &str,
        token: Option<&str>,
        bytes: &'static [u8],
        content_type: &str,
    ) -> Result<(StatusCode, Value)> {
        let mut request = self
            .client
            .put(self.url(&format!("/api/admin/media/{}", name)))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }
}

/// The `data` member of a success envelope.
pub fn data(body: &Value) -> &Value {
    &body["data"]
}
