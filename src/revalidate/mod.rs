//! Render-cache invalidation.
//!
//! After a successful content mutation the action layer tells the presentation layer which
//! pages went stale. Delivery is best effort: failures are reported to the caller, which logs
//! them and moves on.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::RevalidateConfig;

/// A page (or, with `layout`, everything beneath a layout) to mark stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidationTarget {
    pub path: String,
    pub layout: bool,
}

impl InvalidationTarget {
    pub fn page(path: impl Into<String>) -> Self {
        Self { path: path.into(), layout: false }
    }

    pub fn layout(path: impl Into<String>) -> Self {
        Self { path: path.into(), layout: true }
    }
}

#[derive(Debug, Error)]
pub enum RevalidateError {
    #[error("revalidation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("revalidation endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Revalidator: Send + Sync {
    async fn invalidate(&self, targets: &[InvalidationTarget]) -> Result<(), RevalidateError>;
}

/// Used when no presentation layer is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRevalidator;

#[async_trait]
impl Revalidator for NoopRevalidator {
    async fn invalidate(&self, targets: &[InvalidationTarget]) -> Result<(), RevalidateError> {
        tracing::debug!("no revalidation endpoint configured, skipping {} path(s)", targets.len());
        Ok(())
    }
}

/// Posts `{ "paths": [...] }` to the presentation layer's revalidate endpoint.
pub struct HttpRevalidator {
    client: reqwest::Client,
    url: String,
    secret: Option<String>,
}

#[derive(Serialize)]
struct RevalidateRequest<'a> {
    paths: &'a [InvalidationTarget],
}

impl HttpRevalidator {
    pub fn new(url: impl Into<String>, secret: Option<String>, timeout: Duration) -> Result<Self, RevalidateError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url: url.into(), secret })
    }

    pub fn from_config(config: &RevalidateConfig) -> Result<Option<Self>, RevalidateError> {
        match &config.url {
            Some(url) => Ok(Some(Self::new(
                url.clone(),
                config.secret.clone(),
                Duration::from_millis(config.timeout_ms),
            )?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Revalidator for HttpRevalidator {
    async fn invalidate(&self, targets: &[InvalidationTarget]) -> Result<(), RevalidateError> {
        let mut request = self.client.post(&self.url).json(&RevalidateRequest { paths: targets });
        if let Some(secret) = &self.secret {
            request = request.header("x-revalidate-secret", secret);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RevalidateError::Rejected { status, body });
        }
        tracing::debug!("revalidated {} path(s)", targets.len());
        Ok(())
    }
}

/// Keeps every batch it receives. Can be told to fail to exercise the best-effort path.
#[derive(Default)]
pub struct RecordingRevalidator {
    batches: Mutex<Vec<Vec<InvalidationTarget>>>,
    fail: std::sync::atomic::AtomicBool,
}

impl RecordingRevalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn batches(&self) -> Vec<Vec<InvalidationTarget>> {
        self.batches.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn paths(&self) -> Vec<String> {
        self.batches().into_iter().flatten().map(|t| t.path).collect()
    }
}

#[async_trait]
impl Revalidator for RecordingRevalidator {
    async fn invalidate(&self, targets: &[InvalidationTarget]) -> Result<(), RevalidateError> {
        if let Ok(mut batches) = self.batches.lock() {
            batches.push(targets.to_vec());
        }
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(RevalidateError::Rejected { status: 500, body: "recording revalidator set to fail".into() });
        }
        Ok(())
    }
}
