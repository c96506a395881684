//! Media library: uploads, listing and removal of site assets in the object store.

pub mod storage;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::{AuthorizationGuard, Role, SessionPrincipal};
use crate::content::ContentError;

pub use storage::{
    check_relative, ListOptions, LocalObjectStore, MemoryObjectStore, ObjectMeta, ObjectStore, SortColumn,
    StorageError,
};

/// Source of the millisecond timestamp prefixed to stored file names.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Pdf,
    Video,
    Document,
    Unknown,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg", "avif"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi", "mkv"];
const DOCUMENT_EXTENSIONS: &[&str] = &["doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "csv", "md"];

impl MediaKind {
    /// Stored content type wins; the extension is the fallback.
    pub fn infer(content_type: Option<&str>, name: &str) -> Self {
        content_type
            .and_then(Self::from_content_type)
            .unwrap_or_else(|| Self::from_extension(name))
    }

    fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        let kind = match essence.as_str() {
            "application/pdf" => MediaKind::Pdf,
            t if t.starts_with("image/") => MediaKind::Image,
            t if t.starts_with("video/") => MediaKind::Video,
            t if t.starts_with("text/")
                || t == "application/msword"
                || t.starts_with("application/vnd.ms-")
                || t.starts_with("application/vnd.openxmlformats-officedocument") =>
            {
                MediaKind::Document
            }
            _ => return None,
        };
        Some(kind)
    }

    fn from_extension(name: &str) -> Self {
        let Some((_, ext)) = name.rsplit_once('.') else { return MediaKind::Unknown };
        let ext = ext.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Image
        } else if ext == "pdf" {
            MediaKind::Pdf
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Document
        } else {
            MediaKind::Unknown
        }
    }
}

/// One listed media object as the admin UI shows it.
#[derive(Debug, Clone, Serialize)]
pub struct MediaEntry {
    pub name: String,
    pub path: String,
    pub url: String,
    pub kind: MediaKind,
    pub size: u64,
    pub content_type: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Keeps only `[a-zA-Z0-9.-]`. An empty result becomes `file`.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

pub struct MediaLibrary {
    store: Arc<dyn ObjectStore>,
    guard: AuthorizationGuard,
    clock: Clock,
}

impl MediaLibrary {
    pub fn new(store: Arc<dyn ObjectStore>, guard: AuthorizationGuard) -> Self {
        Self::with_clock(store, guard, Arc::new(|| Utc::now().timestamp_millis()))
    }

    pub fn with_clock(store: Arc<dyn ObjectStore>, guard: AuthorizationGuard, clock: Clock) -> Self {
        Self { store, guard, clock }
    }

    pub async fn list(
        &self,
        session: Option<&SessionPrincipal>,
        path: &str,
        options: &ListOptions,
    ) -> Result<Vec<MediaEntry>, ContentError> {
        self.guard.require_authenticated(session)?;
        if !path.trim_matches('/').is_empty() {
            check_relative(path.trim_matches('/')).map_err(|_| ContentError::field("path", "Invalid media path"))?;
        }

        let objects = self.store.list(path, options).await.map_err(storage_failure)?;
        Ok(objects.into_iter().map(|meta| self.entry(meta)).collect())
    }

    /// Stores a new object under a timestamped, sanitized name. Never overwrites.
    pub async fn upload(
        &self,
        session: Option<&SessionPrincipal>,
        name: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<MediaEntry, ContentError> {
        let principal = self.guard.require_role(session, &[Role::SuperAdmin]).await?;
        if bytes.is_empty() {
            return Err(ContentError::field("file", "File is empty"));
        }

        let stored_name = format!("{}-{}", (self.clock)(), sanitize_file_name(name));
        let meta = self
            .store
            .upload(&stored_name, bytes, content_type, false)
            .await
            .map_err(storage_failure)?;

        tracing::info!("{} uploaded {} ({} bytes)", principal.email, meta.path, meta.size);
        Ok(self.entry(meta))
    }

    pub async fn delete(&self, session: Option<&SessionPrincipal>, name: &str) -> Result<(), ContentError> {
        let principal = self.guard.require_role(session, &[Role::SuperAdmin]).await?;
        if name.is_empty() || name.contains("..") || name.starts_with('/') {
            return Err(ContentError::field("name", "Invalid file name"));
        }

        self.store.remove(&[name.to_string()]).await.map_err(storage_failure)?;
        tracing::info!("{} deleted media {}", principal.email, name);
        Ok(())
    }

    fn entry(&self, meta: ObjectMeta) -> MediaEntry {
        let name = meta.name().to_string();
        MediaEntry {
            kind: MediaKind::infer(meta.content_type.as_deref(), &name),
            url: self.store.public_url(&meta.path),
            name,
            path: meta.path,
            size: meta.size,
            content_type: meta.content_type,
            created_at: meta.created_at,
        }
    }
}

fn storage_failure(err: StorageError) -> ContentError {
    match err {
        StorageError::AlreadyExists(path) => ContentError::Conflict(format!("A file named {} already exists", path)),
        StorageError::InvalidPath(path) => ContentError::field("name", format!("Invalid path {}", path)),
        StorageError::Io(err) => {
            tracing::error!("object store failure: {}", err);
            ContentError::StoreUnavailable(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use uuid::Uuid;

    async fn library(role: Option<Role>) -> (MediaLibrary, Arc<MemoryObjectStore>, SessionPrincipal) {
        let content = Arc::new(MemoryStore::new());
        let session = SessionPrincipal { id: Uuid::new_v4(), email: "media@example.com".into() };
        content.add_principal(session.id, session.email.clone(), role).await;
        let objects = Arc::new(MemoryObjectStore::new("https://cdn.example.com/media"));
        let library = MediaLibrary::with_clock(objects.clone(), AuthorizationGuard::new(content), Arc::new(|| 1_700_000_000_000_i64));
        (library, objects, session)
    }

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_file_name("Team Photo (1).JPG"), "TeamPhoto1.JPG");
        assert_eq!(sanitize_file_name("報告書"), "file");
        assert_eq!(sanitize_file_name("brief-v2.pdf"), "brief-v2.pdf");
    }

    #[test]
    fn kind_prefers_content_type() {
        assert_eq!(MediaKind::infer(Some("image/png"), "scan.pdf"), MediaKind::Image);
        assert_eq!(MediaKind::infer(Some("application/octet-stream"), "scan.pdf"), MediaKind::Pdf);
        assert_eq!(MediaKind::infer(None, "clip.MOV"), MediaKind::Video);
        assert_eq!(MediaKind::infer(None, "notes.md"), MediaKind::Document);
        assert_eq!(MediaKind::infer(None, "archive.zip"), MediaKind::Unknown);
        assert_eq!(MediaKind::infer(None, "README"), MediaKind::Unknown);
    }

    #[tokio::test]
    async fn upload_collision_is_a_conflict() {
        let (library, objects, session) = library(Some(Role::SuperAdmin)).await;
        let first = library.upload(Some(&session), "logo.png", b"one".to_vec(), Some("image/png")).await.unwrap();
        assert_eq!(first.name, "1700000000000-logo.png");
        assert_eq!(first.url, "https://cdn.example.com/media/1700000000000-logo.png");
        assert_eq!(first.kind, MediaKind::Image);

        let err = library.upload(Some(&session), "logo.png", b"two".to_vec(), None).await.unwrap_err();
        assert!(matches!(err, ContentError::Conflict(_)));
        assert_eq!(objects.contents("1700000000000-logo.png").await.unwrap(), b"one");
    }

    #[tokio::test]
    async fn writes_require_super_admin() {
        let (library, objects, session) = library(Some(Role::CompanyAdmin)).await;
        assert!(matches!(
            library.upload(Some(&session), "a.png", vec![1], None).await,
            Err(ContentError::Unauthorized(_))
        ));
        assert!(matches!(library.delete(None, "a.png").await, Err(ContentError::Unauthorized(_))));
        assert_eq!(objects.len().await, 0);
        assert!(library.list(Some(&session), "", &ListOptions::default()).await.is_ok());
        assert!(library.list(None, "", &ListOptions::default()).await.is_err());
    }

    #[tokio::test]
    async fn delete_rejects_traversal() {
        let (library, _, session) = library(Some(Role::SuperAdmin)).await;
        assert!(matches!(
            library.delete(Some(&session), "../config.toml").await,
            Err(ContentError::ValidationFailed { .. })
        ));
        assert!(library.delete(Some(&session), "gone.png").await.is_ok());
    }
}
