use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::RwLock;

use crate::filter::SortDirection;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid object path: {0}")]
    InvalidPath(String),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Metadata for one stored object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectMeta {
    pub path: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Name,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub limit: usize,
    pub offset: usize,
    pub sort_by: SortColumn,
    pub direction: SortDirection,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
            sort_by: SortColumn::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Objects directly under `prefix` (no recursion).
    async fn list(&self, prefix: &str, options: &ListOptions) -> Result<Vec<ObjectMeta>, StorageError>;

    fn public_url(&self, path: &str) -> String;

    /// Stores `bytes` at `path`. With `upsert == false` an existing object is an error, never
    /// overwritten.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
        upsert: bool,
    ) -> Result<ObjectMeta, StorageError>;

    /// Removes every listed path. Missing objects are ignored.
    async fn remove(&self, paths: &[String]) -> Result<(), StorageError>;
}

/// Rejects absolute paths and any `..` segment.
pub fn check_relative(path: &str) -> Result<(), StorageError> {
    let invalid = path.starts_with('/')
        || path.starts_with('\\')
        || Path::new(path)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if invalid || path.contains("..") {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}

fn join_path(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

fn sort_and_page(mut objects: Vec<ObjectMeta>, options: &ListOptions) -> Vec<ObjectMeta> {
    objects.sort_by(|a, b| {
        let ordering = match options.sort_by {
            SortColumn::Name => a.name().cmp(b.name()),
            SortColumn::CreatedAt => a.created_at.cmp(&b.created_at).then_with(|| a.name().cmp(b.name())),
        };
        match options.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    objects.into_iter().skip(options.offset).take(options.limit).collect()
}

/// Files under a local directory, served by the HTTP layer at `public_base_url`.
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        check_relative(path)?;
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn list(&self, prefix: &str, options: &ListOptions) -> Result<Vec<ObjectMeta>, StorageError> {
        let dir = if prefix.trim_matches('/').is_empty() {
            self.root.clone()
        } else {
            self.resolve(prefix.trim_matches('/'))?
        };

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let created = metadata.created().or_else(|_| metadata.modified()).ok();
            objects.push(ObjectMeta {
                path: join_path(prefix, &entry.file_name().to_string_lossy()),
                size: metadata.len(),
                content_type: None,
                created_at: created.map(DateTime::<Utc>::from),
            });
        }
        Ok(sort_and_page(objects, options))
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path.trim_start_matches('/'))
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
        upsert: bool,
    ) -> Result<ObjectMeta, StorageError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true);
        if upsert {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let mut file = options.open(&target).await.map_err(|err| match err.kind() {
            ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.to_string()),
            _ => StorageError::Io(err),
        })?;
        write_or_discard(&mut file, &target, &bytes).await?;

        Ok(ObjectMeta {
            path: path.to_string(),
            size: bytes.len() as u64,
            content_type: content_type.map(str::to_string),
            created_at: Some(Utc::now()),
        })
    }

    async fn remove(&self, paths: &[String]) -> Result<(), StorageError> {
        for path in paths {
            let target = self.resolve(path)?;
            match tokio::fs::remove_file(&target).await {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

/// In-process object store keeping content types, for tests and database-less development.
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, (ObjectMeta, Vec<u8>)>>,
    public_base_url: String,
}

impl MemoryObjectStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(path).map(|(_, bytes)| bytes.clone())
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list(&self, prefix: &str, options: &ListOptions) -> Result<Vec<ObjectMeta>, StorageError> {
        let prefix = prefix.trim_matches('/');
        let objects = self.objects.read().await;
        let matching = objects
            .values()
            .filter(|(meta, _)| match meta.path.rsplit_once('/') {
                Some((dir, _)) => dir == prefix,
                None => prefix.is_empty(),
            })
            .map(|(meta, _)| meta.clone())
            .collect();
        Ok(sort_and_page(matching, options))
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path.trim_start_matches('/'))
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
        upsert: bool,
    ) -> Result<ObjectMeta, StorageError> {
        check_relative(path)?;
        let mut objects = self.objects.write().await;
        if !upsert && objects.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        let meta = ObjectMeta {
            path: path.to_string(),
            size: bytes.len() as u64,
            content_type: content_type.map(str::to_string),
            created_at: Some(Utc::now()),
        };
        objects.insert(path.to_string(), (meta.clone(), bytes));
        Ok(meta)
    }

    async fn remove(&self, paths: &[String]) -> Result<(), StorageError> {
        for path in paths {
            check_relative(path)?;
        }
        let mut objects = self.objects.write().await;
        for path in paths {
            objects.remove(path);
        }
        Ok(())
    }
}

/// Writes the whole object or removes the partial file so a failed upload leaves nothing behind.
async fn write_or_discard<W>(file: &mut W, target: &Path, bytes: &[u8]) -> Result<(), StorageError>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;
    if let Err(err) = written {
        tracing::warn!("writing {} failed: {}", target.display(), err);
        if let Err(cleanup) = tokio::fs::remove_file(target).await {
            tracing::debug!("removing partial {} failed: {}", target.display(), cleanup);
        }
        return Err(err.into());
    }
    Ok(())
}
