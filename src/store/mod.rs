//! Content store seam.
//!
//! Every content type lives in its own table of JSON-shaped rows. The action layer only ever
//! issues one statement per operation against this trait, so both backends (Postgres and the
//! in-memory store used for tests and database-less development) stay interchangeable.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::auth::Role;
use crate::filter::FilterData;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A content row as stored: column name to JSON value.
pub type Row = Map<String, Value>;

/// Table holding principals and their stored role.
pub const PROFILES_TABLE: &str = "profiles";

/// Audit columns an upsert writes only when it inserts.
pub const INSERT_ONLY_COLUMNS: &[&str] = &["created_at", "created_by"];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// Addresses a single row by its stable key column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    pub column: &'static str,
    pub value: String,
}

impl RecordKey {
    pub fn new(column: &'static str, value: impl Into<String>) -> Self {
        Self { column, value: value.into() }
    }
}

/// A row of the principal table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrincipalRecord {
    pub id: Uuid,
    pub email: String,
    pub role: Option<Role>,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Connectivity probe used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn select(&self, table: &str, filter: &FilterData) -> Result<Vec<Row>, StoreError>;

    /// Inserts a row; the store assigns `id`, `created_at` and `updated_at` when absent.
    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError>;

    /// Overwrites only the supplied columns. `None` when no row matches the key.
    async fn update(&self, table: &str, key: &RecordKey, patch: Row) -> Result<Option<Row>, StoreError>;

    /// Insert-or-update keyed by `key`; on conflict only the supplied columns are overwritten,
    /// except [`INSERT_ONLY_COLUMNS`] which keep their original values.
    async fn upsert(&self, table: &str, key: &RecordKey, row: Row) -> Result<Row, StoreError>;

    /// Hard delete. Returns the removed row, `None` when nothing matched.
    async fn delete(&self, table: &str, key: &RecordKey) -> Result<Option<Row>, StoreError>;

    /// Fresh principal lookup, including the stored role. Never cached.
    async fn find_principal(&self, principal_id: Uuid) -> Result<Option<PrincipalRecord>, StoreError>;

    async fn find_principal_by_email(&self, email: &str) -> Result<Option<PrincipalRecord>, StoreError>;

    async fn set_role(&self, principal_id: Uuid, role: Option<Role>) -> Result<(), StoreError>;
}

/// Timestamp format written by the action layer and the in-memory store. Fixed precision keeps
/// lexical and chronological order identical.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}
