use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ContentStore, PrincipalRecord, RecordKey, Row, StoreError, INSERT_ONLY_COLUMNS};
use crate::auth::Role;
use crate::content::ContentKind;
use crate::filter::{FilterData, FilterOrder, FilterWhere};
use crate::filter::filter_where::value_as_text;

/// In-process content store. Used when no `DATABASE_URL` is configured and by the test suite,
/// which relies on its call counters to prove that rejected operations never touch content
/// tables.
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    principals: RwLock<HashMap<Uuid, PrincipalRecord>>,
    unique_columns: HashMap<&'static str, Vec<&'static str>>,
    content_calls: AtomicUsize,
    principal_lookups: AtomicUsize,
    role_writes: AtomicUsize,
    unavailable: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store that enforces the same unique keys as the relational schema.
    pub fn new() -> Self {
        let mut unique_columns: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        for kind in ContentKind::ALL {
            let spec = kind.spec();
            let columns = unique_columns.entry(spec.table).or_default();
            columns.push(spec.key_column());
            if spec.slug {
                columns.push("slug");
            }
        }

        Self {
            tables: RwLock::new(HashMap::new()),
            principals: RwLock::new(HashMap::new()),
            unique_columns,
            content_calls: AtomicUsize::new(0),
            principal_lookups: AtomicUsize::new(0),
            role_writes: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    pub async fn add_principal(&self, id: Uuid, email: impl Into<String>, role: Option<Role>) {
        let record = PrincipalRecord { id, email: email.into(), role };
        self.principals.write().await.insert(id, record);
    }

    /// Number of operations that reached a content table.
    pub fn content_calls(&self) -> usize {
        self.content_calls.load(Ordering::SeqCst)
    }

    pub fn principal_lookups(&self) -> usize {
        self.principal_lookups.load(Ordering::SeqCst)
    }

    pub fn role_writes(&self) -> usize {
        self.role_writes.load(Ordering::SeqCst)
    }

    /// Makes every subsequent call fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn rows(&self, table: &str) -> Vec<Row> {
        self.tables.read().await.get(table).cloned().unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store marked unavailable".to_string()));
        }
        Ok(())
    }

    fn begin_content_call(&self) -> Result<(), StoreError> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()
    }

    fn check_unique(&self, table: &str, rows: &[Row], candidate: &Row, skip: Option<usize>) -> Result<(), StoreError> {
        let mut columns: HashSet<&str> = HashSet::from(["id"]);
        if let Some(extra) = self.unique_columns.get(table) {
            columns.extend(extra.iter().copied());
        }

        for column in columns {
            let Some(value) = candidate.get(column).and_then(value_as_text) else { continue };
            let clash = rows.iter().enumerate().any(|(index, row)| {
                Some(index) != skip && row.get(column).and_then(value_as_text).as_deref() == Some(value.as_str())
            });
            if clash {
                return Err(StoreError::Conflict(format!(
                    "duplicate key value violates unique constraint \"{}_{}_key\"",
                    table, column
                )));
            }
        }
        Ok(())
    }
}

fn position(rows: &[Row], key: &RecordKey) -> Option<usize> {
    rows.iter().position(|row| {
        row.get(key.column).and_then(value_as_text).as_deref() == Some(key.value.as_str())
    })
}

fn apply_insert_defaults(row: &mut Row) {
    let now = super::timestamp_now();
    row.entry("id").or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    row.entry("created_at").or_insert_with(|| Value::String(now.clone()));
    row.entry("updated_at").or_insert_with(|| Value::String(now));
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }

    async fn select(&self, table: &str, filter: &FilterData) -> Result<Vec<Row>, StoreError> {
        self.begin_content_call()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| FilterWhere::matches(&filter.conditions, row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        FilterOrder::sort_rows(&mut rows, &filter.order);
        if let Some(limit) = filter.limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, mut row: Row) -> Result<Row, StoreError> {
        self.begin_content_call()?;
        apply_insert_defaults(&mut row);

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        self.check_unique(table, rows, &row, None)?;
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, key: &RecordKey, patch: Row) -> Result<Option<Row>, StoreError> {
        self.begin_content_call()?;
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else { return Ok(None) };
        let Some(index) = position(rows, key) else { return Ok(None) };

        let mut merged = rows[index].clone();
        merged.extend(patch);
        self.check_unique(table, rows, &merged, Some(index))?;
        rows[index] = merged.clone();
        Ok(Some(merged))
    }

    async fn upsert(&self, table: &str, key: &RecordKey, mut row: Row) -> Result<Row, StoreError> {
        self.begin_content_call()?;
        row.insert(key.column.to_string(), Value::String(key.value.clone()));

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        match position(rows, key) {
            Some(index) => {
                row.retain(|column, _| !INSERT_ONLY_COLUMNS.contains(&column.as_str()));
                let mut merged = rows[index].clone();
                merged.extend(row);
                self.check_unique(table, rows, &merged, Some(index))?;
                rows[index] = merged.clone();
                Ok(merged)
            }
            None => {
                apply_insert_defaults(&mut row);
                self.check_unique(table, rows, &row, None)?;
                rows.push(row.clone());
                Ok(row)
            }
        }
    }

    async fn delete(&self, table: &str, key: &RecordKey) -> Result<Option<Row>, StoreError> {
        self.begin_content_call()?;
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else { return Ok(None) };
        Ok(position(rows, key).map(|index| rows.remove(index)))
    }

    async fn find_principal(&self, principal_id: Uuid) -> Result<Option<PrincipalRecord>, StoreError> {
        self.principal_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.principals.read().await.get(&principal_id).cloned())
    }

    async fn find_principal_by_email(&self, email: &str) -> Result<Option<PrincipalRecord>, StoreError> {
        self.principal_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let principals = self.principals.read().await;
        Ok(principals
            .values()
            .find(|p| p.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn set_role(&self, principal_id: Uuid, role: Option<Role>) -> Result<(), StoreError> {
        self.check_available()?;
        let mut principals = self.principals.write().await;
        match principals.get_mut(&principal_id) {
            Some(principal) => {
                principal.role = role;
                self.role_writes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(StoreError::Query(format!("no profile row for {}", principal_id))),
        }
    }
}
