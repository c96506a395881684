use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Row as _};
use uuid::Uuid;

use super::{ContentStore, PrincipalRecord, RecordKey, Row, StoreError, PROFILES_TABLE};
use crate::auth::Role;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::query_builder::{QueryBuilder, SqlParam, SqlStatement};
use crate::filter::FilterData;

/// Content store backed by the hosted Postgres database.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_rows(&self, statement: SqlStatement) -> Result<Vec<Row>, StoreError> {
        let mut query = sqlx::query(&statement.query);
        for param in &statement.params {
            query = bind_param(query, param);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(StoreError::from)?;
        rows.iter()
            .map(|row| {
                let value: Value = row.try_get("row").map_err(StoreError::from)?;
                match value {
                    Value::Object(map) => Ok(map),
                    other => Err(StoreError::Query(format!("unexpected row format: {}", other))),
                }
            })
            .collect()
    }

    async fn fetch_optional(&self, statement: SqlStatement) -> Result<Option<Row>, StoreError> {
        Ok(self.fetch_rows(statement).await?.into_iter().next())
    }
}

fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    param: &'q SqlParam,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match param {
        SqlParam::Text(text) => q.bind(text.as_deref()),
        SqlParam::Json(value) => q.bind(value),
    }
}

fn principal_from_row(row: &sqlx::postgres::PgRow) -> Result<PrincipalRecord, StoreError> {
    let role: Option<String> = row.try_get("role").map_err(StoreError::from)?;
    Ok(PrincipalRecord {
        id: row.try_get("id").map_err(StoreError::from)?,
        email: row.try_get("email").map_err(StoreError::from)?,
        role: role.and_then(|r| r.parse::<Role>().ok()),
    })
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                StoreError::Unavailable(err.to_string())
            }
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                StoreError::Conflict(db.message().to_string())
            }
            _ => StoreError::Query(err.to_string()),
        }
    }
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Sqlx(e) => e.into(),
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl => StoreError::Unavailable(err.to_string()),
            DatabaseError::QueryError(msg) => StoreError::Query(msg),
        }
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool).await.map_err(StoreError::from)
    }

    async fn select(&self, table: &str, filter: &FilterData) -> Result<Vec<Row>, StoreError> {
        let statement = QueryBuilder::new(table)?.select(filter)?;
        self.fetch_rows(statement).await
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError> {
        let statement = QueryBuilder::new(table)?.insert(&row)?;
        self.fetch_optional(statement)
            .await?
            .ok_or_else(|| StoreError::Query(format!("insert into {} returned no row", table)))
    }

    async fn update(&self, table: &str, key: &RecordKey, patch: Row) -> Result<Option<Row>, StoreError> {
        let statement = QueryBuilder::new(table)?.update(key, &patch)?;
        self.fetch_optional(statement).await
    }

    async fn upsert(&self, table: &str, key: &RecordKey, row: Row) -> Result<Row, StoreError> {
        let statement = QueryBuilder::new(table)?.upsert(key, &row)?;
        self.fetch_optional(statement)
            .await?
            .ok_or_else(|| StoreError::Query(format!("upsert into {} returned no row", table)))
    }

    async fn delete(&self, table: &str, key: &RecordKey) -> Result<Option<Row>, StoreError> {
        let statement = QueryBuilder::new(table)?.delete(key)?;
        self.fetch_optional(statement).await
    }

    async fn find_principal(&self, principal_id: Uuid) -> Result<Option<PrincipalRecord>, StoreError> {
        let query = format!("SELECT id, email, role FROM {} WHERE id = $1", PROFILES_TABLE);
        let row = sqlx::query(&query)
            .bind(principal_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(principal_from_row).transpose()
    }

    async fn find_principal_by_email(&self, email: &str) -> Result<Option<PrincipalRecord>, StoreError> {
        let query = format!("SELECT id, email, role FROM {} WHERE lower(email) = lower($1)", PROFILES_TABLE);
        let row = sqlx::query(&query)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(principal_from_row).transpose()
    }

    async fn set_role(&self, principal_id: Uuid, role: Option<Role>) -> Result<(), StoreError> {
        let query = format!("UPDATE {} SET role = $2, updated_at = now() WHERE id = $1", PROFILES_TABLE);
        let result = sqlx::query(&query)
            .bind(principal_id)
            .bind(role.map(|r| r.as_str()))
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Query(format!("no profile row for {}", principal_id)));
        }
        Ok(())
    }
}
