use serde_json::Value;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::filter::{validate_identifier, FilterData, FilterOrder, FilterWhere};
use crate::store::{RecordKey, Row, INSERT_ONLY_COLUMNS};

/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(Option<String>),
    Json(Value),
}

#[derive(Debug, Clone)]
pub struct SqlStatement {
    pub query: String,
    pub params: Vec<SqlParam>,
}

/// Builds statements over JSON rows. Every statement yields a single `row` column holding
/// `row_to_json` of the affected rows, so callers never map columns by hand.
pub struct QueryBuilder {
    table: String,
}

impl QueryBuilder {
    pub fn new(table_name: impl Into<String>) -> Result<Self, DatabaseError> {
        let table = table_name.into();
        validate_identifier(&table).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        Ok(Self { table })
    }

    fn quoted_table(&self) -> String {
        DatabaseManager::quote_identifier(&self.table)
    }

    pub fn select(&self, filter: &FilterData) -> Result<SqlStatement, DatabaseError> {
        let (where_clause, params) = FilterWhere::generate(&filter.conditions, 0)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        let order_clause = FilterOrder::generate(&filter.order)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let mut query = format!(
            "SELECT row_to_json(t) AS row FROM {} t WHERE {}",
            self.quoted_table(),
            where_clause
        );
        if !order_clause.is_empty() {
            query.push(' ');
            query.push_str(&order_clause);
        }
        if let Some(limit) = filter.limit {
            if limit < 0 {
                return Err(DatabaseError::QueryError(format!("Invalid limit: {}", limit)));
            }
            query.push_str(&format!(" LIMIT {}", limit));
        }

        Ok(SqlStatement {
            query,
            params: params.into_iter().map(SqlParam::Text).collect(),
        })
    }

    pub fn insert(&self, row: &Row) -> Result<SqlStatement, DatabaseError> {
        let columns = quoted_columns(row)?;
        let table = self.quoted_table();

        if columns.is_empty() {
            return Ok(SqlStatement {
                query: format!(
                    "WITH inserted AS (INSERT INTO {} DEFAULT VALUES RETURNING *) \
                     SELECT row_to_json(inserted) AS row FROM inserted",
                    table
                ),
                params: vec![],
            });
        }

        let list = columns.join(", ");
        Ok(SqlStatement {
            query: format!(
                "WITH inserted AS (INSERT INTO {table} ({list}) SELECT {list} FROM jsonb_populate_record(NULL::{table}, $1::jsonb) RETURNING *) \
                 SELECT row_to_json(inserted) AS row FROM inserted"
            ),
            params: vec![SqlParam::Json(Value::Object(row.clone()))],
        })
    }

    pub fn update(&self, key: &RecordKey, patch: &Row) -> Result<SqlStatement, DatabaseError> {
        validate_identifier(key.column).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        let columns = quoted_columns(patch)?;
        let table = self.quoted_table();
        let key_column = DatabaseManager::quote_identifier(key.column);

        if columns.is_empty() {
            return Ok(SqlStatement {
                query: format!("SELECT row_to_json(t) AS row FROM {table} t WHERE {key_column}::text = $1"),
                params: vec![SqlParam::Text(Some(key.value.clone()))],
            });
        }

        let assignments = columns
            .iter()
            .map(|c| format!("{c} = src.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(SqlStatement {
            query: format!(
                "WITH updated AS (UPDATE {table} SET {assignments} FROM jsonb_populate_record(NULL::{table}, $1::jsonb) AS src \
                 WHERE {table}.{key_column}::text = $2 RETURNING {table}.*) \
                 SELECT row_to_json(updated) AS row FROM updated"
            ),
            params: vec![
                SqlParam::Json(Value::Object(patch.clone())),
                SqlParam::Text(Some(key.value.clone())),
            ],
        })
    }

    pub fn upsert(&self, key: &RecordKey, row: &Row) -> Result<SqlStatement, DatabaseError> {
        validate_identifier(key.column).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        let mut full = row.clone();
        full.insert(key.column.to_string(), Value::String(key.value.clone()));

        let columns = quoted_columns(&full)?;
        let table = self.quoted_table();
        let key_column = DatabaseManager::quote_identifier(key.column);
        let list = columns.join(", ");

        let mut assignments: Vec<String> = full
            .keys()
            .filter(|c| *c != key.column && !INSERT_ONLY_COLUMNS.contains(&c.as_str()))
            .map(|c| DatabaseManager::quote_identifier(c))
            .map(|c| format!("{c} = EXCLUDED.{c}"))
            .collect();
        if assignments.is_empty() {
            // Keeps RETURNING populated when the row already exists.
            assignments.push(format!("{key_column} = EXCLUDED.{key_column}"));
        }

        Ok(SqlStatement {
            query: format!(
                "WITH upserted AS (INSERT INTO {table} ({list}) SELECT {list} FROM jsonb_populate_record(NULL::{table}, $1::jsonb) \
                 ON CONFLICT ({key_column}) DO UPDATE SET {} RETURNING *) \
                 SELECT row_to_json(upserted) AS row FROM upserted",
                assignments.join(", ")
            ),
            params: vec![SqlParam::Json(Value::Object(full))],
        })
    }

    pub fn delete(&self, key: &RecordKey) -> Result<SqlStatement, DatabaseError> {
        validate_identifier(key.column).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        let table = self.quoted_table();
        let key_column = DatabaseManager::quote_identifier(key.column);
        Ok(SqlStatement {
            query: format!(
                "WITH deleted AS (DELETE FROM {table} WHERE {key_column}::text = $1 RETURNING *) \
                 SELECT row_to_json(deleted) AS row FROM deleted"
            ),
            params: vec![SqlParam::Text(Some(key.value.clone()))],
        })
    }
}

fn quoted_columns(row: &Row) -> Result<Vec<String>, DatabaseError> {
    row.keys()
        .map(|column| {
            validate_identifier(column)
                .map(|_| DatabaseManager::quote_identifier(column))
                .map_err(|e| DatabaseError::QueryError(e.to_string()))
        })
        .collect()
}
