use serde_json::{Map, Value};

use super::error::FilterError;
use super::types::{FilterOp, FilterWhereInfo};

/// Renders equality-style conditions. Every comparison is made on the text form of the column,
/// so uuid, boolean and integer columns all bind as plain strings.
pub struct FilterWhere {
    param_values: Vec<Option<String>>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(conditions: &[FilterWhereInfo], starting_param_index: usize) -> Result<(String, Vec<Option<String>>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let mut sql_conditions = Vec::with_capacity(conditions.len());
        for condition in conditions {
            super::validate_identifier(&condition.column)?;
            sql_conditions.push(filter_where.build_sql_condition(condition));
        }
        let where_clause = if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") };
        Ok((where_clause, filter_where.param_values))
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        let quoted_column = format!("\"{}\"", condition.column);
        match condition.operator {
            FilterOp::Eq => {
                if condition.data.is_null() { format!("{} IS NULL", quoted_column) }
                else { format!("{}::text = {}", quoted_column, self.param(&condition.data)) }
            }
            FilterOp::Neq => {
                if condition.data.is_null() { format!("{} IS NOT NULL", quoted_column) }
                else { format!("{}::text IS DISTINCT FROM {}", quoted_column, self.param(&condition.data)) }
            }
        }
    }

    fn param(&mut self, value: &Value) -> String {
        self.param_values.push(value_as_text(value));
        self.param_index += 1;
        format!("${}", self.param_index)
    }

    /// Evaluates the same conditions against an in-memory row.
    pub fn matches(conditions: &[FilterWhereInfo], row: &Map<String, Value>) -> bool {
        conditions.iter().all(|condition| {
            let current = row.get(&condition.column).and_then(value_as_text);
            match condition.operator {
                FilterOp::Eq => current == value_as_text(&condition.data),
                FilterOp::Neq => current != value_as_text(&condition.data),
            }
        })
    }
}

/// Text form of a JSON scalar as Postgres would print it with `::text`.
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
