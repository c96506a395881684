use std::collections::BTreeMap;

use thiserror::Error;

use crate::store::StoreError;

/// Outcome taxonomy shared by every content, media, grant and contact operation.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    ValidationFailed {
        message: String,
        field_errors: BTreeMap<String, String>,
    },

    #[error("{0}")]
    StoreUnavailable(String),

    #[error("Missing configuration: {0}")]
    ConfigurationMissing(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unsupported(String),
}

impl ContentError {
    pub fn unauthorized() -> Self {
        ContentError::Unauthorized("Unauthorized".to_string())
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut field_errors = BTreeMap::new();
        field_errors.insert(field.into(), message.into());
        ContentError::ValidationFailed {
            message: "Validation failed".to_string(),
            field_errors,
        }
    }

    pub fn fields(field_errors: BTreeMap<String, String>) -> Self {
        ContentError::ValidationFailed {
            message: "Validation failed".to_string(),
            field_errors,
        }
    }

    /// Write-path conversion: the operator sees the underlying store message.
    pub fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ContentError::Conflict(msg),
            StoreError::Unavailable(msg) | StoreError::Query(msg) => ContentError::StoreUnavailable(msg),
        }
    }

    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ContentError::ValidationFailed { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }
}

impl From<StoreError> for ContentError {
    fn from(err: StoreError) -> Self {
        ContentError::from_store(err)
    }
}
