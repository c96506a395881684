pub mod admin;
pub mod content;
pub mod token;

use std::sync::Arc;

use crate::config::config;
use crate::database::DatabaseManager;
use crate::store::{ContentStore, PgStore};

/// Operator commands talk to the configured database directly; there is no in-memory fallback.
pub(crate) fn connect_store() -> anyhow::Result<Arc<dyn ContentStore>> {
    let pool = DatabaseManager::connect(&config().database)?;
    Ok(Arc::new(PgStore::new(pool)))
}
