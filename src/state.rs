use std::sync::Arc;

use crate::data::loader::TableSource;
use crate::data::model::Table;
use crate::error::QueryError;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// State shared by every request. Holds no table: each request loads its own.
#[derive(Clone)]
pub struct AppState {
    /// Where listings are read from.
    pub source: Arc<dyn TableSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn TableSource>) -> Self {
        Self { source }
    }

    /// Load a fresh table and run `query` against it.
    ///
    /// The load is blocking file I/O, so both steps run on the blocking pool.
    pub async fn with_table<T, F>(&self, query: F) -> Result<T, QueryError>
    where
        F: FnOnce(&Table) -> Result<T, QueryError> + Send + 'static,
        T: Send + 'static,
    {
        let source = Arc::clone(&self.source);
        tokio::task::spawn_blocking(move || {
            let table = source.load()?;
            query(&table)
        })
        .await
        .map_err(|e| QueryError::DataSource(anyhow::anyhow!("load task failed: {e}")))?
    }
}
