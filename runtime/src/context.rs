//! Capabilities handed to widget code at runtime.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DataSourceError(pub String);

/// A bound data source. Rows are JSON objects.
pub trait DataSource: Send + Sync {
    fn select(&self, query: &str) -> Result<Vec<Value>, DataSourceError>;
}

/// What resolvers may consult while supplying modules.
#[derive(Clone, Default)]
pub struct RuntimeContext {
    data_source: Option<Arc<dyn DataSource>>,
}

impl fmt::Debug for RuntimeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeContext")
            .field("data_source", &self.data_source.is_some())
            .finish()
    }
}

impl RuntimeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_source(data_source: Arc<dyn DataSource>) -> Self {
        Self {
            data_source: Some(data_source),
        }
    }

    pub fn data_source(&self) -> Option<&Arc<dyn DataSource>> {
        self.data_source.as_ref()
    }
}

/// Canned query results keyed by whitespace-normalized query text.
#[derive(Debug, Default)]
pub struct InMemoryDataSource {
    tables: HashMap<String, Vec<Value>>,
    fallback: Option<Vec<Value>>,
    log: Mutex<Vec<String>>,
}

fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, query: &str, rows: Vec<Value>) -> Self {
        self.tables.insert(normalize_query(query), rows);
        self
    }

    /// Rows answered for any query without an exact entry.
    pub fn with_fallback(mut self, rows: Vec<Value>) -> Self {
        self.fallback = Some(rows);
        self
    }

    /// Every query seen so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

impl DataSource for InMemoryDataSource {
    fn select(&self, query: &str) -> Result<Vec<Value>, DataSourceError> {
        let key = normalize_query(query);
        self.log.lock().push(key.clone());
        self.tables
            .get(&key)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| DataSourceError(format!("no rows registered for query: {key}")))
    }
}
