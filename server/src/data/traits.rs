//! Repository trait for the database session
//!
//! The plugin layer talks to the cluster only through [`Repository`], so the
//! query pipeline can be exercised against an in-memory implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::error::DataError;
use crate::data::types::SeriesRows;

/// Bound parameters of a SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub enum SelectParams {
    /// Raw statement, nothing bound
    None,
    /// Structured statement: `IN ?` identifier list and inclusive time range
    Series {
        ids: Vec<String>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

#[async_trait]
pub trait Repository: Send + Sync {
    /// Execute a SELECT and return rows grouped by the first selected column
    async fn select(&self, statement: &str, params: SelectParams) -> Result<SeriesRows, DataError>;

    async fn keyspaces(&self) -> Result<Vec<String>, DataError>;

    async fn tables(&self, keyspace: &str) -> Result<Vec<String>, DataError>;

    /// Column names of a table whose CQL type equals `need_type`
    /// (all columns when `need_type` is empty)
    async fn columns(
        &self,
        keyspace: &str,
        table: &str,
        need_type: &str,
    ) -> Result<Vec<String>, DataError>;

    /// Lightweight round-trip to verify the session is usable
    async fn ping(&self) -> Result<(), DataError>;

    /// Release the session. Later calls fail with [`DataError::Closed`].
    async fn close(&self);
}
