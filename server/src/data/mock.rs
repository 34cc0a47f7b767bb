//! In-memory repository for tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::error::DataError;
use super::traits::{Repository, SelectParams};
use super::types::{NativeValue, Row, SeriesRows};

/// Records every `select` and answers from canned data
#[derive(Default)]
pub struct MockRepository {
    pub rows: SeriesRows,
    pub fail_select: Option<String>,
    pub fail_ping: bool,
    pub keyspaces: Vec<String>,
    /// keyspace -> tables
    pub tables: HashMap<String, Vec<String>>,
    /// (keyspace, table) -> (column, cql type)
    pub columns: HashMap<(String, String), Vec<(String, String)>>,
    pub calls: Mutex<Vec<(String, SelectParams)>>,
    pub closed: AtomicBool,
}

impl MockRepository {
    pub fn with_rows(rows: SeriesRows) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_select: Some(message.to_string()),
            fail_ping: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, SelectParams)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<(), DataError> {
        if self.is_closed() {
            return Err(DataError::Closed);
        }
        Ok(())
    }
}

/// One series of `(id, value, time_ms)` rows
pub fn series(id: &str, points: &[(f64, i64)]) -> (String, Vec<Row>) {
    let rows = points
        .iter()
        .map(|&(value, ms)| {
            Row::from_pairs(vec![
                ("id".to_string(), NativeValue::Text(id.to_string())),
                ("value".to_string(), NativeValue::Double(value)),
                (
                    "time".to_string(),
                    NativeValue::Timestamp(crate::utils::time::millis_to_datetime(ms)),
                ),
            ])
        })
        .collect();
    (id.to_string(), rows)
}

#[async_trait]
impl Repository for MockRepository {
    async fn select(&self, statement: &str, params: SelectParams) -> Result<SeriesRows, DataError> {
        self.ensure_open()?;
        self.calls
            .lock()
            .unwrap()
            .push((statement.to_string(), params));
        if let Some(ref message) = self.fail_select {
            return Err(DataError::query(message));
        }
        Ok(self.rows.clone())
    }

    async fn keyspaces(&self) -> Result<Vec<String>, DataError> {
        self.ensure_open()?;
        Ok(self.keyspaces.clone())
    }

    async fn tables(&self, keyspace: &str) -> Result<Vec<String>, DataError> {
        self.ensure_open()?;
        Ok(self.tables.get(keyspace).cloned().unwrap_or_default())
    }

    async fn columns(
        &self,
        keyspace: &str,
        table: &str,
        need_type: &str,
    ) -> Result<Vec<String>, DataError> {
        self.ensure_open()?;
        let columns = self
            .columns
            .get(&(keyspace.to_string(), table.to_string()))
            .ok_or_else(|| DataError::NoSuchTable(table.to_string()))?;
        Ok(columns
            .iter()
            .filter(|(_, ty)| need_type.is_empty() || ty == need_type)
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn ping(&self) -> Result<(), DataError> {
        self.ensure_open()?;
        if self.fail_ping {
            return Err(DataError::connection("no hosts available"));
        }
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
