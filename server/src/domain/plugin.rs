//! Datasource plugin: runs queries against one repository and assembles frames

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::data::{DataError, Repository, Row, SelectParams};
use crate::domain::frames::{Frame, FrameOptions, assemble};
use crate::domain::query::Query;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("query processing: {0}")]
    Query(#[source] DataError),

    #[error("schema lookup: {0}")]
    Schema(#[source] DataError),

    #[error("health check: {0}")]
    Health(#[source] DataError),
}

/// Template variable option: first result column as value, second as label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Variable {
    pub value: String,
    pub label: String,
}

impl Variable {
    fn from_row(row: &Row) -> Option<Self> {
        let mut cells = row
            .columns
            .iter()
            .map(|column| row.get(column).and_then(|v| v.to_label_string()));
        let value = cells.next().flatten()?;
        let label = cells.next().flatten().unwrap_or_else(|| value.clone());
        Some(Self { value, label })
    }
}

/// One live datasource instance
pub struct Plugin {
    repo: Arc<dyn Repository>,
    options: FrameOptions,
}

impl Plugin {
    pub fn new(repo: Arc<dyn Repository>, options: FrameOptions) -> Self {
        Self { repo, options }
    }

    /// Execute a query and return one frame per series
    pub async fn exec_query(&self, query: &Query) -> Result<Vec<Frame>, PluginError> {
        let result = if query.raw_query {
            tracing::debug!(statement = %query.target, "Executing raw query");
            self.repo.select(&query.target, SelectParams::None).await
        } else {
            let statement = query.build_statement();
            let params = SelectParams::Series {
                ids: query.ids(),
                from: query.time_from,
                to: query.time_to,
            };
            self.repo.select(&statement, params).await
        };
        let rows = result.map_err(PluginError::Query)?;

        let frames = assemble(query, rows, &self.options);
        tracing::debug!(frames = frames.len(), alert = query.is_alert, "Assembled frames");
        Ok(frames)
    }

    /// Run a raw SELECT and turn its rows into variable options, ordered by value
    pub async fn variables(&self, statement: &str) -> Result<Vec<Variable>, PluginError> {
        let rows = self
            .repo
            .select(statement, SelectParams::None)
            .await
            .map_err(PluginError::Query)?;

        let mut series: Vec<_> = rows.into_iter().collect();
        series.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(series
            .iter()
            .flat_map(|(_, rows)| rows.iter().filter_map(Variable::from_row))
            .collect())
    }

    pub async fn keyspaces(&self) -> Result<Vec<String>, PluginError> {
        self.repo.keyspaces().await.map_err(PluginError::Schema)
    }

    pub async fn tables(&self, keyspace: &str) -> Result<Vec<String>, PluginError> {
        self.repo.tables(keyspace).await.map_err(PluginError::Schema)
    }

    pub async fn columns(
        &self,
        keyspace: &str,
        table: &str,
        need_type: &str,
    ) -> Result<Vec<String>, PluginError> {
        self.repo
            .columns(keyspace, table, need_type)
            .await
            .map_err(PluginError::Schema)
    }

    pub async fn check_health(&self) -> Result<(), PluginError> {
        self.repo.ping().await.map_err(PluginError::Health)
    }

    pub async fn dispose(&self) {
        self.repo.close().await;
    }
}
