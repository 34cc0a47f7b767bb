//! scylla-driver backed session

use std::time::Duration;

use async_trait::async_trait;
use scylla::frame::value::CqlTimestamp;
use scylla::serialize::row::SerializeRow;
use scylla::statement::Consistency;
use scylla::transport::ExecutionProfile;
use scylla::{QueryResult, Session, SessionBuilder};
use tokio::sync::RwLock;

use super::convert::{group_by_series, text_at, text_column};
use super::tls::build_ssl_context;
use crate::core::config::DatasourceConfig;
use crate::data::error::DataError;
use crate::data::traits::{Repository, SelectParams};
use crate::data::types::SeriesRows;

const PING_STATEMENT: &str = "SELECT key FROM system.local";
const KEYSPACES_STATEMENT: &str = "SELECT keyspace_name FROM system_schema.keyspaces";
const TABLES_STATEMENT: &str =
    "SELECT table_name FROM system_schema.tables WHERE keyspace_name = ?";
const COLUMNS_STATEMENT: &str =
    "SELECT column_name, type FROM system_schema.columns WHERE keyspace_name = ? AND table_name = ?";

/// Parse a consistency level name as written in CQL (`LOCAL_QUORUM`, `one`, ...)
pub fn parse_consistency(name: &str) -> Result<Consistency, DataError> {
    let consistency = match name.trim().to_ascii_uppercase().as_str() {
        "ANY" => Consistency::Any,
        "ONE" => Consistency::One,
        "TWO" => Consistency::Two,
        "THREE" => Consistency::Three,
        "QUORUM" => Consistency::Quorum,
        "ALL" => Consistency::All,
        "LOCAL_QUORUM" => Consistency::LocalQuorum,
        "EACH_QUORUM" => Consistency::EachQuorum,
        "LOCAL_ONE" => Consistency::LocalOne,
        "SERIAL" => Consistency::Serial,
        "LOCAL_SERIAL" => Consistency::LocalSerial,
        _ => {
            return Err(DataError::Config(format!(
                "unknown consistency level '{}'",
                name
            )));
        }
    };
    Ok(consistency)
}

/// Whether the statement is a SELECT (case-insensitive, leading whitespace ignored)
pub fn is_select(statement: &str) -> bool {
    statement
        .trim()
        .get(..7)
        .is_some_and(|head| head.eq_ignore_ascii_case("SELECT "))
}

/// Cluster session for one datasource
pub struct CassandraSession {
    session: RwLock<Option<Session>>,
}

impl CassandraSession {
    pub async fn connect(config: &DatasourceConfig) -> Result<Self, DataError> {
        let consistency = parse_consistency(&config.consistency)?;
        let timeout = config.timeout.map(Duration::from_secs);

        let profile = ExecutionProfile::builder()
            .consistency(consistency)
            .request_timeout(timeout)
            .build();

        let mut builder = SessionBuilder::new()
            .known_nodes(&config.hosts)
            .default_execution_profile_handle(profile.into_handle());

        if let Some(timeout) = timeout {
            builder = builder.connection_timeout(timeout);
        }
        if let Some(keyspace) = config.keyspace.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.use_keyspace(keyspace, false);
        }
        if let Some(user) = config.user.as_deref().filter(|u| !u.is_empty()) {
            builder = builder.user(user, config.password.as_deref().unwrap_or_default());
        }
        if let Some(tls) = &config.tls {
            tracing::debug!("Setting TLS configuration");
            builder = builder.ssl_context(Some(build_ssl_context(tls)?));
        }

        tracing::debug!(hosts = ?config.hosts, consistency = %config.consistency, "Connecting to cluster");
        let session = builder.build().await.map_err(DataError::connection)?;

        Ok(Self {
            session: RwLock::new(Some(session)),
        })
    }

    async fn execute(
        &self,
        statement: &str,
        values: impl SerializeRow,
    ) -> Result<QueryResult, DataError> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(DataError::Closed)?;
        session
            .query_unpaged(statement, values)
            .await
            .map_err(DataError::query)
    }
}

#[async_trait]
impl Repository for CassandraSession {
    async fn select(&self, statement: &str, params: SelectParams) -> Result<SeriesRows, DataError> {
        if !is_select(statement) {
            return Err(DataError::NotSelect(statement.to_string()));
        }

        let result = match params {
            SelectParams::None => self.execute(statement, ()).await?,
            SelectParams::Series { ids, from, to } => {
                let values = (
                    ids,
                    CqlTimestamp(from.timestamp_millis()),
                    CqlTimestamp(to.timestamp_millis()),
                );
                self.execute(statement, values).await?
            }
        };

        let columns: Vec<String> = result
            .col_specs()
            .iter()
            .map(|spec| spec.name.clone())
            .collect();
        group_by_series(&columns, result.rows_or_empty())
    }

    async fn keyspaces(&self) -> Result<Vec<String>, DataError> {
        let result = self.execute(KEYSPACES_STATEMENT, ()).await?;
        Ok(text_column(&result.rows_or_empty()))
    }

    async fn tables(&self, keyspace: &str) -> Result<Vec<String>, DataError> {
        let result = self
            .execute(TABLES_STATEMENT, (keyspace.to_string(),))
            .await?;
        Ok(text_column(&result.rows_or_empty()))
    }

    async fn columns(
        &self,
        keyspace: &str,
        table: &str,
        need_type: &str,
    ) -> Result<Vec<String>, DataError> {
        let result = self
            .execute(
                COLUMNS_STATEMENT,
                (keyspace.to_string(), table.to_string()),
            )
            .await?;
        let rows = result.rows_or_empty();
        if rows.is_empty() {
            return Err(DataError::NoSuchTable(table.to_string()));
        }

        let columns = rows
            .iter()
            .filter_map(|row| {
                let name = text_at(row, 0)?;
                let typ = text_at(row, 1)?;
                (need_type.is_empty() || typ == need_type).then(|| name.to_string())
            })
            .collect();
        Ok(columns)
    }

    async fn ping(&self) -> Result<(), DataError> {
        self.execute(PING_STATEMENT, ()).await?;
        Ok(())
    }

    async fn close(&self) {
        if self.session.write().await.take().is_some() {
            tracing::debug!("Cluster session closed");
        }
    }
}
