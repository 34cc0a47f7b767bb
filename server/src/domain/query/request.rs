use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::Query;
use super::statement::apply_time_macros;
use crate::utils::time::parse_rfc3339;

const ALERT_QUERY_TYPE: &str = "alert";

#[derive(Error, Debug)]
pub enum QueryRequestError {
    #[error("invalid query payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing time range")]
    MissingTimeRange,

    #[error("invalid time range {field} '{value}': {reason}")]
    InvalidTime {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Inclusive query time range as RFC 3339 strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

/// Wire form of a single data query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DataQuery {
    pub ref_id: String,
    /// `query` or `alert`
    pub query_type: String,
    pub raw_query: bool,
    pub target: String,
    pub keyspace: String,
    pub table: String,
    pub column_time: String,
    pub column_value: String,
    pub column_id: String,
    pub value_id: String,
    pub alias: String,
    #[serde(rename = "filtering")]
    pub allow_filtering: bool,
    pub instant: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasource_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
}

impl DataQuery {
    pub fn from_value(value: serde_json::Value) -> Result<Self, QueryRequestError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Convert into a [`Query`], resolving the time range and applying
    /// time macros to the raw statement
    pub fn into_query(self) -> Result<Query, QueryRequestError> {
        let range = self
            .time_range
            .ok_or(QueryRequestError::MissingTimeRange)?;
        let time_from = parse_time("from", &range.from)?;
        let time_to = parse_time("to", &range.to)?;

        let target = if self.raw_query {
            apply_time_macros(&self.target, time_from, time_to)
        } else {
            self.target
        };

        Ok(Query {
            raw_query: self.raw_query,
            target,
            keyspace: self.keyspace,
            table: self.table,
            column_value: self.column_value,
            column_id: self.column_id,
            value_id: self.value_id,
            alias: self.alias,
            column_time: self.column_time,
            time_from,
            time_to,
            allow_filtering: self.allow_filtering,
            instant: self.instant,
            is_alert: self.query_type.eq_ignore_ascii_case(ALERT_QUERY_TYPE),
        })
    }
}

fn parse_time(
    field: &'static str,
    value: &str,
) -> Result<chrono::DateTime<chrono::Utc>, QueryRequestError> {
    parse_rfc3339(value).map_err(|e| QueryRequestError::InvalidTime {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
