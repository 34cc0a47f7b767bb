//! Datasource API types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::types::validate_name;
use crate::domain::frames::Frame;
use crate::domain::query::DataQuery;

/// Batch of data queries against one datasource
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct QueryDataRequest {
    /// Queries are parsed one by one so a malformed entry only fails its own refId
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 queries per request"))]
    #[schema(value_type = Vec<DataQuery>)]
    pub queries: Vec<serde_json::Value>,
}

/// Result of a single query: frames on success, an error message otherwise
#[derive(Debug, Serialize, ToSchema)]
pub struct DataResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<Vec<Frame>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DataResponse {
    pub fn frames(frames: Vec<Frame>) -> Self {
        Self {
            frames: Some(frames),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            frames: None,
            error: Some(message.into()),
        }
    }
}

/// Responses keyed by refId
#[derive(Debug, Serialize, ToSchema)]
pub struct QueryDataResponse {
    pub results: BTreeMap<String, DataResponse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Ok,
    Error,
    /// The datasource instance could not be created
    Unknown,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckHealthResponse {
    pub status: HealthStatus,
    pub message: String,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TablesQuery {
    #[validate(custom(function = "validate_name"))]
    pub keyspace: String,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ColumnsQuery {
    #[validate(custom(function = "validate_name"))]
    pub keyspace: String,
    #[validate(custom(function = "validate_name"))]
    pub table: String,
    /// CQL type name to filter on; all columns when empty
    #[serde(default, rename = "needType")]
    #[validate(length(max = 256, message = "needType too long (max 256 chars)"))]
    pub need_type: String,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VariablesQuery {
    /// SELECT returning the value column, optionally followed by a label column
    #[validate(length(min = 1, message = "query is required"))]
    pub query: String,
}
