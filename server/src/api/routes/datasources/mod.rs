//! Datasource API endpoints
//!
//! - POST /api/v1/datasources/{id}/query - Run a batch of data queries
//! - GET /api/v1/datasources/{id}/health - Check the datasource connection
//! - GET /api/v1/datasources/{id}/keyspaces - List keyspaces
//! - GET /api/v1/datasources/{id}/tables?keyspace= - List tables of a keyspace
//! - GET /api/v1/datasources/{id}/columns?keyspace=&table=&needType= - List columns
//! - GET /api/v1/datasources/{id}/variables?query= - Template variable options

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::future::join_all;
use serde_json::Value;

use crate::api::extractors::{DatasourcePath, ValidatedJson, ValidatedQuery};
use crate::api::types::ApiError;
use crate::core::constants::{HEALTH_ERROR_MESSAGE, HEALTH_OK_MESSAGE};
use crate::domain::query::DataQuery;
use crate::domain::{DatasourceRegistry, Plugin, RegistryError, Variable};

use types::{
    CheckHealthResponse, ColumnsQuery, DataResponse, HealthStatus, QueryDataRequest,
    QueryDataResponse, TablesQuery, VariablesQuery,
};

/// Shared state for datasource endpoints
#[derive(Clone)]
pub struct DatasourcesState {
    pub registry: Arc<DatasourceRegistry>,
}

/// Build datasource routes
pub fn routes(registry: Arc<DatasourceRegistry>) -> Router<()> {
    let state = DatasourcesState { registry };

    Router::new()
        .route("/{id}/query", post(query_data))
        .route("/{id}/health", get(check_health))
        .route("/{id}/keyspaces", get(list_keyspaces))
        .route("/{id}/tables", get(list_tables))
        .route("/{id}/columns", get(list_columns))
        .route("/{id}/variables", get(list_variables))
        .with_state(state)
}

/// Run a batch of data queries
///
/// Queries run concurrently. A failing query reports its error under its
/// refId while the others still return frames.
#[utoipa::path(
    post,
    path = "/api/v1/datasources/{id}/query",
    tag = "datasources",
    params(("id" = String, Path, description = "Datasource id")),
    request_body = QueryDataRequest,
    responses(
        (status = 200, description = "Per-query results keyed by refId", body = QueryDataResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Unknown datasource"),
        (status = 502, description = "Datasource connection failed")
    )
)]
pub async fn query_data(
    State(state): State<DatasourcesState>,
    path: DatasourcePath,
    ValidatedJson(body): ValidatedJson<QueryDataRequest>,
) -> Result<Json<QueryDataResponse>, ApiError> {
    let plugin = state
        .registry
        .get_or_create(&path.id)
        .await
        .map_err(ApiError::from_registry)?;

    tracing::debug!(datasource = %path.id, count = body.queries.len(), "Processing data queries");
    let results = join_all(
        body.queries
            .into_iter()
            .enumerate()
            .map(|(index, raw)| run_query(&plugin, index, raw)),
    )
    .await;

    Ok(Json(QueryDataResponse {
        results: results.into_iter().collect(),
    }))
}

async fn run_query(plugin: &Plugin, index: usize, raw: Value) -> (String, DataResponse) {
    let ref_id = raw
        .get("refId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| index.to_string());

    let query = match DataQuery::from_value(raw).and_then(DataQuery::into_query) {
        Ok(query) => query,
        Err(e) => {
            tracing::warn!(ref_id = %ref_id, error = %e, "Failed to parse query");
            return (ref_id, DataResponse::error(e.to_string()));
        }
    };

    match plugin.exec_query(&query).await {
        Ok(frames) => (ref_id, DataResponse::frames(frames)),
        Err(e) => {
            tracing::error!(ref_id = %ref_id, error = %e, "Failed to execute query");
            (ref_id, DataResponse::error(e.to_string()))
        }
    }
}

/// Check the datasource connection
#[utoipa::path(
    get,
    path = "/api/v1/datasources/{id}/health",
    tag = "datasources",
    params(("id" = String, Path, description = "Datasource id")),
    responses(
        (status = 200, description = "Health status", body = CheckHealthResponse),
        (status = 404, description = "Unknown datasource")
    )
)]
pub async fn check_health(
    State(state): State<DatasourcesState>,
    path: DatasourcePath,
) -> Result<Json<CheckHealthResponse>, ApiError> {
    let plugin = match state.registry.get_or_create(&path.id).await {
        Ok(plugin) => plugin,
        Err(e @ RegistryError::UnknownDatasource(_)) => return Err(ApiError::from_registry(e)),
        Err(e) => {
            tracing::error!(datasource = %path.id, error = %e, "Failed to get datasource instance");
            return Ok(Json(CheckHealthResponse {
                status: HealthStatus::Unknown,
                message: HEALTH_ERROR_MESSAGE.to_string(),
            }));
        }
    };

    let response = match plugin.check_health().await {
        Ok(()) => CheckHealthResponse {
            status: HealthStatus::Ok,
            message: HEALTH_OK_MESSAGE.to_string(),
        },
        Err(e) => {
            tracing::error!(datasource = %path.id, error = %e, "Failed to connect to server");
            CheckHealthResponse {
                status: HealthStatus::Error,
                message: HEALTH_ERROR_MESSAGE.to_string(),
            }
        }
    };
    Ok(Json(response))
}

/// List keyspaces
#[utoipa::path(
    get,
    path = "/api/v1/datasources/{id}/keyspaces",
    tag = "datasources",
    params(("id" = String, Path, description = "Datasource id")),
    responses(
        (status = 200, description = "Keyspace names", body = Vec<String>),
        (status = 404, description = "Unknown datasource")
    )
)]
pub async fn list_keyspaces(
    State(state): State<DatasourcesState>,
    path: DatasourcePath,
) -> Result<Json<Vec<String>>, ApiError> {
    tracing::debug!(datasource = %path.id, "Process 'keyspaces' request");
    let plugin = state
        .registry
        .get_or_create(&path.id)
        .await
        .map_err(ApiError::from_registry)?;
    let keyspaces = plugin.keyspaces().await.map_err(ApiError::from_plugin)?;
    Ok(Json(keyspaces))
}

/// List tables of a keyspace
#[utoipa::path(
    get,
    path = "/api/v1/datasources/{id}/tables",
    tag = "datasources",
    params(("id" = String, Path, description = "Datasource id"), TablesQuery),
    responses(
        (status = 200, description = "Table names", body = Vec<String>),
        (status = 400, description = "Missing keyspace"),
        (status = 404, description = "Unknown datasource")
    )
)]
pub async fn list_tables(
    State(state): State<DatasourcesState>,
    path: DatasourcePath,
    ValidatedQuery(params): ValidatedQuery<TablesQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    tracing::debug!(datasource = %path.id, keyspace = %params.keyspace, "Process 'tables' request");
    let plugin = state
        .registry
        .get_or_create(&path.id)
        .await
        .map_err(ApiError::from_registry)?;
    let tables = plugin
        .tables(&params.keyspace)
        .await
        .map_err(ApiError::from_plugin)?;
    Ok(Json(tables))
}

/// List columns of a table, optionally filtered by CQL type
#[utoipa::path(
    get,
    path = "/api/v1/datasources/{id}/columns",
    tag = "datasources",
    params(("id" = String, Path, description = "Datasource id"), ColumnsQuery),
    responses(
        (status = 200, description = "Column names", body = Vec<String>),
        (status = 400, description = "Missing keyspace or table"),
        (status = 404, description = "Unknown datasource or table")
    )
)]
pub async fn list_columns(
    State(state): State<DatasourcesState>,
    path: DatasourcePath,
    ValidatedQuery(params): ValidatedQuery<ColumnsQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    tracing::debug!(
        datasource = %path.id,
        keyspace = %params.keyspace,
        table = %params.table,
        need_type = %params.need_type,
        "Process 'columns' request"
    );
    let plugin = state
        .registry
        .get_or_create(&path.id)
        .await
        .map_err(ApiError::from_registry)?;
    let columns = plugin
        .columns(&params.keyspace, &params.table, &params.need_type)
        .await
        .map_err(ApiError::from_plugin)?;
    Ok(Json(columns))
}

/// Run a SELECT and return `{value, label}` options for template variables
#[utoipa::path(
    get,
    path = "/api/v1/datasources/{id}/variables",
    tag = "datasources",
    params(("id" = String, Path, description = "Datasource id"), VariablesQuery),
    responses(
        (status = 200, description = "Variable options", body = Vec<Variable>),
        (status = 400, description = "Missing query"),
        (status = 404, description = "Unknown datasource"),
        (status = 500, description = "Query failed")
    )
)]
pub async fn list_variables(
    State(state): State<DatasourcesState>,
    path: DatasourcePath,
    ValidatedQuery(params): ValidatedQuery<VariablesQuery>,
) -> Result<Json<Vec<Variable>>, ApiError> {
    tracing::debug!(datasource = %path.id, query = %params.query, "Process 'variables' request");
    let plugin = state
        .registry
        .get_or_create(&path.id)
        .await
        .map_err(ApiError::from_registry)?;
    let variables = plugin
        .variables(&params.query)
        .await
        .map_err(ApiError::from_plugin)?;
    Ok(Json(variables))
}
