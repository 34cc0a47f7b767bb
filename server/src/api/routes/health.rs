//! Service liveness endpoint

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::DatasourceRegistry;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Configured datasource ids
    pub datasources: Vec<String>,
}

/// Health check endpoint
///
/// Reports the service only; use the datasource health endpoint to test a
/// cluster connection.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(registry): State<Arc<DatasourceRegistry>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        datasources: registry.ids().map(str::to_string).collect(),
    })
}
