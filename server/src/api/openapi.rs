//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{datasources, health};
use crate::domain::Variable;
use crate::domain::frames::{Field, FieldConfig, FieldType, Frame};
use crate::domain::query::{DataQuery, TimeRange};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cassandra Datasource API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Time-series frames from Cassandra and Scylla tables"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "datasources", description = "Data queries, schema browsing and datasource health")
    ),
    paths(
        health::health,
        datasources::query_data,
        datasources::check_health,
        datasources::list_keyspaces,
        datasources::list_tables,
        datasources::list_columns,
        datasources::list_variables,
    ),
    components(schemas(
        health::HealthResponse,
        // Query payload
        DataQuery,
        TimeRange,
        datasources::types::QueryDataRequest,
        datasources::types::QueryDataResponse,
        datasources::types::DataResponse,
        // Frames
        Frame,
        Field,
        FieldConfig,
        FieldType,
        // Schema browsing
        Variable,
        // Health
        datasources::types::HealthStatus,
        datasources::types::CheckHealthResponse,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Cassandra Datasource API</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({ url: "/api/openapi.json", dom_id: '#swagger-ui' });
        };
    </script>
</body>
</html>"#;
