//! API server initialization

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;

use super::middleware;
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{datasources, health};
use crate::core::CoreApp;
use crate::core::constants::API_PREFIX;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Build the full router
    pub fn router(app: &CoreApp) -> Router {
        let datasource_routes = datasources::routes(app.registry.clone());
        let health_routes = Router::new()
            .route("/", get(health::health))
            .with_state(app.registry.clone());

        Router::new()
            .route("/api/openapi.json", get(openapi_json))
            .route("/api/docs", get(swagger_ui_html))
            .nest(&format!("{}/health", API_PREFIX), health_routes)
            .nest(&format!("{}/datasources", API_PREFIX), datasource_routes)
            .fallback(middleware::handle_404)
            .layer(middleware::trace())
            .layer(middleware::cors())
    }

    /// Serve until shutdown is triggered. Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let app = self.app;
        let shutdown = app.shutdown.clone();

        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);
        let router = Self::router(&app);

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(address = %addr, "Listening");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}
