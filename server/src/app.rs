//! Core application

use std::sync::Arc;

use anyhow::Result;

use crate::api::ApiServer;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME, DEFAULT_LOG_FILTER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::domain::{CassandraPluginFactory, DatasourceRegistry, RegistryError};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub registry: Arc<DatasourceRegistry>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::init(&cli_config)?;
        match command {
            Some(Commands::Check { datasource }) => app.check(datasource.as_deref()).await,
            Some(Commands::Start) | None => Self::start_server(app).await,
        }
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let registry = Arc::new(DatasourceRegistry::new(
            config.datasources.clone(),
            config.frames.clone(),
            Arc::new(CassandraPluginFactory),
        ));
        let shutdown = ShutdownService::new(registry.clone());

        Ok(Self {
            shutdown,
            config,
            registry,
        })
    }

    fn init_logging() {
        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        if app.config.datasources.is_empty() {
            tracing::warn!("No datasources configured; queries will return 404");
        }
        tracing::info!(
            "{} v{} on http://{}:{} ({} datasource(s))",
            APP_NAME,
            env!("CARGO_PKG_VERSION"),
            app.config.server.host,
            app.config.server.port,
            app.config.datasources.len()
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    /// Connect to each datasource (or just `only`) and report its health
    async fn check(&self, only: Option<&str>) -> Result<()> {
        let ids: Vec<&str> = match only {
            Some(id) => vec![id],
            None => self.registry.ids().collect(),
        };
        if ids.is_empty() {
            anyhow::bail!("No datasources configured");
        }

        let mut failed = 0;
        for id in &ids {
            let result = match self.registry.get_or_create(id).await {
                Ok(plugin) => plugin.check_health().await.map_err(anyhow::Error::from),
                Err(e @ RegistryError::UnknownDatasource(_)) => return Err(e.into()),
                Err(e) => Err(e.into()),
            };
            match result {
                Ok(()) => println!("{:<24} OK", id),
                Err(e) => {
                    failed += 1;
                    println!("{:<24} ERROR  {:#}", id, e);
                }
            }
        }

        self.shutdown.shutdown().await;

        if failed > 0 {
            anyhow::bail!("{} of {} datasource(s) unhealthy", failed, ids.len());
        }
        Ok(())
    }
}
