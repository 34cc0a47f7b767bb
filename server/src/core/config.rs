use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::cassandra::parse_consistency;
use crate::domain::frames::{EmptySeriesPolicy, FrameOptions};
use crate::utils::path::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_CONSISTENCY, DEFAULT_DATASOURCE_ID, DEFAULT_HOST,
    DEFAULT_PORT,
};

// =============================================================================
// File Config Structs (all optional for partial configs)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Frame assembly section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FramesFileConfig {
    pub empty_series: Option<EmptySeriesPolicy>,
    pub alias_fallback_to_id: Option<bool>,
}

/// TLS options of a datasource.
///
/// Either file paths or inline PEM content is used, selected by
/// `use_cert_content`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
    pub ca_path: Option<String>,
    pub use_cert_content: bool,
    pub cert_content: Option<String>,
    pub key_content: Option<String>,
    pub ca_content: Option<String>,
    pub allow_insecure: bool,
}

/// One entry of the `datasources` section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatasourceFileConfig {
    pub hosts: Option<Vec<String>>,
    pub keyspace: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub consistency: Option<String>,
    pub timeout: Option<u64>,
    pub tls: Option<TlsConfig>,
}

impl DatasourceFileConfig {
    /// Merge another entry into this one (other takes precedence)
    fn merge(&mut self, id: &str, other: DatasourceFileConfig) {
        if other.hosts.is_some() {
            tracing::trace!(datasource = %id, hosts = ?other.hosts, "Merging datasource hosts");
            self.hosts = other.hosts;
        }
        if other.keyspace.is_some() {
            tracing::trace!(datasource = %id, keyspace = ?other.keyspace, "Merging datasource keyspace");
            self.keyspace = other.keyspace;
        }
        if other.user.is_some() {
            self.user = other.user;
        }
        if other.password.is_some() {
            self.password = other.password;
        }
        if other.consistency.is_some() {
            tracing::trace!(datasource = %id, consistency = ?other.consistency, "Merging datasource consistency");
            self.consistency = other.consistency;
        }
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
        if other.tls.is_some() {
            tracing::trace!(datasource = %id, "Merging datasource tls");
            self.tls = other.tls;
        }
    }
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub frames: Option<FramesFileConfig>,
    pub datasources: Option<HashMap<String, DatasourceFileConfig>>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(frames) = other.frames {
            let current = self.frames.get_or_insert_with(FramesFileConfig::default);
            if frames.empty_series.is_some() {
                tracing::trace!(empty_series = ?frames.empty_series, "Merging frames.empty_series");
                current.empty_series = frames.empty_series;
            }
            if frames.alias_fallback_to_id.is_some() {
                tracing::trace!(
                    alias_fallback_to_id = ?frames.alias_fallback_to_id,
                    "Merging frames.alias_fallback_to_id"
                );
                current.alias_fallback_to_id = frames.alias_fallback_to_id;
            }
        }

        if let Some(datasources) = other.datasources {
            let current = self.datasources.get_or_insert_with(HashMap::new);
            for (id, entry) in datasources {
                current.entry(id.clone()).or_default().merge(&id, entry);
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Connection settings of one datasource
#[derive(Clone, Default, PartialEq)]
pub struct DatasourceConfig {
    pub hosts: Vec<String>,
    pub keyspace: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub consistency: String,
    /// Request and connect timeout in seconds
    pub timeout: Option<u64>,
    pub tls: Option<TlsConfig>,
}

impl fmt::Debug for DatasourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasourceConfig")
            .field("hosts", &self.hosts)
            .field("keyspace", &self.keyspace)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("consistency", &self.consistency)
            .field("timeout", &self.timeout)
            .field("tls", &self.tls.is_some())
            .finish()
    }
}

impl From<DatasourceFileConfig> for DatasourceConfig {
    fn from(file: DatasourceFileConfig) -> Self {
        Self {
            hosts: file.hosts.unwrap_or_default(),
            keyspace: file.keyspace,
            user: file.user,
            password: file.password,
            consistency: file
                .consistency
                .unwrap_or_else(|| DEFAULT_CONSISTENCY.to_string()),
            timeout: file.timeout,
            tls: file.tls,
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub frames: FrameOptions,
    pub datasources: BTreeMap<String, DatasourceConfig>,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.cassandra-datasource/cassandra-datasource.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_layers(file_config, cli);
        config.validate()?;
        tracing::debug!(datasources = config.datasources.len(), "Configuration loaded");
        Ok(config)
    }

    /// Layer defaults, merged file config and CLI/env overrides
    fn from_layers(file_config: FileConfig, cli: &CliConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_frames = file_config.frames.unwrap_or_default();

        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        };

        let frames = FrameOptions {
            empty_series: cli
                .empty_series
                .or(file_frames.empty_series)
                .unwrap_or_default(),
            alias_fallback_to_id: cli
                .alias_fallback_to_id
                .or(file_frames.alias_fallback_to_id)
                .unwrap_or(false),
        };

        let mut file_datasources = file_config.datasources.unwrap_or_default();
        if let Some(overrides) = cli_datasource(cli) {
            file_datasources
                .entry(DEFAULT_DATASOURCE_ID.to_string())
                .or_default()
                .merge(DEFAULT_DATASOURCE_ID, overrides);
        }

        let datasources = file_datasources
            .into_iter()
            .map(|(id, entry)| (id, DatasourceConfig::from(entry)))
            .collect();

        Self {
            server,
            frames,
            datasources,
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        for (id, ds) in &self.datasources {
            if ds.hosts.is_empty() || ds.hosts.iter().any(|h| h.trim().is_empty()) {
                anyhow::bail!(
                    "Configuration error: datasources.{}.hosts must list at least one non-empty host",
                    id
                );
            }
            parse_consistency(&ds.consistency)
                .with_context(|| format!("Configuration error: datasources.{}.consistency", id))?;
            if let Some(ref tls) = ds.tls
                && tls.use_cert_content
                && tls.cert_content.is_some() != tls.key_content.is_some()
            {
                anyhow::bail!(
                    "Configuration error: datasources.{}.tls needs both cert_content and key_content",
                    id
                );
            }
        }

        Ok(())
    }
}

/// Default datasource entry from CLI flags / env vars, if any were given
fn cli_datasource(cli: &CliConfig) -> Option<DatasourceFileConfig> {
    let entry = DatasourceFileConfig {
        hosts: cli.hosts.as_deref().map(split_hosts),
        keyspace: cli.keyspace.clone(),
        user: cli.user.clone(),
        password: cli.password.clone(),
        consistency: cli.consistency.clone(),
        timeout: cli.timeout,
        tls: None,
    };
    let any_set = entry.hosts.is_some()
        || entry.keyspace.is_some()
        || entry.user.is_some()
        || entry.password.is_some()
        || entry.consistency.is_some()
        || entry.timeout.is_some();
    any_set.then_some(entry)
}

/// Split a contact point list on `;` or `,`
fn split_hosts(s: &str) -> Vec<String> {
    s.split([';', ','])
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect()
}

/// Get the profile config path (~/.cassandra-datasource/cassandra-datasource.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}
