// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Cassandra Datasource";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".cassandra-datasource";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "cassandra-datasource.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "CASSANDRA_DS_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "CASSANDRA_DS_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "CASSANDRA_DS_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "CASSANDRA_DS_LOG";

// =============================================================================
// Environment Variables - Frames
// =============================================================================

/// Environment variable for the empty series policy (`skip` or `empty_frame`)
pub const ENV_EMPTY_SERIES: &str = "CASSANDRA_DS_EMPTY_SERIES";

/// Environment variable to use the series id as legend when no alias is set
pub const ENV_ALIAS_FALLBACK_TO_ID: &str = "CASSANDRA_DS_ALIAS_FALLBACK_TO_ID";

// =============================================================================
// Environment Variables - Default Datasource
// =============================================================================

/// Contact points of the default datasource, separated by `;` or `,`
pub const ENV_HOSTS: &str = "CASSANDRA_DS_HOSTS";

pub const ENV_KEYSPACE: &str = "CASSANDRA_DS_KEYSPACE";

pub const ENV_USER: &str = "CASSANDRA_DS_USER";

pub const ENV_PASSWORD: &str = "CASSANDRA_DS_PASSWORD";

pub const ENV_CONSISTENCY: &str = "CASSANDRA_DS_CONSISTENCY";

/// Request timeout of the default datasource in seconds
pub const ENV_TIMEOUT: &str = "CASSANDRA_DS_TIMEOUT";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

/// Default log filter when neither ENV_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "info,cassandra_datasource=info";

/// API route prefix
pub const API_PREFIX: &str = "/api/v1";

/// Seconds to wait for background tasks during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Datasource Defaults
// =============================================================================

/// Id of the datasource defined through CLI flags / env vars
pub const DEFAULT_DATASOURCE_ID: &str = "default";

/// Consistency level when none is configured
pub const DEFAULT_CONSISTENCY: &str = "ONE";

/// Health check message on success
pub const HEALTH_OK_MESSAGE: &str = "Connected";

/// Health check message on failure; details go to the log
pub const HEALTH_ERROR_MESSAGE: &str = "Error, check server logs for more details";
