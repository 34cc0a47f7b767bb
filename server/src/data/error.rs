//! Error type for the data layer
//!
//! Covers the session adapter (connection, statement execution, schema
//! browsing) and row normalization.

use thiserror::Error;

/// Error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// A column carries a value the normalizer cannot convert
    #[error("field {column} has unsupported type {type_name}")]
    UnsupportedType { column: String, type_name: String },

    /// The first selected column cannot serve as a series identifier
    #[error("unsupported type {type_name} for series identifier")]
    MalformedIdentifier { type_name: String },

    /// Statement text does not start with SELECT
    #[error("only SELECT statements are allowed, got: {0}")]
    NotSelect(String),

    /// Table is not present in the keyspace schema
    #[error("no such table: '{0}'")]
    NoSuchTable(String),

    /// Statement execution failed on the cluster
    #[error("query error: {0}")]
    Query(String),

    /// Session could not be established
    #[error("connection error: {0}")]
    Connection(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// TLS material could not be loaded
    #[error("TLS error: {0}")]
    Tls(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Session has been closed
    #[error("session is closed")]
    Closed,
}

impl DataError {
    pub fn unsupported_type(column: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            column: column.into(),
            type_name: type_name.into(),
        }
    }

    pub fn malformed_identifier(type_name: impl Into<String>) -> Self {
        Self::MalformedIdentifier {
            type_name: type_name.into(),
        }
    }

    pub fn query(e: impl std::fmt::Display) -> Self {
        Self::Query(e.to_string())
    }

    pub fn connection(e: impl std::fmt::Display) -> Self {
        Self::Connection(e.to_string())
    }
}

impl From<openssl::error::ErrorStack> for DataError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        Self::Tls(e.to_string())
    }
}
