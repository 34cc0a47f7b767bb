//! Shared API types
//!
//! Error responses used across all API endpoints.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use validator::ValidationError;

use crate::data::DataError;
use crate::domain::{PluginError, RegistryError};

/// Maximum length of keyspace, table and type names in query parameters
pub const MAX_NAME_LENGTH: usize = 256;

/// Validator function for CQL identifiers passed as query parameters
pub fn validate_name<T: AsRef<str>>(name: T) -> Result<(), ValidationError> {
    let name = name.as_ref();
    if name.trim().is_empty() {
        return Err(ValidationError::new("name_empty").with_message("Name cannot be empty".into()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::new("name_too_long")
            .with_message(format!("Name too long (max {} chars)", MAX_NAME_LENGTH).into()));
    }
    Ok(())
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    NotFound { code: String, message: String },
    BadGateway { message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Datasource lookup failures: unknown id is a 404, a failed connect a 502
    pub fn from_registry(e: RegistryError) -> Self {
        match &e {
            RegistryError::UnknownDatasource(id) => Self::not_found(
                "DATASOURCE_NOT_FOUND",
                format!("Datasource not found: {}", id),
            ),
            RegistryError::Create { .. } => {
                tracing::error!(error = %e, "Failed to get datasource instance");
                Self::BadGateway {
                    message: "Failed to connect to datasource".to_string(),
                }
            }
        }
    }

    pub fn from_plugin(e: PluginError) -> Self {
        if let PluginError::Schema(DataError::NoSuchTable(ref table)) = e {
            return Self::not_found("TABLE_NOT_FOUND", format!("Table not found: {}", table));
        }
        tracing::error!(error = %e, "Datasource error");
        Self::Internal {
            message: "Datasource operation failed".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::BadGateway { message } => (
                StatusCode::BAD_GATEWAY,
                "bad_gateway",
                "DATASOURCE_UNAVAILABLE".to_string(),
                message,
            ),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}
