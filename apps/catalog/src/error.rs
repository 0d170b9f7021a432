//! # Error Types
//!
//! `AppError` for failures inside the app layer, and `ApiError`, the
//! serialisable shape every command returns on failure.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Command Function ─► Result<T, ApiError>                               │
//! │         │                                                               │
//! │         ├── ValidationFailure ──► { code: "VALIDATION_ERROR", ... }    │
//! │         │   (message is the configured failure banner)                  │
//! │         ├── AppError::FileRead ─► { code: "FILE_ERROR", ... }          │
//! │         └── anything else ──────► { code: "INTERNAL", ... }            │
//! │                                                                         │
//! │  Nothing escapes a command as a panic; the driver turns every         │
//! │  ApiError into an `error` line on stdout.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use catalog_core::ValidationFailure;

/// Result type alias for app operations.
pub type AppResult<T> = Result<T, AppError>;

/// Failures inside the app layer.
#[derive(Debug, Error)]
pub enum AppError {
    /// Config file could not be read or parsed.
    #[error("Failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    /// Image file could not be read.
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading commands or writing events failed.
    #[error("Event stream I/O failed: {0}")]
    Stream(#[from] std::io::Error),

    /// An outgoing line could not be encoded.
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Forma nije validna",
///   "fields": ["barcode", "price"]
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Invalid form fields, for validation errors only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Form validation failed
    ValidationError,

    /// Requested item does not exist
    NotFound,

    /// File could not be read
    FileError,

    /// Command payload could not be understood
    BadRequest,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BadRequest, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Builds the validation error shown after a rejected submission,
    /// using the configured banner text.
    pub fn validation(failure: &ValidationFailure, message: impl Into<String>) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: message.into(),
            fields: failure
                .invalid_fields()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::FileRead { path, source } => {
                tracing::warn!(path = %path.display(), error = %source, "File read failed");
                ApiError::new(ErrorCode::FileError, format!("Cannot read {}", path.display()))
            }
            AppError::ConfigLoad { .. } | AppError::Stream(_) | AppError::Encode(_) => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal(err.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{ValidationError, ValidatorName};

    #[test]
    fn test_validation_error_lists_fields() {
        let failure = ValidationFailure {
            errors: vec![ValidationError {
                field: "price".to_string(),
                validator: ValidatorName::Number,
            }],
        };
        let api = ApiError::validation(&failure, "Form is not valid");
        assert_eq!(api.code, ErrorCode::ValidationError);
        assert_eq!(api.fields, vec!["price".to_string()]);

        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "Form is not valid");
    }

    #[test]
    fn test_fields_omitted_when_empty() {
        let json = serde_json::to_value(ApiError::internal("boom")).unwrap();
        assert!(json.get("fields").is_none());
    }

    #[test]
    fn test_file_read_maps_to_file_error() {
        let err = AppError::FileRead {
            path: PathBuf::from("/nope.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let api: ApiError = err.into();
        assert_eq!(api.code, ErrorCode::FileError);
    }
}
