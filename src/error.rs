//! Error types for the Catalogop CLI

use std::fmt;

use thiserror::Error;

/// Result type alias for Catalogop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Errors reported by the remote catalog service or the transport.
///
/// Read failures are stored on cache entries and handed to every consumer
/// awaiting the same request, so the type is `Clone`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the service answered at all.
    #[allow(dead_code)]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound(_) => Some(404),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(_) | ApiError::InvalidResponse(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// A single violated form constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Client-side form validation failure. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid product form: {}", join_fields(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError::new(field, message)],
        }
    }

    /// Message for a given field, if that field failed
    #[allow(dead_code)]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.message.as_str())
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_network() {
        let err = ApiError::Network("Connection refused".to_string());
        assert!(err.to_string().contains("Connection refused"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_api_error_not_found() {
        let err = ApiError::NotFound("Product 42".to_string());
        assert!(err.to_string().contains("Product 42"));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_api_error_status() {
        let err = ApiError::Status {
            status: 503,
            message: "Service unavailable".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("Service unavailable"));
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_api_error_invalid_response() {
        let err = ApiError::InvalidResponse("missing field `total`".to_string());
        assert!(err.to_string().contains("total"));
    }

    #[test]
    fn test_validation_error_lists_every_field() {
        let err = ValidationError {
            fields: vec![
                FieldError::new("title", "Title is required"),
                FieldError::new("price", "Price must be positive"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("title: Title is required"));
        assert!(msg.contains("price: Price must be positive"));
        assert_eq!(err.message_for("price"), Some("Price must be positive"));
        assert_eq!(err.message_for("stock"), None);
    }

    #[test]
    fn test_config_error_parse() {
        let err = ConfigError::ParseError("unexpected key".to_string());
        assert!(err.to_string().contains("unexpected key"));
    }

    #[test]
    fn test_error_from_api_error() {
        let err: Error = ApiError::Network("down".to_string()).into();

        match err {
            Error::Api(ApiError::Network(_)) => (),
            _ => panic!("Expected Error::Api(ApiError::Network)"),
        }
    }

    #[test]
    fn test_error_from_validation_error() {
        let err: Error = ValidationError::single("stock", "Stock must be positive").into();

        match err {
            Error::Validation(v) => assert_eq!(v.fields.len(), 1),
            _ => panic!("Expected Error::Validation"),
        }
    }

    #[test]
    fn test_config_error_from_yaml_error() {
        let yaml_str = "invalid: [yaml: content";
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let config_err: ConfigError = yaml_err.into();

        match config_err {
            ConfigError::ParseError(_) => (),
            _ => panic!("Expected ConfigError::ParseError"),
        }
    }
}
