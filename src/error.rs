// src/error.rs

//! Unified error handling for the reconciliation engine.

use std::fmt;

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Suppression store read/append failed
    #[error("Store error for {category}: {message}")]
    Store { category: String, message: String },

    /// Alert delivery failed
    #[error("Alert dispatch error: {0}")]
    Alert(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a store error with the affected category.
    pub fn store(category: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Store {
            category: category.into(),
            message: message.to_string(),
        }
    }

    /// Create an alert dispatch error.
    pub fn alert(message: impl fmt::Display) -> Self {
        Self::Alert(message.to_string())
    }
}

/// Reasons a captured line could not be turned into a listing record.
///
/// These never abort a batch; the offending line is skipped and counted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseError {
    /// The `" - SKU: "` delimiter is absent.
    #[error("missing ' - SKU: ' marker")]
    MissingCodeMarker,

    /// No `" - "` delimiter closes the code field.
    #[error("code field is not terminated by ' - '")]
    MalformedCodeField,

    /// The `" - Item: "` delimiter is absent.
    #[error("missing ' - Item: ' marker")]
    MissingItemMarker,
}

/// Non-fatal findings about a parsed record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordWarning {
    /// The platform item id is not exactly 12 digits.
    #[error("item id '{item_id}' is not a 12-digit number")]
    ItemIdFormatMismatch { item_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = AppError::store("active", "disk full");
        assert_eq!(err.to_string(), "Store error for active: disk full");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn test_warning_mentions_item_id() {
        let warning = RecordWarning::ItemIdFormatMismatch {
            item_id: "12345".into(),
        };
        assert!(warning.to_string().contains("12345"));
    }
}
