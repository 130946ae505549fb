//! Error types and handling for the weather fusion library

use thiserror::Error;

/// Main error type for `AccessiWeather` fusion
#[derive(Error, Debug)]
pub enum FusionError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Caller contract violations (empty record set, duplicate sources)
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// JSON (de)serialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl FusionError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            FusionError::Config { message } => {
                format!("Configuration error: {message}. Please check your source priority settings.")
            }
            FusionError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            FusionError::Serialization { .. } => {
                "Weather data could not be read. The file may be malformed.".to_string()
            }
            FusionError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
