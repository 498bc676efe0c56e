//! Error types for the SwapFlow session engine.

use thiserror::Error;

/// A shared error type for the SwapFlow crates.
///
/// Covers the typed failures of the engine: configuration and file
/// problems, malformed stored data, and step-range violations. The
/// session stack itself reports through `anyhow`; lookup misses are
/// `None`, not errors.
#[derive(Error, Debug, Clone)]
pub enum SwapflowError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Step number outside the workflow's step range
    #[error("Invalid step {step}: steps run from 1 to {max}")]
    InvalidStep { step: u8, max: u8 },
}

impl SwapflowError {
    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an InvalidStep error
    pub fn invalid_step(step: u8, max: u8) -> Self {
        Self::InvalidStep { step, max }
    }

    /// Check if this is an InvalidStep error
    pub fn is_invalid_step(&self) -> bool {
        matches!(self, Self::InvalidStep { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SwapflowError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<toml::de::Error> for SwapflowError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for SwapflowError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, SwapflowError>`.
pub type Result<T> = std::result::Result<T, SwapflowError>;
