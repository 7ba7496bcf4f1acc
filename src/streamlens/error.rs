//! Centralized error types for the metadata source.
//!
//! Fatal conditions (configuration problems, an unreachable broker or
//! registry at construction time) surface through [`SourceError`]; everything
//! that merely degrades a run (missing schemas, unavailable admin client)
//! flows through the run report instead and never shows up here.

use thiserror::Error;

/// Main error type for the metadata extraction pipeline
#[derive(Debug, Error)]
pub enum SourceError {
    /// Invalid configuration, raised before any network call is made
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Broker-side failures with enhanced context
    #[error("Kafka operation failed: {message}")]
    Broker {
        #[source]
        source: rdkafka::error::KafkaError,
        message: String,
    },

    /// Schema registry failures (construction-time or transport)
    #[error("Schema registry error: {message}")]
    Registry { message: String },

    /// Attempted to use a source that has already been closed
    #[error("metadata source is closed")]
    Closed,

    /// JSON serialization failures on the output surface
    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),

    /// I/O failures with additional context
    #[error("I/O operation failed: {operation}")]
    Io {
        #[source]
        source: std::io::Error,
        operation: String,
    },
}

impl SourceError {
    /// Helper to create configuration errors
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Helper to create broker errors with context
    pub fn broker(source: rdkafka::error::KafkaError, message: impl Into<String>) -> Self {
        Self::Broker {
            source,
            message: message.into(),
        }
    }

    /// Helper to create registry errors
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }

    /// Helper to create I/O errors with context
    pub fn io(source: std::io::Error, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            operation: operation.into(),
        }
    }

    /// True for errors that abort a run before any snapshot is emitted
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::Broker { .. } | Self::Registry { .. }
        )
    }
}

/// Type alias for Results using SourceError
pub type SourceResult<T> = Result<T, SourceError>;
