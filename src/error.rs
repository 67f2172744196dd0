//! Error types for the key-value server
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised while constructing the cache engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity must be at least one entry
    #[error("Invalid capacity: {0} (must be greater than 0)")]
    InvalidCapacity(usize),
}

// == Config Error Enum ==
/// Errors raised while loading server configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable could not be parsed
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    /// Value parsed but is out of the accepted range
    #[error("{name} must be greater than 0")]
    MustBePositive { name: &'static str },
}

// == Server Error Enum ==
/// Errors that end a single connection or the accept loop.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Socket read/write failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection limiter was closed while waiting for a slot
    #[error("Connection limiter closed")]
    LimiterClosed,
}

// == Result Type Alias ==
/// Convenience Result type for cache engine operations.
pub type Result<T> = std::result::Result<T, CacheError>;
