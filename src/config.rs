//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Interface to bind
    pub host: String,
    /// TCP port to listen on
    pub port: u16,
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Longest accepted command line in bytes, newline included
    pub max_line_length: usize,
    /// Maximum number of concurrently served connections
    pub max_connections: usize,
    /// Seconds a connection may stay idle before it is closed (0 = never)
    pub idle_timeout: u64,
    /// Seconds between statistics log lines (0 = disabled)
    pub stats_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_HOST` - Bind address (default: 127.0.0.1)
    /// - `SERVER_PORT` - TCP port (default: 6379)
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 100)
    /// - `MAX_LINE_LENGTH` - Longest command line in bytes (default: 1024)
    /// - `MAX_CONNECTIONS` - Concurrent connection limit (default: 1024)
    /// - `IDLE_TIMEOUT` - Idle connection timeout in seconds (default: 0, disabled)
    /// - `STATS_INTERVAL` - Stats logging interval in seconds (default: 0, disabled)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            host: lookup("SERVER_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "SERVER_PORT", defaults.port)?,
            capacity: parse_var(&lookup, "CACHE_CAPACITY", defaults.capacity)?,
            max_line_length: parse_var(&lookup, "MAX_LINE_LENGTH", defaults.max_line_length)?,
            max_connections: parse_var(&lookup, "MAX_CONNECTIONS", defaults.max_connections)?,
            idle_timeout: parse_var(&lookup, "IDLE_TIMEOUT", defaults.idle_timeout)?,
            stats_interval: parse_var(&lookup, "STATS_INTERVAL", defaults.stats_interval)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::MustBePositive {
                name: "CACHE_CAPACITY",
            });
        }
        if self.max_line_length == 0 {
            return Err(ConfigError::MustBePositive {
                name: "MAX_LINE_LENGTH",
            });
        }
        if self.max_connections == 0 {
            return Err(ConfigError::MustBePositive {
                name: "MAX_CONNECTIONS",
            });
        }
        Ok(())
    }

    /// Returns the `host:port` string to bind.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout > 0).then(|| Duration::from_secs(self.idle_timeout))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            capacity: 100,
            max_line_length: 1024,
            max_connections: 1024,
            idle_timeout: 0,
            stats_interval: 0,
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}
