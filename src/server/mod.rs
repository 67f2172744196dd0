//! Server Module
//!
//! TCP listener and per-connection handling for the line protocol.

pub mod connection;
pub mod listener;

use std::time::Duration;

use crate::config::Config;

pub use connection::handle_connection;
pub use listener::serve;

/// Network limits applied to every connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Longest accepted command line in bytes, newline included
    pub max_line_length: usize,
    /// Close a connection after this long without input
    pub idle_timeout: Option<Duration>,
    /// Maximum number of connections served at once
    pub max_connections: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ServerSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_line_length: config.max_line_length,
            idle_timeout: config.idle_timeout(),
            max_connections: config.max_connections,
        }
    }
}
