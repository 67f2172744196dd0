//! Redis Lite - A lightweight in-memory key-value server
//!
//! Serves a line-oriented text protocol over TCP, backed by a fixed-capacity
//! cache with LRU eviction.

pub mod cache;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod tasks;

pub use cache::{LruCache, SharedCache};
pub use config::Config;
pub use protocol::Dispatcher;
pub use server::{serve, ServerSettings};
pub use tasks::spawn_stats_reporter;
