//! Command Dispatcher
//!
//! Maps each parsed command onto exactly one cache operation and formats the result.

use tracing::{debug, error};

use crate::cache::{LruCache, SharedCache};

use super::{Command, Reply};

// == Dispatcher ==
/// Executes command lines against the shared cache.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    cache: SharedCache,
}

impl Dispatcher {
    pub fn new(cache: SharedCache) -> Self {
        Self { cache }
    }

    /// Returns the cache this dispatcher operates on.
    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    // == Dispatch ==
    /// Parses a line and runs it under a single cache lock.
    ///
    /// A malformed line is answered with an error before the lock is taken,
    /// so it never touches the cache.
    pub async fn dispatch(&self, line: &str) -> Reply {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(err) => {
                debug!("Rejected command {:?}: {}", line, err);
                return Reply::Error(err);
            }
        };

        match command {
            Command::Ping => Reply::Pong,
            Command::Quit => Reply::Bye,
            command => {
                let mut cache = self.cache.lock().await;
                apply(command, &mut cache)
            }
        }
    }
}

// == Apply ==
/// Runs one command against the cache engine.
pub fn apply(command: Command, cache: &mut LruCache) -> Reply {
    match command {
        Command::Get { key } => match cache.get(&key) {
            Some(value) => Reply::Value(value),
            None => Reply::Null,
        },
        Command::Set { key, value } => {
            if let Some(evicted) = cache.set(key, value) {
                debug!("Evicted least recently used key {:?}", evicted);
            }
            Reply::Ok
        }
        Command::Del { key } => {
            if cache.delete(&key) {
                Reply::Ok
            } else {
                Reply::Null
            }
        }
        Command::Info => Reply::Info {
            size: cache.len(),
            capacity: cache.capacity(),
        },
        Command::Stats => match serde_json::to_string(&cache.stats()) {
            Ok(json) => Reply::Value(json),
            Err(err) => {
                error!("Failed to serialize cache stats: {}", err);
                Reply::Null
            }
        },
        Command::Ping => Reply::Pong,
        Command::Quit => Reply::Bye,
    }
}
