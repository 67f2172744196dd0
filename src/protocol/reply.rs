//! Reply Formatting
//!
//! Defines the response lines sent back to clients.

use std::fmt;

use super::ProtocolError;

// == Reply ==
/// One response line, rendered without its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `OK`
    Ok,
    /// `OK: <value>`
    Value(String),
    /// `NULL` for an absent key
    Null,
    /// `PONG`
    Pong,
    /// `Cache size: <size>/<capacity>`
    Info { size: usize, capacity: usize },
    /// `BYE`, after which the connection closes
    Bye,
    /// `ERROR: invalid command`
    Error(ProtocolError),
}

impl Reply {
    /// Returns true if the connection should close after this reply.
    pub fn closes_connection(&self) -> bool {
        matches!(self, Reply::Bye)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => f.write_str("OK"),
            Reply::Value(value) => write!(f, "OK: {value}"),
            Reply::Null => f.write_str("NULL"),
            Reply::Pong => f.write_str("PONG"),
            Reply::Info { size, capacity } => write!(f, "Cache size: {size}/{capacity}"),
            Reply::Bye => f.write_str("BYE"),
            Reply::Error(_) => f.write_str("ERROR: invalid command"),
        }
    }
}

impl From<ProtocolError> for Reply {
    fn from(err: ProtocolError) -> Self {
        Reply::Error(err)
    }
}
