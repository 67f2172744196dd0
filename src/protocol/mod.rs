//! Protocol Module
//!
//! Line-oriented text protocol: one command per line, one reply per line.
//!
//! # Commands
//! - `GET <key>` - `OK: <value>` or `NULL`
//! - `SET <key> <value>` - `OK`
//! - `DEL <key>` - `OK` or `NULL`
//! - `PING` - `PONG`
//! - `INFO` - `Cache size: <size>/<capacity>`
//! - `STATS` - `OK: <json statistics>`
//! - `QUIT` - `BYE`, then the server closes the connection
//!
//! Anything else is answered with `ERROR: invalid command`.

pub mod command;
pub mod dispatcher;
pub mod reply;

pub use command::{Command, ProtocolError};
pub use dispatcher::{apply, Dispatcher};
pub use reply::Reply;
