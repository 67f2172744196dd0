//! Command Parsing
//!
//! Turns one line of client input into a typed command.
//!
//! Keywords are case-sensitive and tokens are separated by whitespace.
//! For `SET`, everything after the key token is the value, so values may
//! contain spaces.

use thiserror::Error;

// == Protocol Error ==
/// Reasons a line is rejected. Clients only ever see `ERROR: invalid command`;
/// the detail is for the server log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("wrong number of arguments for {0}")]
    WrongArity(&'static str),

    #[error("line exceeds {0} bytes")]
    LineTooLong(usize),

    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

// == Command ==
/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `GET <key>`
    Get { key: String },
    /// `SET <key> <value>`
    Set { key: String, value: String },
    /// `DEL <key>`
    Del { key: String },
    /// `PING`
    Ping,
    /// `INFO`
    Info,
    /// `STATS`
    Stats,
    /// `QUIT`
    Quit,
}

impl Command {
    // == Parse ==
    /// Parses a single command line (without its newline).
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim();
        let (name, rest) = split_token(line);

        match name {
            "" => Err(ProtocolError::Empty),
            "GET" => single_key(rest, "GET").map(|key| Command::Get { key }),
            "DEL" => single_key(rest, "DEL").map(|key| Command::Del { key }),
            "SET" => {
                let (key, value) = split_token(rest);
                if key.is_empty() || value.is_empty() {
                    return Err(ProtocolError::WrongArity("SET"));
                }
                Ok(Command::Set {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
            "PING" => no_args(rest, "PING", Command::Ping),
            "INFO" => no_args(rest, "INFO", Command::Info),
            "STATS" => no_args(rest, "STATS", Command::Stats),
            "QUIT" => no_args(rest, "QUIT", Command::Quit),
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }

    /// Returns the command keyword, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "GET",
            Command::Set { .. } => "SET",
            Command::Del { .. } => "DEL",
            Command::Ping => "PING",
            Command::Info => "INFO",
            Command::Stats => "STATS",
            Command::Quit => "QUIT",
        }
    }
}

/// Splits off the first whitespace-delimited token.
///
/// The remainder has its leading whitespace removed but is otherwise intact.
fn split_token(input: &str) -> (&str, &str) {
    match input.find(char::is_whitespace) {
        Some(pos) => (&input[..pos], input[pos..].trim_start()),
        None => (input, ""),
    }
}

fn single_key(rest: &str, name: &'static str) -> Result<String, ProtocolError> {
    let (key, extra) = split_token(rest);
    if key.is_empty() || !extra.is_empty() {
        return Err(ProtocolError::WrongArity(name));
    }
    Ok(key.to_string())
}

fn no_args(rest: &str, name: &'static str, command: Command) -> Result<Command, ProtocolError> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(ProtocolError::WrongArity(name))
    }
}
