//! Connection Handler
//!
//! Per-client loop: read one line, dispatch it, write one reply, repeat.

use std::io;
use std::net::SocketAddr;

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::ServerSettings;
use crate::error::ServerError;
use crate::protocol::{Dispatcher, ProtocolError, Reply};

/// Bytes reserved up front for the line buffer.
const LINE_BUFFER_RESERVE: usize = 4096;

/// Outcome of reading one line from the client.
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    /// A complete line is in the buffer
    Line,
    /// The line did not fit and was discarded up to its newline
    TooLong,
    /// Client closed the stream
    Eof,
}

/// Serves one client until it disconnects, sends `QUIT`, idles out, or fails.
///
/// Errors are local to this connection; the cache is only touched through
/// the dispatcher, one locked operation per line.
pub async fn handle_connection<S>(
    stream: S,
    peer: SocketAddr,
    dispatcher: Dispatcher,
    settings: ServerSettings,
) -> Result<(), ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut line = Vec::with_capacity(settings.max_line_length.min(LINE_BUFFER_RESERVE));

    loop {
        let read = read_frame(&mut reader, &mut line, settings.max_line_length);
        let frame = match settings.idle_timeout {
            Some(limit) => match timeout(limit, read).await {
                Ok(frame) => frame?,
                Err(_) => {
                    info!("Closing idle connection {}", peer);
                    return Ok(());
                }
            },
            None => read.await?,
        };

        let reply = match frame {
            Frame::Eof => break,
            Frame::TooLong => {
                warn!(
                    "Discarded line from {} longer than {} bytes",
                    peer, settings.max_line_length
                );
                Reply::Error(ProtocolError::LineTooLong(settings.max_line_length))
            }
            Frame::Line => match std::str::from_utf8(&line) {
                Ok(text) => {
                    debug!("Received from {}: {}", peer, text.trim_end());
                    dispatcher.dispatch(text).await
                }
                Err(_) => Reply::Error(ProtocolError::InvalidUtf8),
            },
        };

        let response = format!("{reply}\n");
        writer.write_all(response.as_bytes()).await?;
        writer.flush().await?;

        if reply.closes_connection() {
            debug!("Client {} requested disconnect", peer);
            break;
        }
    }

    Ok(())
}

/// Reads one newline-terminated line of at most `max_len` bytes into `buf`.
///
/// A trailing line without a newline before end-of-stream counts as a line
/// and is measured as if the newline were present, so it must be shorter
/// than `max_len` to be accepted.
async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>, max_len: usize) -> io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let read = (&mut *reader)
        .take(max_len as u64)
        .read_until(b'\n', buf)
        .await?;

    if read == 0 {
        return Ok(Frame::Eof);
    }
    if buf.last() == Some(&b'\n') || read < max_len {
        return Ok(Frame::Line);
    }

    discard_line(reader).await?;
    Ok(Frame::TooLong)
}

/// Skips input up to and including the next newline.
async fn discard_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (consumed, done) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), false),
            }
        };

        reader.consume(consumed);
        if done {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::cache::SharedCache;

    fn peer() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 50000))
    }

    fn dispatcher(capacity: usize) -> Dispatcher {
        Dispatcher::new(SharedCache::with_capacity(capacity).unwrap())
    }

    #[tokio::test]
    async fn test_ping_then_eof() {
        let stream = tokio_test::io::Builder::new()
            .read(b"PING\n")
            .write(b"PONG\n")
            .build();

        let result =
            handle_connection(stream, peer(), dispatcher(4), ServerSettings::default()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_set_get_over_one_connection() {
        let stream = tokio_test::io::Builder::new()
            .read(b"SET user:1 Alice Smith\n")
            .write(b"OK\n")
            .read(b"GET user:1\r\n")
            .write(b"OK: Alice Smith\n")
            .read(b"GET nonexistent\n")
            .write(b"NULL\n")
            .build();

        handle_connection(stream, peer(), dispatcher(4), ServerSettings::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_pipelined_commands_in_one_read() {
        let stream = tokio_test::io::Builder::new()
            .read(b"SET a 1\nGET a\nINFO\n")
            .write(b"OK\n")
            .write(b"OK: 1\n")
            .write(b"Cache size: 1/4\n")
            .build();

        handle_connection(stream, peer(), dispatcher(4), ServerSettings::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_quit_closes_connection() {
        // Anything after QUIT is never read
        let stream = tokio_test::io::Builder::new()
            .read(b"QUIT\n")
            .write(b"BYE\n")
            .build();

        handle_connection(stream, peer(), dispatcher(4), ServerSettings::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_final_line_without_newline() {
        let stream = tokio_test::io::Builder::new()
            .read(b"PING")
            .write(b"PONG\n")
            .build();

        handle_connection(stream, peer(), dispatcher(4), ServerSettings::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_commands_keep_connection_open() {
        let stream = tokio_test::io::Builder::new()
            .read(b"FOO bar\n")
            .write(b"ERROR: invalid command\n")
            .read(b"\n")
            .write(b"ERROR: invalid command\n")
            .read(b"\xff\xfe\n")
            .write(b"ERROR: invalid command\n")
            .read(b"PING\n")
            .write(b"PONG\n")
            .build();

        handle_connection(stream, peer(), dispatcher(4), ServerSettings::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_line_too_long_is_discarded() {
        let settings = ServerSettings {
            max_line_length: 16,
            ..ServerSettings::default()
        };
        let long_line = format!("SET big {}\n", "x".repeat(64));
        let stream = tokio_test::io::Builder::new()
            .read(long_line.as_bytes())
            .write(b"ERROR: invalid command\n")
            .read(b"GET big\n")
            .write(b"NULL\n")
            .build();

        let d = dispatcher(4);
        handle_connection(stream, peer(), d.clone(), settings)
            .await
            .unwrap();
        assert_eq!(d.cache().size().await, 0);
    }

    fn sixteen_byte_limit() -> ServerSettings {
        ServerSettings {
            max_line_length: 16,
            ..ServerSettings::default()
        }
    }

    #[tokio::test]
    async fn test_line_length_limit_counts_newline() {
        // 15 bytes + newline fits, 16 bytes + newline does not
        let stream = tokio_test::io::Builder::new()
            .read(b"SET k 123456789\n")
            .write(b"OK\n")
            .read(b"SET k 1234567890\n")
            .write(b"ERROR: invalid command\n")
            .read(b"GET k\n")
            .write(b"OK: 123456789\n")
            .build();

        handle_connection(stream, peer(), dispatcher(4), sixteen_byte_limit())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unterminated_final_line_at_limit_is_rejected() {
        let stream = tokio_test::io::Builder::new()
            .read(b"SET k 123456789X")
            .write(b"ERROR: invalid command\n")
            .build();

        let d = dispatcher(4);
        handle_connection(stream, peer(), d.clone(), sixteen_byte_limit())
            .await
            .unwrap();
        assert_eq!(d.cache().size().await, 0);
    }

    #[tokio::test]
    async fn test_unterminated_final_line_under_limit_is_dispatched() {
        let stream = tokio_test::io::Builder::new()
            .read(b"SET k 123456789")
            .write(b"OK\n")
            .build();

        let d = dispatcher(4);
        handle_connection(stream, peer(), d.clone(), sixteen_byte_limit())
            .await
            .unwrap();
        assert_eq!(d.cache().get("k").await, Some("123456789".to_string()));
    }

    #[tokio::test]
    async fn test_read_error_ends_connection() {
        let stream = tokio_test::io::Builder::new()
            .read(b"PING\n")
            .write(b"PONG\n")
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();

        let d = dispatcher(4);
        d.cache().set("kept".to_string(), "1".to_string()).await;

        let result = handle_connection(stream, peer(), d.clone(), ServerSettings::default()).await;

        assert!(matches!(result, Err(ServerError::Io(_))));
        assert_eq!(d.cache().get("kept").await, Some("1".to_string()));
    }

    #[tokio::test]
    async fn test_idle_timeout_closes_connection() {
        let settings = ServerSettings {
            idle_timeout: Some(Duration::from_millis(50)),
            ..ServerSettings::default()
        };
        let (client, server) = tokio::io::duplex(256);

        let handle = tokio::spawn(handle_connection(server, peer(), dispatcher(4), settings));

        let result = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(result.is_ok(), "idle connection should have been closed");
        assert!(result.unwrap().unwrap().is_ok());
        drop(client);
    }

    #[tokio::test]
    async fn test_duplex_round_trip() {
        let (client, server) = tokio::io::duplex(1024);
        let handle = tokio::spawn(handle_connection(
            server,
            peer(),
            dispatcher(2),
            ServerSettings::default(),
        ));

        let (client_read, mut client_write) = tokio::io::split(client);
        let mut lines = BufReader::new(client_read).lines();

        client_write.write_all(b"SET a 1\nSET b 2\nGET a\nSET c 3\nGET b\n").await.unwrap();
        let mut replies = Vec::new();
        for _ in 0..5 {
            replies.push(lines.next_line().await.unwrap().unwrap());
        }
        assert_eq!(replies, vec!["OK", "OK", "OK: 1", "OK", "NULL"]);

        drop(client_write);
        drop(lines);
        handle.await.unwrap().unwrap();
    }
}
