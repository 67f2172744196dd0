//! TCP Listener
//!
//! Accepts clients and spawns one connection task per client.

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use super::{handle_connection, ServerSettings};
use crate::error::ServerError;
use crate::protocol::Dispatcher;

/// Accepts connections until `shutdown` resolves.
///
/// At most `settings.max_connections` clients are served at once; further
/// clients wait in the accept backlog until a slot frees up. Connection
/// tasks already running are left to finish on their own.
pub async fn serve<F>(
    listener: TcpListener,
    dispatcher: Dispatcher,
    settings: ServerSettings,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()>,
{
    let limiter = Arc::new(Semaphore::new(settings.max_connections));
    tokio::pin!(shutdown);

    loop {
        let permit = tokio::select! {
            _ = &mut shutdown => break,
            permit = limiter.clone().acquire_owned() => {
                permit.map_err(|_| ServerError::LimiterClosed)?
            }
        };

        let (stream, peer) = tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(err) => {
                    error!("Error accepting client connection: {}", err);
                    continue;
                }
            },
        };

        info!("Client connected: {}", peer);
        let dispatcher = dispatcher.clone();
        let settings = settings.clone();

        tokio::spawn(async move {
            let _permit = permit;
            match handle_connection(stream, peer, dispatcher, settings).await {
                Ok(()) => info!("Client disconnected: {}", peer),
                Err(err) => warn!("Error handling client {}: {}", peer, err),
            }
        });
    }

    info!("Listener stopped accepting connections");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    use crate::cache::SharedCache;

    async fn start(settings: ServerSettings) -> (std::net::SocketAddr, oneshot::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let dispatcher = Dispatcher::new(SharedCache::with_capacity(8).unwrap());
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(serve(listener, dispatcher, settings, async move {
            let _ = rx.await;
        }));

        (addr, tx)
    }

    async fn send(
        writer: &mut tokio::net::tcp::OwnedWriteHalf,
        lines: &mut tokio::io::Lines<BufReader<tokio::net::tcp::OwnedReadHalf>>,
        command: &str,
    ) -> String {
        writer.write_all(format!("{command}\n").as_bytes()).await.unwrap();
        lines.next_line().await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_serve_answers_ping() {
        let (addr, _shutdown) = start(ServerSettings::default()).await;

        let (read, mut write) = TcpStream::connect(addr).await.unwrap().into_split();
        let mut lines = BufReader::new(read).lines();

        assert_eq!(send(&mut write, &mut lines, "PING").await, "PONG");
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dispatcher = Dispatcher::new(SharedCache::with_capacity(8).unwrap());
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(serve(
            listener,
            dispatcher,
            ServerSettings::default(),
            async move {
                let _ = rx.await;
            },
        ));

        tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(result.unwrap().unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_serve_limits_concurrent_connections() {
        let settings = ServerSettings {
            max_connections: 1,
            ..ServerSettings::default()
        };
        let (addr, _shutdown) = start(settings).await;

        let (read1, mut write1) = TcpStream::connect(addr).await.unwrap().into_split();
        let mut lines1 = BufReader::new(read1).lines();
        assert_eq!(send(&mut write1, &mut lines1, "PING").await, "PONG");

        // Second client sits in the backlog while the first holds the only slot
        let (read2, mut write2) = TcpStream::connect(addr).await.unwrap().into_split();
        let mut lines2 = BufReader::new(read2).lines();
        write2.write_all(b"PING\n").await.unwrap();
        let waiting = tokio::time::timeout(Duration::from_millis(200), lines2.next_line()).await;
        assert!(waiting.is_err(), "second client should not be served yet");

        assert_eq!(send(&mut write1, &mut lines1, "QUIT").await, "BYE");

        let reply = tokio::time::timeout(Duration::from_secs(2), lines2.next_line())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply.as_deref(), Some("PONG"));
    }
}
