//! TCP front end: accept loop, per-connection tasks and reply framing.

use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

use crate::protocol::{self, Reply};
use crate::services::{dispatch, AppServices};

/// Accepts clients until a shutdown signal arrives. Accept failures are
/// logged and the loop keeps going; only the signal stops it.
pub async fn serve(
    listener: TcpListener,
    services: Arc<AppServices>,
    read_timeout: Option<Duration>,
) -> std::io::Result<()> {
    let local = listener.local_addr()?;
    info!("Listening on {}", local);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        info!(%peer, "Client connected");
                        let services = services.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, services, read_timeout).await {
                                warn!(%peer, "Connection error: {}", e);
                            }
                            info!(%peer, "Client disconnected");
                        });
                    }
                    Err(e) => error!("Failed to accept connection: {}", e),
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received; no longer accepting connections");
                return Ok(());
            }
        }
    }
}

/// One request line in, one framed reply out, until EOF or the idle limit.
async fn handle_connection(
    stream: TcpStream,
    services: Arc<AppServices>,
    read_timeout: Option<Duration>,
) -> std::io::Result<()> {
    let peer = stream.peer_addr()?;
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        let next = match read_timeout {
            Some(limit) => match tokio::time::timeout(limit, lines.next_line()).await {
                Ok(result) => result?,
                Err(_) => {
                    info!(%peer, "Idle timeout reached; closing connection");
                    return Ok(());
                }
            },
            None => lines.next_line().await?,
        };
        let Some(line) = next else {
            return Ok(());
        };

        let command = protocol::decode(line.trim_end_matches('\r'));
        let reply = dispatch(&services, command).await;
        write_reply(&mut writer, &reply).await?;
    }
}

/// Writes one reply framed by the blank-line terminator. The body is
/// normalized so multi-line reports still end with exactly one blank line.
async fn write_reply<W: AsyncWrite + Unpin>(writer: &mut W, reply: &Reply) -> std::io::Result<()> {
    let text = reply.render();
    let body = text.trim_end_matches('\n');
    writer.write_all(body.as_bytes()).await?;
    writer.write_all(b"\n\n").await?;
    writer.flush().await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
