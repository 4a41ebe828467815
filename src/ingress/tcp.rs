use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::kernel::event::{Event, InputEvent, SOURCE_BOT};

/// One read per connection, at most this many bytes.
pub const MAX_MESSAGE_BYTES: usize = 4096;

/// A client that sends nothing for this long is dropped.
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Accepts one-shot text messages and forwards them as attentive signals.
pub struct TcpIngress {
    listener: TcpListener,
    events: mpsc::Sender<Event>,
    token: CancellationToken,
    read_timeout: Duration,
}

impl TcpIngress {
    pub async fn bind(addr: &str, events: mpsc::Sender<Event>, token: CancellationToken) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("TCP listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            events,
            token,
            read_timeout: READ_TIMEOUT,
        })
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Connections are served one after another.
    pub async fn run(self) {
        loop {
            let accepted = tokio::select! {
                _ = self.token.cancelled() => break,
                accepted = self.listener.accept() => accepted,
            };
            let (stream, peer) = match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("TCP accept failed: {}", e);
                    continue;
                }
            };
            let Some(msg) = read_message(stream, self.read_timeout).await else {
                continue;
            };
            debug!("TCP message from {}", peer.ip());
            let input = InputEvent::signal(SOURCE_BOT, &format!("{}: {}", peer.ip(), msg));
            if self.events.send(input.into()).await.is_err() {
                break;
            }
        }
        info!("TCP ingress stopped");
    }
}

async fn read_message(mut stream: TcpStream, read_timeout: Duration) -> Option<String> {
    let mut buf = vec![0u8; MAX_MESSAGE_BYTES];
    let n = match tokio::time::timeout(read_timeout, stream.read(&mut buf)).await {
        Ok(Ok(n)) => n,
        Ok(Err(e)) => {
            debug!("TCP read failed: {}", e);
            return None;
        }
        Err(_) => {
            debug!("TCP client idle for {:?}, dropping", read_timeout);
            return None;
        }
    };
    let msg = String::from_utf8_lossy(&buf[..n]).trim().to_string();
    (!msg.is_empty()).then_some(msg)
}
