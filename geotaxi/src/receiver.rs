use crate::queue::{Datagram, WorkQueue};
use bytes::Bytes;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

/// Largest possible UDP payload.
const MAX_DATAGRAM: usize = 65_535;

/// Owns the UDP socket. Only ever enqueues: validation and store I/O happen
/// in the workers.
#[derive(Debug)]
pub struct Receiver {
    socket: UdpSocket,
}

impl Receiver {
    pub async fn bind(addr: &str) -> anyhow::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receives until `shutdown` is cancelled. The socket is closed on return.
    pub async fn run(self, queue: WorkQueue, shutdown: CancellationToken) {
        let mut buf = vec![0; MAX_DATAGRAM];
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok((len, source)) => {
                        tracing::trace!("Received {len} bytes from {source}");
                        queue.push(Datagram {
                            payload: Bytes::copy_from_slice(&buf[..len]),
                            source,
                        });
                    }
                    Err(e) => tracing::warn!("Failed to receive datagram: {e}"),
                },
            }
        }
        tracing::info!("Receiver stopped");
    }
}
