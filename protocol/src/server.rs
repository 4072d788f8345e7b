//! # Server Context & Receive Loop
//!
//! [`ServerContext`] owns the one piece of process-wide state the whole
//! service has: the bound UDP socket. Handlers never see a global socket
//! handle — the context is passed explicitly, and its [`send`]
//! (ServerContext::send) method is the only way bytes leave the process.
//!
//! The loop is single-flight by design: one datagram is received, routed
//! through the dispatcher, and answered before the next receive. The
//! codec and token authority are pure, so nothing here needs a lock, and
//! UDP already promises no ordering between peers — serializing requests
//! costs nothing the transport hadn't lost already.

use std::io;
use std::net::SocketAddr;

use tokio::net::{ToSocketAddrs, UdpSocket};

use crate::config::MAX_DATAGRAM_LEN;
use crate::service::dispatch;

/// The server's runtime context: one socket, no other state.
#[derive(Debug)]
pub struct ServerContext {
    socket: UdpSocket,
}

impl ServerContext {
    /// Bind the server socket.
    pub async fn bind(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self { socket })
    }

    /// The address the socket actually bound (useful with port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Send raw reply bytes to a peer.
    pub async fn send(&self, peer: SocketAddr, bytes: &[u8]) -> io::Result<usize> {
        self.socket.send_to(bytes, peer).await
    }

    /// Run the receive loop forever.
    ///
    /// Each iteration reads one datagram, produces exactly one reply via
    /// the dispatcher, and sends it. Socket errors are logged and the
    /// loop keeps serving — on Linux a UDP socket surfaces stray
    /// `ECONNREFUSED` from previous sends, and none of that is a reason
    /// to stop. Shutdown is the caller's job (select against a signal
    /// and drop the future).
    pub async fn serve(&self) {
        let mut buf = vec![0u8; MAX_DATAGRAM_LEN];
        tracing::info!(
            addr = %self.local_addr().map(|a| a.to_string()).unwrap_or_default(),
            "server listening"
        );
        loop {
            let (len, peer) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(err) => {
                    tracing::warn!(%err, "recv failed, continuing");
                    continue;
                }
            };
            tracing::debug!(%peer, bytes = len, "datagram received");

            let reply = dispatch(&buf[..len]);
            if let Err(err) = self.send(peer, &reply).await {
                tracing::warn!(%peer, %err, "reply send failed");
            }
        }
    }
}
