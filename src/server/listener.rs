//! Listening-socket construction.

use std::io;
use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpSocket, TcpStream};

use crate::error::{Result, ServerError};

/// Well-known service port.
pub const DEFAULT_PORT: u16 = 3690;

/// Pending-connection backlog. New connections arrive at human scale.
pub const LISTEN_BACKLOG: u32 = 7;

/// The listening endpoint. Owned exclusively by the accept loop; session
/// tasks never see it.
#[derive(Debug)]
pub struct TransportListener {
    inner: TcpListener,
}

impl TransportListener {
    /// Bind the well-known service port on all local addresses.
    pub fn bind_default() -> Result<Self> {
        Self::bind(SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))
    }

    /// Create, bind, and listen. Each phase maps to its own setup
    /// diagnostic so the operator sees exactly which step refused.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4(),
            SocketAddr::V6(_) => TcpSocket::new_v6(),
        }
        .map_err(|e| ServerError::setup("create server socket", e))?;

        // A restarted server must not fail to bind while the previous
        // socket lingers in teardown.
        socket
            .set_reuseaddr(true)
            .map_err(|e| ServerError::setup("create server socket", e))?;

        socket
            .bind(addr)
            .map_err(|e| ServerError::setup("bind server socket", e))?;

        let inner = socket
            .listen(LISTEN_BACKLOG)
            .map_err(|e| ServerError::setup("listen on server socket", e))?;

        Ok(Self { inner })
    }

    /// Local address actually bound. Useful when binding port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Wait for the next client connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr)> {
        self.inner.accept().await.map_err(ServerError::Accept)
    }
}
