//! Session transport abstraction.
//!
//! A [`Connection`] is the handler-ready value the protocol handler speaks
//! over, built either from a connected socket or from the process's
//! inherited input/output streams. A [`Session`] pairs a connection with
//! the configuration snapshot it was admitted under.

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;

use crate::config::ServerConfig;

/// Byte stream a session can be served over.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// One client's transport.
pub struct Connection {
    stream: Box<dyn Transport>,
    peer: Option<SocketAddr>,
}

impl Connection {
    /// Wrap an accepted socket.
    pub fn from_socket(stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        Self {
            stream: Box::new(stream),
            peer,
        }
    }

    /// Join separate input and output streams into one bidirectional
    /// transport (inherited-stdio serving).
    pub fn from_streams<R, W>(input: R, output: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Self {
            stream: Box::new(tokio::io::join(input, output)),
            peer: None,
        }
    }

    /// Peer address, when the transport is a socket.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl AsyncRead for Connection {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut *self.stream).poll_read(cx, buf)
    }
}

impl AsyncWrite for Connection {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut *self.stream).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut *self.stream).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut *self.stream).poll_shutdown(cx)
    }
}

/// A transient value describing one admitted client: the transport plus
/// the configuration snapshot it was admitted under. Created at accept
/// time, gone when the handler returns.
pub struct Session {
    pub connection: Connection,
    pub config: Arc<ServerConfig>,
}

impl Session {
    pub fn new(connection: Connection, config: Arc<ServerConfig>) -> Self {
        Self { connection, config }
    }
}
