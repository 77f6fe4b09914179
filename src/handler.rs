//! The boundary to the external protocol handler.

use std::future::Future;
use std::io;

use thiserror::Error;

use crate::connection::Session;

/// Errors a protocol handler can raise while serving one session.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The peer closed the connection. This is the expected end of a
    /// session; admission code never surfaces it as a failure.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// I/O failure on the session transport.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The handler rejected the conversation.
    #[error("protocol error: {message}")]
    Protocol { message: String },
}

impl HandlerError {
    /// True for the distinguished expected-EOF condition.
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, Self::ConnectionClosed)
    }
}

/// The repository protocol entry point.
///
/// Admission code invokes `serve` exactly once per session. The repository
/// root, read-only flag, and tunnel indicator travel in the session's
/// config snapshot; the implementation owns the session transport for the
/// session's whole lifetime.
pub trait SessionHandler: Send + Sync + 'static {
    fn serve(&self, session: Session) -> impl Future<Output = Result<(), HandlerError>> + Send;
}
