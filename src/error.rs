//! Error types and exit codes for repserve

use std::io;
use std::process::ExitCode;

use thiserror::Error;

use crate::handler::HandlerError;

/// Errors raised while bringing the server up or admitting sessions.
///
/// Every variant is fatal to the scope it occurs in: usage and setup
/// failures stop the process before any session is served, an accept
/// failure stops the whole server, and a session failure stops only the
/// modes that serve on the main task (one-shot, inherited stdio).
#[derive(Error, Debug)]
pub enum ServerError {
    /// Malformed command line. The payload is the rendered usage text.
    #[error("{0}")]
    Usage(String),

    /// Transport establishment failed. No retry.
    #[error("Can't {action}: {source}")]
    Setup {
        action: &'static str,
        source: io::Error,
    },

    /// The accept call failed.
    #[error("Can't accept client connection: {0}")]
    Accept(io::Error),

    /// The protocol handler failed while serving a session in a mode where
    /// the error surfaces to the top level. Daemon-mode session failures
    /// never reach this type; they are consumed at the task boundary.
    #[error("session failed: {0}")]
    Session(#[from] HandlerError),
}

impl ServerError {
    pub(crate) fn setup(action: &'static str, source: io::Error) -> Self {
        Self::Setup { action, source }
    }

    /// Convert error to exit code:
    /// - 0: normal termination (never represented as an error)
    /// - 1: usage, setup, accept, or surfaced session failure
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Usage(_) | Self::Setup { .. } | Self::Accept(_) | Self::Session(_) => {
                ExitCode::from(1)
            }
        }
    }
}

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, ServerError>;
