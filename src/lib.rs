//! repserve: the admission and dispatch core of a network repository server.
//!
//! Three deployment modes share one handler boundary:
//!
//! - **daemon** (`-d`): listen on the well-known port and serve each client
//!   session in its own supervised task
//! - **inherited stdio** (no mode flag, or `-t`): serve exactly one session
//!   over the process's stdin/stdout, after pointing stdout at stderr so
//!   collaborating processes cannot corrupt the protocol stream
//! - **one-shot** (`-X`): bind, accept a single connection, serve it
//!   synchronously, exit
//!
//! The protocol command grammar and the repository storage engine live
//! behind [`SessionHandler`]; this crate decides only how client sessions
//! are admitted, isolated from each other and from the listener, and
//! reclaimed once they finish.

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod server;

// Re-export commonly used types
pub use cli::Cli;
pub use config::{ServeMode, ServerConfig};
pub use connection::{Connection, Session, Transport};
pub use error::{Result, ServerError};
pub use handler::{HandlerError, SessionHandler};
pub use protocol::RepoProtocol;
pub use server::{
    run_daemon, run_one_shot, run_stdio, SessionReaper, StdioGuard, TransportListener,
    DEFAULT_PORT, LISTEN_BACKLOG,
};
