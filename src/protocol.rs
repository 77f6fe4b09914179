//! Built-in repository protocol entry point.
//!
//! The full command grammar lives behind the [`SessionHandler`] boundary;
//! what's here is the session framing every deployment mode exercises: a
//! greeting, a couple of introspection commands, and an orderly goodbye.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::connection::Session;
use crate::handler::{HandlerError, SessionHandler};

/// Protocol revision advertised in the greeting.
pub const PROTOCOL_VERSION: u32 = 1;

/// Line-oriented handler for the repository protocol.
#[derive(Debug, Default)]
pub struct RepoProtocol;

impl RepoProtocol {
    pub fn new() -> Self {
        Self
    }
}

impl SessionHandler for RepoProtocol {
    async fn serve(&self, session: Session) -> Result<(), HandlerError> {
        let config = session.config.clone();
        let mut stream = BufReader::new(session.connection);

        let access = if config.read_only {
            "read-only"
        } else {
            "read-write"
        };
        let greeting = format!("repserve {PROTOCOL_VERSION} {access}\n");
        stream.get_mut().write_all(greeting.as_bytes()).await?;
        stream.get_mut().flush().await?;

        let mut line = String::new();
        loop {
            line.clear();
            if stream.read_line(&mut line).await? == 0 {
                return Err(HandlerError::ConnectionClosed);
            }
            match line.trim_end() {
                "quit" => return Ok(()),
                "info" => {
                    let reply = format!(
                        "root {} read_only {} tunnel {}\n",
                        config.root.display(),
                        config.read_only,
                        config.mode.is_tunnel(),
                    );
                    stream.get_mut().write_all(reply.as_bytes()).await?;
                    stream.get_mut().flush().await?;
                }
                "" => {}
                other => {
                    let reply = format!("error unknown command {other}\n");
                    stream.get_mut().write_all(reply.as_bytes()).await?;
                    stream.get_mut().flush().await?;
                }
            }
        }
    }
}
