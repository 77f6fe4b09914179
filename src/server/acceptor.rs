//! Accept loops: the daemon loop, the one-shot path, and inherited-stdio
//! serving.

use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::connection::{Connection, Session};
use crate::error::{Result, ServerError};
use crate::handler::SessionHandler;
use crate::server::listener::TransportListener;
use crate::server::reaper::SessionReaper;
use crate::server::stdio::StdioGuard;

/// Daemon loop: reap, wait, dispatch.
///
/// Returns only on a fatal accept failure or an external termination
/// signal. The accept wait is preemptible by session completion, so
/// finished sessions are reclaimed promptly even while the server is idle.
pub async fn run_daemon<H>(
    listener: TransportListener,
    config: Arc<ServerConfig>,
    handler: Arc<H>,
) -> Result<()>
where
    H: SessionHandler,
{
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| ServerError::setup("install termination signal handler", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| ServerError::setup("install termination signal handler", e))?;

    let mut reaper = SessionReaper::new();
    loop {
        reaper.reap_finished();

        // Snapshot before the select: the join_next arm borrows the reaper
        // mutably, so the guard cannot ask it.
        let has_live_sessions = !reaper.is_empty();

        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                info!("accepted connection from {}", peer);
                let session = Session::new(
                    Connection::from_socket(stream),
                    Arc::clone(&config),
                );
                reaper.spawn(serve_isolated(session, Arc::clone(&handler)));
            }
            Some(()) = reaper.join_next(), if has_live_sessions => {
                // A session finished; loop back so reap_finished drains
                // any siblings that completed with it.
            }
            _ = sigterm.recv() => {
                info!("terminated, shutting down");
                return Ok(());
            }
            _ = sigint.recv() => {
                info!("interrupted, shutting down");
                return Ok(());
            }
        }
    }
}

/// Session boundary for daemon mode. The handler's outcome is consumed
/// here; nothing propagates to the accept loop.
async fn serve_isolated<H>(session: Session, handler: Arc<H>)
where
    H: SessionHandler,
{
    let peer = session.connection.peer_addr();
    match handler.serve(session).await {
        Ok(()) => debug!("session from {:?} finished", peer),
        Err(e) if e.is_connection_closed() => debug!("session from {:?} closed by peer", peer),
        Err(e) => warn!("session from {:?} failed: {}", peer, e),
    }
}

/// Accept exactly one connection, serve it on the caller's task, close
/// both transports, and return.
pub async fn run_one_shot<H>(
    listener: TransportListener,
    config: Arc<ServerConfig>,
    handler: Arc<H>,
) -> Result<()>
where
    H: SessionHandler,
{
    let (stream, peer) = listener.accept().await?;
    debug!("accepted connection from {}", peer);

    // Only the one session is ever admitted.
    drop(listener);

    let session = Session::new(Connection::from_socket(stream), config);
    match handler.serve(session).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_connection_closed() => Ok(()),
        Err(e) => Err(ServerError::Session(e)),
    }
}

/// Serve one session over the inherited stdin/stdout pair.
pub async fn run_stdio<H>(config: Arc<ServerConfig>, handler: Arc<H>) -> Result<()>
where
    H: SessionHandler,
{
    let guard = StdioGuard::activate()
        .map_err(|e| ServerError::setup("redirect standard output", e))?;

    let session = Session::new(guard.into_connection(), config);
    match handler.serve(session).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_connection_closed() => Ok(()),
        Err(e) => Err(ServerError::Session(e)),
    }
}
