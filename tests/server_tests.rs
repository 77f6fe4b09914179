//! Integration tests for session admission and dispatch.
//!
//! These drive the accept loops through the library API with scripted
//! handlers, binding ephemeral ports so tests never collide with a real
//! server on the well-known port.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use repserve::{
    run_daemon, run_one_shot, HandlerError, ServeMode, ServerConfig, ServerError, Session,
    SessionHandler, TransportListener,
};

fn test_config(mode: ServeMode) -> Arc<ServerConfig> {
    Arc::new(ServerConfig {
        mode,
        root: PathBuf::from("/srv/repo"),
        read_only: false,
    })
}

fn bind_ephemeral() -> (TransportListener, SocketAddr) {
    let listener = TransportListener::bind("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Handler that reads one line and obeys it: "ok" replies and succeeds,
/// "fail" raises a protocol error, "panic" panics, EOF is the
/// closed-connection condition.
struct ScriptedHandler {
    served: AtomicUsize,
}

impl ScriptedHandler {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            served: AtomicUsize::new(0),
        })
    }
}

impl SessionHandler for ScriptedHandler {
    async fn serve(&self, session: Session) -> Result<(), HandlerError> {
        self.served.fetch_add(1, Ordering::SeqCst);
        let mut stream = BufReader::new(session.connection);
        let mut line = String::new();
        if stream.read_line(&mut line).await? == 0 {
            return Err(HandlerError::ConnectionClosed);
        }
        match line.trim_end() {
            "ok" => {
                stream.get_mut().write_all(b"done\n").await?;
                Ok(())
            }
            "fail" => Err(HandlerError::Protocol {
                message: "scripted failure".into(),
            }),
            "panic" => panic!("scripted panic"),
            other => Err(HandlerError::Protocol {
                message: format!("unexpected command: {other}"),
            }),
        }
    }
}

async fn roundtrip(addr: SocketAddr, command: &str) -> Option<String> {
    let stream = TcpStream::connect(addr).await.unwrap();
    let mut stream = BufReader::new(stream);
    stream
        .get_mut()
        .write_all(format!("{command}\n").as_bytes())
        .await
        .unwrap();
    let mut reply = String::new();
    match stream.read_line(&mut reply).await {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(reply),
    }
}

#[tokio::test]
async fn test_one_shot_serves_exactly_one_connection() {
    let (listener, addr) = bind_ephemeral();
    let handler = ScriptedHandler::new();
    let server = tokio::spawn(run_one_shot(
        listener,
        test_config(ServeMode::OneShot),
        Arc::clone(&handler),
    ));

    assert_eq!(roundtrip(addr, "ok").await.as_deref(), Some("done\n"));
    server.await.unwrap().unwrap();
    assert_eq!(handler.served.load(Ordering::SeqCst), 1);

    // The listening transport is gone with the session.
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_one_shot_suppresses_connection_closed() {
    let (listener, addr) = bind_ephemeral();
    let server = tokio::spawn(run_one_shot(
        listener,
        test_config(ServeMode::OneShot),
        ScriptedHandler::new(),
    ));

    // Connect and disconnect without sending anything.
    drop(TcpStream::connect(addr).await.unwrap());
    assert!(server.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_one_shot_surfaces_handler_failure() {
    let (listener, addr) = bind_ephemeral();
    let server = tokio::spawn(run_one_shot(
        listener,
        test_config(ServeMode::OneShot),
        ScriptedHandler::new(),
    ));

    roundtrip(addr, "fail").await;
    let result = server.await.unwrap();
    assert!(matches!(result, Err(ServerError::Session(_))));
}

#[tokio::test]
async fn test_daemon_survives_session_failures() {
    let (listener, addr) = bind_ephemeral();
    let handler = ScriptedHandler::new();
    let server = tokio::spawn(run_daemon(
        listener,
        test_config(ServeMode::Daemon),
        Arc::clone(&handler),
    ));

    // A failing session, then a panicking one; neither may take down the
    // accept loop.
    roundtrip(addr, "fail").await;
    roundtrip(addr, "panic").await;
    assert_eq!(roundtrip(addr, "ok").await.as_deref(), Some("done\n"));

    assert_eq!(handler.served.load(Ordering::SeqCst), 3);
    server.abort();
}

#[tokio::test]
async fn test_daemon_serves_concurrent_sessions() {
    let (listener, addr) = bind_ephemeral();
    let handler = ScriptedHandler::new();
    let server = tokio::spawn(run_daemon(
        listener,
        test_config(ServeMode::Daemon),
        Arc::clone(&handler),
    ));

    // Hold one session open while a second is admitted and served.
    let held = TcpStream::connect(addr).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(roundtrip(addr, "ok").await.as_deref(), Some("done\n"));
    drop(held);

    server.abort();
}

#[tokio::test]
async fn test_bind_conflict_is_setup_error() {
    let (_listener, addr) = bind_ephemeral();
    let err = TransportListener::bind(addr).unwrap_err();
    assert!(matches!(err, ServerError::Setup { .. }));
    assert!(
        err.to_string().contains("Can't bind server socket"),
        "unexpected diagnostic: {err}"
    );
}
