//! Session admission and dispatch.
//!
//! The deployment mode decides how sessions arrive:
//!
//! ```text
//! ServerConfig ──► TransportListener ──► run_daemon ──► SessionReaper
//!      │                    │                │   one supervised task
//!      │                    │                │   per client session
//!      │                    └──► run_one_shot (single accept, no isolation)
//!      │
//!      └──► StdioGuard ──► run_stdio (inherited stdin/stdout, one session)
//! ```
//!
//! The listening socket belongs to the accept loops and never crosses into
//! a session task; a session's failure domain is its own task.

pub mod acceptor;
pub mod listener;
pub mod reaper;
pub mod stdio;

pub use acceptor::{run_daemon, run_one_shot, run_stdio};
pub use listener::{TransportListener, DEFAULT_PORT, LISTEN_BACKLOG};
pub use reaper::SessionReaper;
pub use stdio::StdioGuard;
