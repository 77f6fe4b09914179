//! Server configuration: one immutable value resolved from the CLI and
//! passed as a snapshot to every component that needs it.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::cli::Cli;
use crate::error::ServerError;

/// How the process was deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeMode {
    /// Listen on the well-known port, one supervised task per client.
    Daemon,
    /// Serve exactly one client over the inherited stdin/stdout pair.
    /// `tunnel` records an explicit `-t`, so the handler can tell a tunnel
    /// invocation from an inetd-style one; admission treats them alike.
    Stdio { tunnel: bool },
    /// Bind, accept one connection, serve it, exit.
    OneShot,
}

impl ServeMode {
    /// True only for an explicit `-t` invocation.
    pub fn is_tunnel(&self) -> bool {
        matches!(self, Self::Stdio { tunnel: true })
    }
}

/// Immutable server configuration, constructed once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub mode: ServeMode,
    /// Absolute, normalized repository root.
    pub root: PathBuf,
    /// Advisory read-only flag, forwarded to the protocol handler.
    pub read_only: bool,
}

impl ServerConfig {
    /// Resolve the parsed CLI into a configuration. The root is made
    /// absolute and normalized here; nothing downstream re-checks it.
    pub fn from_cli(cli: &Cli) -> Result<Self, ServerError> {
        let mode = if cli.daemon {
            ServeMode::Daemon
        } else if cli.listen_once {
            ServeMode::OneShot
        } else {
            ServeMode::Stdio { tunnel: cli.tunnel }
        };

        let root = normalize_root(&cli.root)
            .map_err(|e| ServerError::setup("resolve repository root", e))?;

        Ok(Self {
            mode,
            root,
            read_only: cli.read_only,
        })
    }
}

/// Make `path` absolute (relative paths resolve against the current
/// directory) and fold `.` and `..` components away lexically. Symlinks
/// are left alone: the root may name a directory that does not exist yet.
pub fn normalize_root(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::RootDir | Component::Prefix(_) => {
                normalized.push(component.as_os_str());
            }
            Component::CurDir => {}
            // pop() refuses to remove the root, which clamps "/.." at "/".
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    Ok(normalized)
}
