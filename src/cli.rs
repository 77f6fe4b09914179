//! CLI argument definitions using clap
//!
//! The deployment surface is deliberately small: three mutually exclusive
//! deployment modes, the repository root, and a read-only switch. Anything
//! else on the command line is a usage error.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;

use crate::error::ServerError;

/// Network server for versioned repository access
#[derive(Parser, Debug)]
#[command(name = "repserve")]
#[command(about = "Serve versioned repositories to network clients")]
#[command(version)]
pub struct Cli {
    /// Run as a daemon: listen on the well-known port and serve each
    /// client in its own supervised task
    #[arg(short = 'd', long = "daemon")]
    pub daemon: bool,

    /// Tunnel mode: serve exactly one client over stdin/stdout (the
    /// caller, usually a remote-shell tunnel, owns the transport).
    /// Ignored when a socket mode is selected.
    #[arg(short = 't', long = "tunnel")]
    pub tunnel: bool,

    /// Listen once: bind, accept a single connection, serve it
    /// synchronously, then exit (debugging, forking superservers)
    #[arg(short = 'X', long = "listen-once", conflicts_with = "daemon")]
    pub listen_once: bool,

    /// Repository root served to clients
    #[arg(short = 'r', long = "root", value_name = "PATH", default_value = "/")]
    pub root: PathBuf,

    /// Refuse operations that would modify a repository
    #[arg(short = 'R', long = "read-only")]
    pub read_only: bool,
}

impl Cli {
    /// Parse the process arguments, turning any clap failure into a
    /// `UsageError` so malformed input exits 1 rather than clap's
    /// default 2. `--help` and `--version` still print to stdout and
    /// exit 0.
    pub fn parse_or_usage() -> Result<Self, ServerError> {
        match Self::try_parse() {
            Ok(cli) => Ok(cli),
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => Err(ServerError::Usage(e.render().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_is_implicit_stdio() {
        let cli = Cli::try_parse_from(["repserve"]).unwrap();
        assert!(!cli.daemon);
        assert!(!cli.tunnel);
        assert!(!cli.listen_once);
        assert_eq!(cli.root, PathBuf::from("/"));
        assert!(!cli.read_only);
    }

    #[test]
    fn test_short_flags_parse() {
        let cli = Cli::try_parse_from(["repserve", "-X", "-r", "/srv/repo", "-R"]).unwrap();
        assert!(cli.listen_once);
        assert_eq!(cli.root, PathBuf::from("/srv/repo"));
        assert!(cli.read_only);
    }

    #[test]
    fn test_daemon_and_listen_once_conflict() {
        assert!(Cli::try_parse_from(["repserve", "-d", "-X"]).is_err());
    }

    #[test]
    fn test_tunnel_tolerated_alongside_socket_modes() {
        let cli = Cli::try_parse_from(["repserve", "-t", "-d"]).unwrap();
        assert!(cli.daemon && cli.tunnel);
        let cli = Cli::try_parse_from(["repserve", "-t", "-X"]).unwrap();
        assert!(cli.listen_once && cli.tunnel);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["repserve", "-z"]).is_err());
    }

    #[test]
    fn test_positional_argument_rejected() {
        assert!(Cli::try_parse_from(["repserve", "extra"]).is_err());
    }
}
