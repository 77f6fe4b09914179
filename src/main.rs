//! repserve entry point.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::info;

use repserve::{
    run_daemon, run_one_shot, run_stdio, Cli, RepoProtocol, Result, ServeMode, ServerConfig,
    TransportListener, DEFAULT_PORT,
};

fn main() -> ExitCode {
    init_logging();

    let cli = match Cli::parse_or_usage() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", e);
            return e.exit_code();
        }
    };

    let config = match ServerConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return e.exit_code();
        }
    };

    match serve(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            e.exit_code()
        }
    }
}

#[tokio::main]
async fn serve(config: ServerConfig) -> Result<()> {
    let config = Arc::new(config);
    let handler = Arc::new(RepoProtocol::new());

    match config.mode {
        ServeMode::Stdio { .. } => run_stdio(config, handler).await,
        ServeMode::OneShot => {
            let listener = TransportListener::bind_default()?;
            run_one_shot(listener, config, handler).await
        }
        ServeMode::Daemon => {
            let listener = TransportListener::bind_default()?;
            info!(
                "serving {} on port {}",
                config.root.display(),
                DEFAULT_PORT
            );
            run_daemon(listener, config, handler).await
        }
    }
}

/// Diagnostics always go to stderr: in stdio mode, stdout carries protocol
/// bytes.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("repserve=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();
}
