// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # SASP Server
//!
//! Entry point for the `sasp-node` binary. Parses CLI arguments,
//! initializes logging, binds the UDP socket, and runs the receive loop
//! until a shutdown signal arrives.
//!
//! The server is stateless: every datagram is decoded, answered, and
//! forgotten. Killing and restarting it loses nothing.

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;

use sasp_protocol::server::ServerContext;

use cli::{Commands, SaspNodeCli};
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = SaspNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_server(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Binds the socket and serves until Ctrl-C / SIGTERM.
async fn run_server(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        "sasp_node=info,sasp_protocol=info",
        LogFormat::from_str_lossy(&args.log_format),
    );

    let addr = format!("{}:{}", args.bind, args.port);
    let context = ServerContext::bind(&addr)
        .await
        .with_context(|| format!("failed to bind UDP socket on {}", addr))?;
    tracing::info!(%addr, "sasp-node started");

    tokio::select! {
        _ = context.serve() => {}
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, stopping");
        }
    }

    tracing::info!("sasp-node stopped");
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("sasp-node {}", env!("CARGO_PKG_VERSION"));
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
