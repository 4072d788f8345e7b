//! # SASP Client
//!
//! Entry point for the `sasp-client` binary. Builds one request from the
//! command line, performs a bounded-retry exchange with the server, and
//! prints the protocol answer on stdout — `id:nonce:token` for issuance,
//! the GAS text for group issuance, and a bare `0`/`1` verdict for
//! validation. Server `Error` replies go to stderr with a nonzero exit.

mod cli;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::net::UdpSocket;
use tracing_subscriber::EnvFilter;

use sasp_protocol::client::{exchange, RetryPolicy};
use sasp_protocol::error::ProtocolError;
use sasp_protocol::sas::Identity;
use sasp_protocol::wire::WireMessage;

use cli::{Commands, SaspClientCli};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging to stderr at warn by default: stdout carries the answer and
    // nothing else, so it stays scriptable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = SaspClientCli::parse();
    let request = build_request(&cli.command)?;

    let policy = RetryPolicy {
        attempt_timeout: Duration::from_secs(cli.attempt_timeout),
        give_up_after: Duration::from_secs(cli.give_up_after),
    };

    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .context("failed to bind local UDP socket")?;
    let server = format!("{}:{}", cli.server, cli.port);
    socket
        .connect(&server)
        .await
        .with_context(|| format!("failed to resolve server address {}", server))?;

    let reply = exchange(&socket, &request, policy)
        .await
        .with_context(|| format!("exchange with {} failed", server))?;

    print_reply(reply)
}

/// Translate the parsed subcommand into a request message.
fn build_request(command: &Commands) -> Result<WireMessage> {
    Ok(match command {
        Commands::Itr { student_id, nonce } => {
            WireMessage::IndividualRequest(Identity::new(student_id.clone(), *nonce)?)
        }
        Commands::Itv { sas } => WireMessage::IndividualValidate(sas.clone()),
        Commands::Gtr { count, sas } => {
            if *count as usize != sas.len() {
                bail!(
                    "declared {} SAS entries but {} were provided",
                    count,
                    sas.len()
                );
            }
            WireMessage::GroupRequest(sas.clone())
        }
        Commands::Gtv { count, gas } => {
            if *count as usize != gas.members().len() {
                bail!(
                    "declared {} SAS entries but the GAS contains {}",
                    count,
                    gas.members().len()
                );
            }
            WireMessage::GroupValidate(gas.clone())
        }
    })
}

/// Print the server's answer, or turn an `Error` reply into a failure.
fn print_reply(reply: WireMessage) -> Result<()> {
    match reply {
        WireMessage::IndividualResponse(sas) => println!("{}", sas),
        WireMessage::IndividualValidateResponse { status, .. } => println!("{}", status),
        WireMessage::GroupResponse(gas) => println!("{}", gas),
        WireMessage::GroupValidateResponse { status, .. } => println!("{}", status),
        WireMessage::Error(code) => {
            bail!(
                "server error {}: {}",
                code,
                ProtocolError::describe_wire_code(code)
            );
        }
        other => bail!("unexpected reply type {}", other.tag()),
    }
    Ok(())
}
