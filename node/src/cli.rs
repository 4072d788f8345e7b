//! # CLI Interface
//!
//! Command-line argument structure for `sasp-node` using `clap` derive.
//! Two subcommands: `run` and `version`.

use clap::{Parser, Subcommand};

use sasp_protocol::config::DEFAULT_PORT;

/// SASP authentication server.
///
/// A stateless UDP service that issues and verifies individual (SAS) and
/// group (GAS) authentication tokens.
#[derive(Parser, Debug)]
#[command(
    name = "sasp-node",
    about = "SASP authentication server",
    version,
    propagate_version = true
)]
pub struct SaspNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the SASP node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the authentication server.
    Run(RunArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Address to bind the UDP socket on.
    #[arg(long, env = "SASP_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// UDP port to listen on.
    #[arg(long, short = 'p', env = "SASP_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "SASP_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        SaspNodeCli::command().debug_assert();
    }

    #[test]
    fn run_defaults_to_protocol_port() {
        let cli = SaspNodeCli::parse_from(["sasp-node", "run"]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.port, DEFAULT_PORT);
                assert_eq!(args.bind, "0.0.0.0");
            }
            other => panic!("unexpected subcommand: {:?}", other),
        }
    }
}
