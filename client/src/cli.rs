//! # CLI Interface
//!
//! Command-line argument structure for `sasp-client`. The four request
//! subcommands mirror the four request message types; SAS and GAS
//! arguments are parsed straight into their protocol types via `FromStr`,
//! so a malformed string fails at argument parsing, before any bytes
//! leave the machine.

use clap::{Parser, Subcommand};

use sasp_protocol::config::DEFAULT_PORT;
use sasp_protocol::sas::{Gas, Sas};

/// Command-line client for the SASP authentication server.
#[derive(Parser, Debug)]
#[command(
    name = "sasp-client",
    about = "SASP authentication client",
    version,
    propagate_version = true
)]
pub struct SaspClientCli {
    /// Server hostname or IP address.
    #[arg(long, env = "SASP_SERVER", default_value = "127.0.0.1")]
    pub server: String,

    /// Server UDP port.
    #[arg(long, short = 'p', env = "SASP_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Per-attempt reply timeout in seconds.
    #[arg(long, default_value_t = 20)]
    pub attempt_timeout: u64,

    /// Give up once this many seconds have elapsed since the first send.
    #[arg(long, default_value_t = 50)]
    pub give_up_after: u64,

    /// Request to perform.
    #[command(subcommand)]
    pub command: Commands,
}

/// The four request types, in their command-line shapes.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Request an individual token; prints `id:nonce:token`.
    Itr {
        /// Student id (ASCII, at most 12 characters).
        student_id: String,
        /// Request nonce.
        nonce: u32,
    },
    /// Validate an individual token; prints `0` (pass) or `1` (fail).
    Itv {
        /// The SAS in text form, `id:nonce:token`.
        sas: Sas,
    },
    /// Request a group token; prints `sas_1+..+sas_n+group_token`.
    Gtr {
        /// Number of SAS arguments that follow.
        count: u16,
        /// The member SAS entries, in order.
        #[arg(num_args = 1..)]
        sas: Vec<Sas>,
    },
    /// Validate a group token; prints `0` (pass) or `1` (fail).
    Gtv {
        /// Number of SAS entries inside the GAS.
        count: u16,
        /// The GAS in text form, `sas_1+..+sas_n+token`.
        gas: Gas,
    },
}
