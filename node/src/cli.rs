//! # CLI Interface
//!
//! Defines the command-line argument structure for `rosetta-node` using
//! `clap` derive. Supports four subcommands: `run`, `derive`, `status`,
//! and `version`.
//!
//! Every `run` flag is optional so that an unset flag never masks the
//! matching value from the config file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use rosetta_protocol::config::{DEFAULT_BECH32_PREFIX, DEFAULT_LCD_URL, SUPPORTED_CURVE};

use crate::logging::LogFormat;

/// Rosetta Construction API server for Cosmos SDK chains.
///
/// Turns Rosetta transfer operations into unsigned bank-send transactions
/// and the digests an offline signer has to sign. Keys never reach the
/// server.
#[derive(Parser, Debug)]
#[command(
    name = "rosetta-node",
    about = "Rosetta Construction API server for Cosmos SDK chains",
    version,
    propagate_version = true
)]
pub struct RosettaNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the Rosetta API server.
    Run(RunArgs),
    /// Derive the account address of a public key without starting a server.
    Derive(DeriveArgs),
    /// Query the chain id and moniker of the configured full node.
    Status(StatusArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the node configuration file (TOML).
    ///
    /// When omitted, built-in defaults are used.
    #[arg(long, short = 'c', env = "ROSETTA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address the Rosetta API binds to.
    #[arg(long, env = "ROSETTA_LISTEN_ADDR")]
    pub listen_addr: Option<String>,

    /// Port for the Rosetta API.
    #[arg(long, env = "ROSETTA_PORT")]
    pub port: Option<u16>,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "ROSETTA_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Do not start the metrics listener.
    #[arg(long)]
    pub no_metrics: bool,

    /// LCD (REST) endpoint of the full node.
    #[arg(long, env = "ROSETTA_LCD_URL")]
    pub lcd_url: Option<String>,

    /// Bech32 prefix of account addresses.
    #[arg(long, env = "ROSETTA_BECH32_PREFIX")]
    pub bech32_prefix: Option<String>,

    /// Deadline for each chain query, in milliseconds.
    #[arg(long, env = "ROSETTA_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Gas hint used when the client sends none.
    #[arg(long, env = "ROSETTA_DEFAULT_GAS")]
    pub default_gas: Option<u64>,

    /// Log output format.
    #[arg(long, value_enum, env = "ROSETTA_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Log filter directives (overridden by `RUST_LOG`).
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Arguments for the `derive` subcommand.
#[derive(Parser, Debug)]
pub struct DeriveArgs {
    /// Hex-encoded public key, compressed (33 bytes) or uncompressed (65 bytes).
    #[arg(long)]
    pub public_key: String,

    /// Curve of the public key.
    #[arg(long, default_value = SUPPORTED_CURVE)]
    pub curve: String,

    /// Bech32 prefix of the derived address.
    #[arg(long, env = "ROSETTA_BECH32_PREFIX", default_value = DEFAULT_BECH32_PREFIX)]
    pub bech32_prefix: String,
}

/// Arguments for the `status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// LCD (REST) endpoint of the full node.
    #[arg(long, env = "ROSETTA_LCD_URL", default_value = DEFAULT_LCD_URL)]
    pub lcd_url: String,

    /// Deadline for the query, in milliseconds.
    #[arg(long, default_value_t = 5_000)]
    pub timeout_ms: u64,
}
