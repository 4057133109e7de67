// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Rosetta Node
//!
//! Entry point for the `rosetta-node` binary. Parses CLI arguments, loads
//! the configuration, initializes logging and metrics, and serves the
//! Rosetta construction API.
//!
//! The binary supports four subcommands:
//!
//! - `run`     start the API server
//! - `derive`  print the address of a public key, offline
//! - `status`  query the configured full node's chain id
//! - `version` print build version information

mod api;
mod cli;
mod config;
mod logging;
mod metrics;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

use rosetta_protocol::client::{ChainClient, LcdClient};
use rosetta_protocol::construction::{ConstructionApi, ConstructionService};
use rosetta_protocol::crypto::{account_address, Secp256k1PublicKey};
use rosetta_protocol::types::CurveType;

use cli::{Commands, RosettaNodeCli};
use config::NodeConfig;
use logging::LogFormat;
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = RosettaNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Derive(args) => derive_address(args),
        Commands::Status(args) => query_status(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the API server and the metrics endpoint.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    let config = NodeConfig::from_args(&args).context("failed to load configuration")?;

    logging::init_logging(&config.logging.level, config.logging.format);

    tracing::info!(
        listen_addr = %config.server.listen_addr,
        port = config.server.port,
        metrics_port = config.metrics.port,
        metrics_enabled = config.metrics.enabled,
        lcd_url = %config.chain.lcd_url,
        bech32_prefix = %config.chain.bech32_prefix,
        "starting rosetta-node"
    );

    // --- Chain client ---
    let client = LcdClient::with_timeout(&config.chain.lcd_url, config.request_timeout())
        .with_context(|| format!("failed to build LCD client for {}", config.chain.lcd_url))?;

    // --- Construction service ---
    let service: Arc<dyn ConstructionApi> = Arc::new(ConstructionService::new(
        Arc::new(client),
        config.service_config(),
    ));

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new().context("failed to register metrics")?);

    // --- API server ---
    let app_state = api::AppState::new(service, Arc::clone(&node_metrics));
    let api_router = api::create_router(app_state);
    let api_addr = format!("{}:{}", config.server.listen_addr, config.server.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("Rosetta API listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_server = async {
        if !config.metrics.enabled {
            return std::future::pending::<Result<()>>().await;
        }
        let metrics_router = axum::Router::new()
            .route("/metrics", axum::routing::get(metrics::metrics_handler))
            .with_state(Arc::clone(&node_metrics));
        let metrics_addr = format!("{}:{}", config.server.listen_addr, config.metrics.port);
        let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
            .await
            .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
        tracing::info!("Metrics server listening on {}", metrics_addr);
        axum::serve(metrics_listener, metrics_router)
            .await
            .context("metrics server error")
    };

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = metrics_server => {
            if let Err(e) = res {
                tracing::error!("{:#}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("rosetta-node stopped");
    Ok(())
}

/// Prints the account address of a public key.
fn derive_address(args: cli::DeriveArgs) -> Result<()> {
    let curve = CurveType::from(args.curve);
    if curve != CurveType::Secp256k1 {
        bail!("unsupported curve type: {}", curve);
    }

    let key = Secp256k1PublicKey::from_hex(&args.public_key).context("invalid public key")?;
    let address =
        account_address(&args.bech32_prefix, &key).context("failed to encode address")?;

    println!("{}", address);
    Ok(())
}

/// Queries the full node's LCD endpoint and prints its network and moniker.
async fn query_status(args: cli::StatusArgs) -> Result<()> {
    logging::init_logging("rosetta_node=warn", LogFormat::Pretty);

    let client = LcdClient::with_timeout(&args.lcd_url, Duration::from_millis(args.timeout_ms))
        .with_context(|| format!("failed to build LCD client for {}", args.lcd_url))?;
    let status = client
        .status()
        .await
        .with_context(|| format!("failed to query {}", client.base_url()))?;

    println!("LCD      : {}", client.base_url());
    println!("Chain id : {}", status.network);
    println!("Moniker  : {}", status.moniker.as_deref().unwrap_or("-"));
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("rosetta-node {}", env!("CARGO_PKG_VERSION"));
    println!(
        "metadata     v{}",
        rosetta_protocol::config::METADATA_VERSION
    );
    println!("rustc        {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported. If a handler cannot be
/// installed, that branch never completes.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
