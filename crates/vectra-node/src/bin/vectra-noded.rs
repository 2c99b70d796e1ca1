//! Per-node server binary
//!
//! Usage: `vectra-noded <node_id> <total_nodes> <base_port>`
//!
//! Starts one simulation participant listening on `base_port + node_id`
//! and runs until a remote Shutdown request or SIGINT/SIGTERM.

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vectra_core::NodeId;
use vectra_node::{spawn, NodeConfig};

fn parse_args() -> Result<NodeConfig, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 3 {
        return Err("Usage: vectra-noded <node_id> <total_nodes> <base_port>".into());
    }

    let node_id: u16 = args[0]
        .parse()
        .map_err(|_| "node_id must be an integer".to_string())?;
    let total_nodes: u16 = args[1]
        .parse()
        .map_err(|_| "total_nodes must be an integer".to_string())?;
    let base_port: u16 = args[2]
        .parse()
        .map_err(|_| "base_port must be an integer".to_string())?;

    let config = NodeConfig::new(NodeId::new(node_id), total_nodes, base_port);
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = match signal(SignalKind::terminate()) {
            Ok(term) => term,
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    info!(
        node = %config.id,
        total_nodes = config.participants,
        port = config.port(),
        "Starting node"
    );

    let mut handle = match spawn(config.clone()).await {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, port = config.port(), "Error starting server");
            eprintln!(
                "Could not listen on port {}. It might be in use; try a different base_port.",
                config.port()
            );
            return ExitCode::FAILURE;
        }
    };

    let service = handle.service().clone();
    tokio::select! {
        _ = wait_for_signal() => {
            info!("Signal received, shutting down node server");
            service.shutdown().await;
        }
        _ = handle.wait() => {}
    }
    handle.wait().await;

    ExitCode::SUCCESS
}
