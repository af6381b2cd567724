// ABOUTME: HTTP server binary for the Kilele trail activity API
// ABOUTME: Loads configuration, opens the database, seeds achievements, and serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

//! # Kilele Server Binary
//!
//! Starts the REST API and, when enabled, the periodic Strava sync job.

use std::future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use kilele_intelligence::SEED_ACHIEVEMENTS;
use kilele_server::{
    config::ServerConfig, database::Database, logging, resources::ServerResources,
    routes::build_router, sync::StravaSyncJob,
};
use tokio::net::TcpListener;
use tokio::signal;
#[cfg(unix)]
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "kilele-server")]
#[command(about = "Kilele trail activity API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    let config = Arc::new(config);

    let database = Database::new(&config.database).await?;
    database
        .achievements()
        .seed_catalog(SEED_ACHIEVEMENTS)
        .await?;

    let resources = Arc::new(ServerResources::new(database, config.clone())?);

    let sync_handle = if config.strava.sync_enabled {
        Some(StravaSyncJob::new(resources.clone()).spawn())
    } else {
        info!("Strava sync job disabled");
        None
    };

    let app = build_router(resources);
    let address = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(address).await?;
    info!(%address, "Kilele server listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {e}");
        return Err(e.into());
    }

    if let Some(handle) = sync_handle {
        handle.abort();
    }
    info!("Kilele server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match unix_signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
