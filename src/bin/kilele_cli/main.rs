// ABOUTME: Kilele CLI - command-line tool for Kilele server administration
// ABOUTME: Seeds the achievement catalog, promotes admins, and runs a one-off Strava sync
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails
//!
//! Usage:
//! ```bash
//! # Insert any missing catalog achievements
//! kilele-cli seed-achievements
//!
//! # Allow a registered user to manage trails
//! kilele-cli promote-admin --email ranger@example.com
//!
//! # Import recent Strava activities for every connected user once
//! kilele-cli sync-strava
//! ```

mod commands;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use kilele_server::{
    config::{DatabaseUrl, ServerConfig},
    database::Database,
    errors::AppResult,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "kilele-cli",
    about = "Kilele server management CLI",
    long_about = "Command-line tool for seeding reference data and running maintenance jobs against the Kilele database."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Insert catalog achievements that are not present yet
    SeedAchievements,

    /// Grant admin rights to an existing user
    PromoteAdmin {
        /// Email of the user to promote
        #[arg(long)]
        email: String,
    },

    /// Run one Strava sync batch for every connected user
    SyncStrava,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    info!("Kilele CLI");

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = cli.database_url {
        config.database = DatabaseUrl::parse_url(&url)?;
    }
    info!("Connecting to database: {}", config.database);
    let database = Database::new(&config.database).await?;

    match cli.command {
        Command::SeedAchievements => commands::seed_achievements(&database).await?,
        Command::PromoteAdmin { email } => commands::promote_admin(&database, &email).await?,
        Command::SyncStrava => commands::sync_strava(database, Arc::new(config)).await?,
    }

    Ok(())
}
