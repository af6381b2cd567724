// ABOUTME: Command implementations for kilele-cli
// ABOUTME: Each command takes an open database and prints a short summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::sync::Arc;

use kilele_intelligence::SEED_ACHIEVEMENTS;
use kilele_server::{
    config::ServerConfig, database::Database, errors::AppResult, resources::ServerResources,
    sync::StravaSyncJob,
};

/// Seed the achievement catalog
pub async fn seed_achievements(database: &Database) -> AppResult<()> {
    let inserted = database
        .achievements()
        .seed_catalog(SEED_ACHIEVEMENTS)
        .await?;
    println!(
        "Seeded {inserted} new achievement(s); catalog defines {}",
        SEED_ACHIEVEMENTS.len()
    );
    Ok(())
}

/// Grant admin rights by email
pub async fn promote_admin(database: &Database, email: &str) -> AppResult<()> {
    let user = database.users().promote_to_admin(email).await?;
    println!("{} ({}) is now an admin", user.username, user.email);
    println!("Existing tokens keep their old claims; log in again to pick up the change.");
    Ok(())
}

/// Run one Strava sync batch
pub async fn sync_strava(database: Database, config: Arc<ServerConfig>) -> AppResult<()> {
    let resources = Arc::new(ServerResources::new(database, config)?);
    let report = StravaSyncJob::new(resources).run_once().await?;
    println!(
        "Strava sync: {} user(s) synced, {} failed, {} activities imported, {} matched",
        report.users_processed,
        report.users_failed,
        report.activities_imported,
        report.activities_matched
    );
    Ok(())
}
