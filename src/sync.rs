// ABOUTME: Periodic Strava import across every connected user
// ABOUTME: A failure for one user is logged and counted without aborting the batch
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::errors::AppResult;
use crate::resources::ServerResources;
use crate::services::strava_sync::{self, SyncContext};

/// Totals for one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Users whose sync succeeded
    pub users_processed: usize,
    /// Users whose sync failed
    pub users_failed: usize,
    /// Sessions created or refreshed
    pub activities_imported: usize,
    /// Imported activities linked to a trail
    pub activities_matched: usize,
}

/// Background Strava import job
pub struct StravaSyncJob {
    resources: Arc<ServerResources>,
}

impl StravaSyncJob {
    /// Create a job over shared server resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Sync every connected user once, sequentially
    ///
    /// # Errors
    ///
    /// Returns an error only if the connection list cannot be loaded
    pub async fn run_once(&self) -> AppResult<SyncReport> {
        let resources = &self.resources;
        let connections = resources.database.strava().list_connections().await?;
        let context = SyncContext {
            database: &resources.database,
            matcher: &resources.matcher,
            notifier: resources.notifier.as_ref(),
            feed: resources.activity_feed.as_ref(),
            lookback_days: resources.config.strava.sync_lookback_days,
        };

        let mut report = SyncReport::default();
        for connection in &connections {
            match strava_sync::sync_user(&context, connection).await {
                Ok(outcome) => {
                    report.users_processed += 1;
                    report.activities_imported += outcome.imported + outcome.updated;
                    report.activities_matched += outcome.matched;
                }
                Err(e) => {
                    report.users_failed += 1;
                    warn!(user_id = %connection.user_id, error = %e, "Strava sync failed for user");
                }
            }
        }

        info!(
            users_processed = report.users_processed,
            users_failed = report.users_failed,
            activities_imported = report.activities_imported,
            activities_matched = report.activities_matched,
            "Strava sync batch finished"
        );
        Ok(report)
    }

    /// Run the job forever on the configured interval
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        let period = self.resources.config.strava.sync_interval();
        tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(interval_secs = period.as_secs(), "Strava sync job started");
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    error!(error = %e, "Strava sync batch could not start");
                }
            }
        })
    }
}
