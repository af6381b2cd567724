// ABOUTME: Strava API client and background sync configuration
// ABOUTME: Base URL, sync toggle, interval, and lookback window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::env;
use std::time::Duration;

use kilele_core::constants::strava;
use serde::{Deserialize, Serialize};

/// Strava integration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StravaConfig {
    /// Base URL of the Strava v3 API
    pub api_base: String,
    /// Run the periodic sync job
    pub sync_enabled: bool,
    /// Seconds between sync runs
    pub sync_interval_secs: u64,
    /// How many days back each run fetches
    pub sync_lookback_days: i64,
}

impl Default for StravaConfig {
    fn default() -> Self {
        Self {
            api_base: strava::DEFAULT_API_BASE.to_owned(),
            sync_enabled: false,
            sync_interval_secs: strava::DEFAULT_SYNC_INTERVAL_SECS,
            sync_lookback_days: strava::DEFAULT_SYNC_LOOKBACK_DAYS,
        }
    }
}

impl StravaConfig {
    /// Load Strava configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api_base: env::var("STRAVA_API_BASE")
                .unwrap_or_else(|_| strava::DEFAULT_API_BASE.to_owned()),
            sync_enabled: env::var("STRAVA_SYNC_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            sync_interval_secs: env::var("STRAVA_SYNC_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(strava::DEFAULT_SYNC_INTERVAL_SECS),
            sync_lookback_days: env::var("STRAVA_SYNC_LOOKBACK_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|days| *days > 0)
                .unwrap_or(strava::DEFAULT_SYNC_LOOKBACK_DAYS),
        }
    }

    /// Sync interval as a [`Duration`]
    #[must_use]
    pub const fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }
}
