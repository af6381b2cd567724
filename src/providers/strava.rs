// ABOUTME: Strava activity feed client and the mapping from activities to hike sessions
// ABOUTME: Only hike, walk, trail run, and run activities are imported
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::StravaConfig;
use crate::constants::{strava, units};
use crate::errors::{AppError, AppResult};
use crate::models::{Coordinate, HikeSession, SessionStatus, TrackSource};

const STRAVA: &str = "Strava";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Strava activity summary as returned by `/athlete/activities`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StravaActivity {
    /// Strava activity id
    pub id: u64,
    /// Activity title
    #[serde(default)]
    pub name: Option<String>,
    /// Strava activity type such as `Hike` or `Run`
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Start time
    pub start_date: DateTime<Utc>,
    /// Distance in metres
    #[serde(default)]
    pub distance: Option<f64>,
    /// Moving time in seconds
    #[serde(default)]
    pub moving_time: Option<u64>,
    /// Elapsed time in seconds
    #[serde(default)]
    pub elapsed_time: Option<u64>,
    /// Climb in metres
    #[serde(default)]
    pub total_elevation_gain: Option<f64>,
    /// `[lat, lng]`, empty when the activity has no GPS data
    #[serde(default)]
    pub start_latlng: Option<Vec<f64>>,
}

impl StravaActivity {
    /// Whether this activity type is imported as a hike session
    #[must_use]
    pub fn is_importable(&self) -> bool {
        let normalized: String = self
            .activity_type
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        strava::IMPORTED_ACTIVITY_TYPES
            .iter()
            .any(|kind| kind.eq_ignore_ascii_case(&normalized))
    }

    /// Start coordinate, when present and in range
    #[must_use]
    pub fn start_coordinate(&self) -> Option<Coordinate> {
        match self.start_latlng.as_deref() {
            Some([latitude, longitude]) => Coordinate::new(*latitude, *longitude).ok(),
            _ => None,
        }
    }

    /// Distance in kilometres
    #[must_use]
    pub fn distance_km(&self) -> f64 {
        self.distance
            .filter(|metres| metres.is_finite() && *metres >= 0.0)
            .map_or(0.0, |metres| metres / units::METERS_PER_KM)
    }

    /// Moving time in hours, falling back to elapsed time
    #[must_use]
    pub fn duration_hours(&self) -> f64 {
        self.moving_time
            .or(self.elapsed_time)
            .map_or(0.0, |seconds| seconds as f64 / units::SECONDS_PER_HOUR)
    }

    /// Build the completed session this activity represents
    #[must_use]
    pub fn to_session(&self, user_id: Uuid, now: DateTime<Utc>) -> HikeSession {
        let elapsed = self.elapsed_time.or(self.moving_time).unwrap_or(0);
        let ended_at = i64::try_from(elapsed)
            .ok()
            .and_then(|seconds| self.start_date.checked_add_signed(Duration::seconds(seconds)))
            .unwrap_or(self.start_date);

        HikeSession {
            id: Uuid::new_v4(),
            user_id,
            trail_id: None,
            trail_matched: false,
            source: TrackSource::Strava,
            external_id: Some(self.id.to_string()),
            name: self.name.clone(),
            status: SessionStatus::Completed,
            started_at: self.start_date,
            ended_at: Some(ended_at),
            distance_covered_km: self.distance_km(),
            elevation_gain_m: self
                .total_elevation_gain
                .filter(|metres| metres.is_finite() && *metres >= 0.0)
                .unwrap_or(0.0),
            duration_hours: self.duration_hours(),
            current_latitude: None,
            current_longitude: None,
            notes: None,
            rating: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Source of recent activities for one access token
#[async_trait]
pub trait ActivityFeed: Send + Sync {
    /// Activities that started after `after`
    async fn recent_activities(
        &self,
        access_token: &str,
        after: DateTime<Utc>,
    ) -> AppResult<Vec<StravaActivity>>;
}

/// `reqwest` client for the Strava REST API
#[derive(Clone)]
pub struct StravaClient {
    client: Client,
    api_base: String,
}

impl StravaClient {
    /// Create a client against `api_base`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(api_base: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_base: api_base.into(),
        })
    }

    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn from_config(config: &StravaConfig) -> AppResult<Self> {
        Self::new(config.api_base.clone())
    }
}

#[async_trait]
impl ActivityFeed for StravaClient {
    async fn recent_activities(
        &self,
        access_token: &str,
        after: DateTime<Utc>,
    ) -> AppResult<Vec<StravaActivity>> {
        let url = format!(
            "{}/athlete/activities",
            self.api_base.trim_end_matches('/')
        );
        debug!(%url, after = %after, "Fetching Strava activities");

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("after", after.timestamp().to_string()),
                ("per_page", strava::ACTIVITIES_PER_PAGE.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::external_service(STRAVA, format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(
                STRAVA,
                format!("API request failed with status {status}: {text}"),
            ));
        }

        response.json().await.map_err(|e| {
            AppError::external_service(STRAVA, format!("Failed to parse activities: {e}"))
        })
    }
}
