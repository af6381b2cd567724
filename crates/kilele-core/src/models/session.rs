// ABOUTME: Hiking session model covering manual tracking, wearable imports, and Strava sync
// ABOUTME: Sessions optionally link to a trail and become terminal once completed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Coordinate, TrackSource};
use crate::constants::limits;
use crate::errors::{AppError, AppResult};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Tracking in progress
    #[default]
    Active,
    /// Finished; no further progress updates
    Completed,
}

impl SessionStatus {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl Display for SessionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(AppError::invalid_input(format!("Invalid session status: {s}"))),
        }
    }
}

/// A recorded or in-progress hike
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HikeSession {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Linked trail, if known
    pub trail_id: Option<Uuid>,
    /// True when `trail_id` was set by proximity matching rather than by the user
    pub trail_matched: bool,
    /// Origin of the record
    pub source: TrackSource,
    /// Identifier at the origin (e.g. the Strava activity id)
    pub external_id: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Lifecycle state
    pub status: SessionStatus,
    /// When tracking began
    pub started_at: DateTime<Utc>,
    /// When the session was completed
    pub ended_at: Option<DateTime<Utc>>,
    /// Distance covered in kilometres
    pub distance_covered_km: f64,
    /// Climb in metres
    pub elevation_gain_m: f64,
    /// Elapsed time in hours
    pub duration_hours: f64,
    /// Last reported latitude
    pub current_latitude: Option<f64>,
    /// Last reported longitude
    pub current_longitude: Option<f64>,
    /// User notes
    pub notes: Option<String>,
    /// User rating 1-5
    pub rating: Option<i64>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl HikeSession {
    /// A fresh active session on a known trail
    #[must_use]
    pub fn start(user_id: Uuid, trail_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            trail_id: Some(trail_id),
            trail_matched: false,
            source: TrackSource::Manual,
            external_id: None,
            name: None,
            status: SessionStatus::Active,
            started_at: now,
            ended_at: None,
            distance_covered_km: 0.0,
            elevation_gain_m: 0.0,
            duration_hours: 0.0,
            current_latitude: None,
            current_longitude: None,
            notes: None,
            rating: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the session reached its terminal state
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}

/// Progress reported for an active session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionProgressUpdate {
    /// New distance covered in kilometres
    pub distance_covered_km: Option<f64>,
    /// New climb in metres
    pub elevation_gain_m: Option<f64>,
    /// New elapsed time in hours
    pub duration_hours: Option<f64>,
    /// Current latitude
    pub current_latitude: Option<f64>,
    /// Current longitude
    pub current_longitude: Option<f64>,
    /// Replacement notes
    pub notes: Option<String>,
    /// Rating 1-5
    pub rating: Option<i64>,
    /// Mark the session completed
    #[serde(default)]
    pub completed: bool,
}

impl SessionProgressUpdate {
    /// Reject negative measurements, malformed positions, and bad ratings
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` or `VALUE_OUT_OF_RANGE` for the first bad field
    pub fn validate(&self) -> AppResult<()> {
        for (field, value) in [
            ("distance_covered_km", self.distance_covered_km),
            ("elevation_gain_m", self.elevation_gain_m),
            ("duration_hours", self.duration_hours),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(AppError::invalid_input(format!(
                        "{field} must be a non-negative number"
                    )));
                }
            }
        }
        match (self.current_latitude, self.current_longitude) {
            (Some(latitude), Some(longitude)) => {
                Coordinate::new(latitude, longitude)?;
            }
            (None, None) => {}
            _ => {
                return Err(AppError::invalid_input(
                    "current_latitude and current_longitude must be provided together",
                ))
            }
        }
        if let Some(rating) = self.rating {
            if !(limits::MIN_RATING..=limits::MAX_RATING).contains(&rating) {
                return Err(AppError::invalid_input("rating must be between 1 and 5"));
            }
        }
        if let Some(notes) = &self.notes {
            if notes.chars().count() > limits::MAX_NOTES_LENGTH {
                return Err(AppError::invalid_input(format!(
                    "notes must be at most {} characters",
                    limits::MAX_NOTES_LENGTH
                )));
            }
        }
        Ok(())
    }

    /// Apply the update to a session in memory
    pub fn apply_to(&self, session: &mut HikeSession, now: DateTime<Utc>) {
        if let Some(distance) = self.distance_covered_km {
            session.distance_covered_km = distance;
        }
        if let Some(elevation) = self.elevation_gain_m {
            session.elevation_gain_m = elevation;
        }
        if let Some(duration) = self.duration_hours {
            session.duration_hours = duration;
        }
        if self.current_latitude.is_some() {
            session.current_latitude = self.current_latitude;
            session.current_longitude = self.current_longitude;
        }
        if let Some(notes) = &self.notes {
            session.notes = Some(notes.clone());
        }
        if self.rating.is_some() {
            session.rating = self.rating;
        }
        if self.completed && !session.is_completed() {
            session.status = SessionStatus::Completed;
            session.ended_at = Some(now);
        }
        session.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_update_rejects_negative_distance() {
        let update = SessionProgressUpdate {
            distance_covered_km: Some(-1.0),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_completing_stamps_end_time_once() {
        let mut session = HikeSession::start(Uuid::new_v4(), Uuid::new_v4());
        let first = Utc::now();
        let update = SessionProgressUpdate {
            distance_covered_km: Some(4.2),
            completed: true,
            ..Default::default()
        };
        update.apply_to(&mut session, first);
        assert!(session.is_completed());
        assert_eq!(session.ended_at, Some(first));
        assert!((session.distance_covered_km - 4.2).abs() < f64::EPSILON);

        let later = first + chrono::Duration::minutes(5);
        update.apply_to(&mut session, later);
        assert_eq!(session.ended_at, Some(first));
    }
}
