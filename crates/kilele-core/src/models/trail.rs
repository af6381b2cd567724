// ABOUTME: Trail reference data model and difficulty rating
// ABOUTME: Trails are shared, admin-curated records that sessions may link to
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Coordinate;
use crate::errors::{AppError, AppResult};

/// Difficulty rating of a trail
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Gentle terrain, suitable for beginners
    Easy,
    /// Some sustained climbing
    Moderate,
    /// Steep or long, requires fitness
    Hard,
    /// Technical, exposed, or high altitude
    Extreme,
}

impl Difficulty {
    /// Every difficulty level, easiest first
    pub const ALL: [Self; 4] = [Self::Easy, Self::Moderate, Self::Hard, Self::Extreme];

    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Moderate => "moderate",
            Self::Hard => "hard",
            Self::Extreme => "extreme",
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "moderate" => Ok(Self::Moderate),
            "hard" => Ok(Self::Hard),
            "extreme" => Ok(Self::Extreme),
            _ => Err(AppError::invalid_input(format!("Invalid difficulty: {s}"))),
        }
    }
}

/// A known hiking trail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trail {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Area or region the trail belongs to
    pub location: String,
    /// Difficulty rating
    pub difficulty: Difficulty,
    /// Trail length in kilometres
    pub distance_km: f64,
    /// Total climb in metres
    pub elevation_gain_m: Option<f64>,
    /// Estimated completion time in hours
    pub duration_hours: f64,
    /// Free-form description
    pub description: Option<String>,
    /// Trailhead latitude
    pub latitude: Option<f64>,
    /// Trailhead longitude
    pub longitude: Option<f64>,
    /// When the trail was created
    pub created_at: DateTime<Utc>,
    /// When the trail was last edited
    pub updated_at: DateTime<Utc>,
}

impl Trail {
    /// Trailhead coordinate when both components are present
    #[must_use]
    pub fn trailhead(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// Fields supplied when creating or replacing a trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailInput {
    /// Display name
    pub name: String,
    /// Area or region
    pub location: String,
    /// Difficulty rating
    pub difficulty: Difficulty,
    /// Length in kilometres
    pub distance_km: f64,
    /// Total climb in metres
    pub elevation_gain_m: Option<f64>,
    /// Estimated completion time in hours
    pub duration_hours: f64,
    /// Free-form description
    pub description: Option<String>,
    /// Trailhead latitude
    pub latitude: Option<f64>,
    /// Trailhead longitude
    pub longitude: Option<f64>,
}

impl TrailInput {
    /// Check field ranges before the input reaches storage
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` describing the first offending field
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::invalid_input("Trail name is required"));
        }
        if self.location.trim().is_empty() {
            return Err(AppError::invalid_input("Trail location is required"));
        }
        if !(self.distance_km.is_finite() && self.distance_km > 0.0) {
            return Err(AppError::invalid_input("distance_km must be greater than zero"));
        }
        if !(self.duration_hours.is_finite() && self.duration_hours > 0.0) {
            return Err(AppError::invalid_input(
                "duration_hours must be greater than zero",
            ));
        }
        if let Some(elevation) = self.elevation_gain_m {
            if !(elevation.is_finite() && elevation >= 0.0) {
                return Err(AppError::invalid_input(
                    "elevation_gain_m must not be negative",
                ));
            }
        }
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => {
                Coordinate {
                    latitude,
                    longitude,
                }
                .validate()?;
            }
            (None, None) => {}
            _ => {
                return Err(AppError::invalid_input(
                    "latitude and longitude must be provided together",
                ))
            }
        }
        Ok(())
    }
}
