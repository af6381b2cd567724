// ABOUTME: Normalized GPS track types produced by device-file parsers and activity sync
// ABOUTME: Coordinates, track points, summaries, and the source tag of an imported track
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::geo;
use crate::errors::{AppError, AppResult};

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range components
    ///
    /// # Errors
    ///
    /// Returns `VALUE_OUT_OF_RANGE` for malformed input
    pub fn new(latitude: f64, longitude: f64) -> AppResult<Self> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Check both components are finite and inside the WGS84 range
    ///
    /// # Errors
    ///
    /// Returns `VALUE_OUT_OF_RANGE` for malformed input
    pub fn validate(&self) -> AppResult<()> {
        if !self.latitude.is_finite()
            || !(geo::MIN_LATITUDE..=geo::MAX_LATITUDE).contains(&self.latitude)
        {
            return Err(AppError::out_of_range(format!(
                "latitude {} is outside [-90, 90]",
                self.latitude
            )));
        }
        if !self.longitude.is_finite()
            || !(geo::MIN_LONGITUDE..=geo::MAX_LONGITUDE).contains(&self.longitude)
        {
            return Err(AppError::out_of_range(format!(
                "longitude {} is outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// One sample of a recorded track
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackPoint {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Elevation in metres, if the device recorded it
    #[serde(default)]
    pub elevation: Option<f64>,
    /// Sample time, if recorded
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl TrackPoint {
    /// Position of this sample
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Derived totals for a track
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct TrackSummary {
    /// Distance covered in kilometres
    pub distance_km: f64,
    /// Total climb in metres
    #[serde(default)]
    pub elevation_gain_m: f64,
    /// Elapsed time in hours
    #[serde(default)]
    pub duration_hours: f64,
}

/// Where an activity record came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrackSource {
    /// Tracked live in the app
    #[default]
    Manual,
    /// GPS Exchange Format upload
    Gpx,
    /// Garmin FIT upload
    Fit,
    /// Training Center XML upload
    Tcx,
    /// Synced from Strava
    Strava,
}

impl TrackSource {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Gpx => "gpx",
            Self::Fit => "fit",
            Self::Tcx => "tcx",
            Self::Strava => "strava",
        }
    }

    /// Whether this source is a wearable file upload
    #[must_use]
    pub const fn is_file_import(&self) -> bool {
        matches!(self, Self::Gpx | Self::Fit | Self::Tcx)
    }
}

impl Display for TrackSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "gpx" => Ok(Self::Gpx),
            "fit" => Ok(Self::Fit),
            "tcx" => Ok(Self::Tcx),
            "strava" => Ok(Self::Strava),
            _ => Err(AppError::invalid_input(format!("Unsupported track source: {s}"))),
        }
    }
}

/// A device track after parsing, ready to become a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedTrack {
    /// Origin of the track
    pub source: TrackSource,
    /// Activity name from the device, if any
    #[serde(default)]
    pub name: Option<String>,
    /// Ordered samples
    #[serde(default)]
    pub points: Vec<TrackPoint>,
    /// Derived totals
    pub summary: TrackSummary,
}

impl NormalizedTrack {
    /// First sample's coordinate, if the track has one
    #[must_use]
    pub fn start(&self) -> Option<Coordinate> {
        self.points.first().map(TrackPoint::coordinate)
    }

    /// Timestamp of the first sample
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.points.iter().find_map(|point| point.timestamp)
    }

    /// Timestamp of the last sample
    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.points.iter().rev().find_map(|point| point.timestamp)
    }
}
