// ABOUTME: Trail proximity matcher linking an imported track to a single known trail
// ABOUTME: Uses a degree bounding box around the track start and requires a unique candidate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

//! Trail proximity matching.
//!
//! A track matches a trail when exactly one trailhead falls inside a square
//! box of `radius_deg` around the track's first point. Zero or several
//! candidates leave the track unmatched; there is no tie-breaking.

use kilele_core::constants::matching::{DEFAULT_RADIUS_DEG, MAX_RADIUS_DEG};
use kilele_core::errors::{AppError, AppResult};
use kilele_core::models::{Coordinate, Trail};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Matcher configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MatchingConfig {
    /// Half-width of the bounding box in degrees
    pub radius_deg: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            radius_deg: DEFAULT_RADIUS_DEG,
        }
    }
}

impl MatchingConfig {
    /// Build a config with a custom radius
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_ERROR` when the radius is not in `(0, 1]`
    pub fn with_radius(radius_deg: f64) -> AppResult<Self> {
        if !radius_deg.is_finite() || radius_deg <= 0.0 || radius_deg > MAX_RADIUS_DEG {
            return Err(AppError::config(format!(
                "trail match radius must be in (0, {MAX_RADIUS_DEG}], got {radius_deg}"
            )));
        }
        Ok(Self { radius_deg })
    }
}

/// Inclusive latitude/longitude box
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    /// Southern edge
    pub min_latitude: f64,
    /// Northern edge
    pub max_latitude: f64,
    /// Western edge
    pub min_longitude: f64,
    /// Eastern edge
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Square box of `radius_deg` around `center`
    #[must_use]
    pub fn around(center: Coordinate, radius_deg: f64) -> Self {
        Self {
            min_latitude: center.latitude - radius_deg,
            max_latitude: center.latitude + radius_deg,
            min_longitude: center.longitude - radius_deg,
            max_longitude: center.longitude + radius_deg,
        }
    }

    /// Whether `point` lies inside or on the edge of the box
    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&point.longitude)
    }
}

/// A trail reduced to what the matcher needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailLocation {
    /// Trail id
    pub trail_id: Uuid,
    /// Trailhead position
    pub trailhead: Coordinate,
}

impl TrailLocation {
    /// Extract the trailhead of a trail, if it has coordinates
    #[must_use]
    pub fn from_trail(trail: &Trail) -> Option<Self> {
        trail.trailhead().map(|trailhead| Self {
            trail_id: trail.id,
            trailhead,
        })
    }
}

/// Outcome of a matching attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TrailMatch {
    /// Exactly one trail inside the box
    Matched {
        /// The matched trail
        trail_id: Uuid,
    },
    /// No trail inside the box
    NoCandidates,
    /// Several trails inside the box; not guessed
    Ambiguous {
        /// How many trails were inside the box
        candidates: usize,
    },
    /// The track had no usable start coordinate
    InvalidStart,
}

impl TrailMatch {
    /// The matched trail id, if any
    #[must_use]
    pub const fn trail_id(&self) -> Option<Uuid> {
        match self {
            Self::Matched { trail_id } => Some(*trail_id),
            _ => None,
        }
    }

    /// Whether a confident match was found
    #[must_use]
    pub const fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// Bounding-box trail matcher
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailMatcher {
    config: MatchingConfig,
}

impl TrailMatcher {
    /// Create a matcher with the given configuration
    #[must_use]
    pub const fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// Configured radius in degrees
    #[must_use]
    pub const fn radius_deg(&self) -> f64 {
        self.config.radius_deg
    }

    /// Search box for a validated start point, `None` if the start is malformed
    #[must_use]
    pub fn search_box(&self, start: Coordinate) -> Option<BoundingBox> {
        start
            .validate()
            .ok()
            .map(|()| BoundingBox::around(start, self.config.radius_deg))
    }

    /// Decide which trail, if any, a track starting at `start` belongs to
    pub fn match_start<'a, I>(&self, start: Option<Coordinate>, trails: I) -> TrailMatch
    where
        I: IntoIterator<Item = &'a TrailLocation>,
    {
        let Some(search_box) = start.and_then(|point| self.search_box(point)) else {
            debug!("Skipping trail match: track has no valid start coordinate");
            return TrailMatch::InvalidStart;
        };

        let mut candidates = trails
            .into_iter()
            .filter(|trail| search_box.contains(trail.trailhead));

        let Some(first) = candidates.next() else {
            return TrailMatch::NoCandidates;
        };

        let others = candidates.count();
        if others == 0 {
            TrailMatch::Matched {
                trail_id: first.trail_id,
            }
        } else {
            TrailMatch::Ambiguous {
                candidates: others + 1,
            }
        }
    }
}
