// ABOUTME: Progress aggregation folding a user's sessions into lifetime statistics
// ABOUTME: Totals, status counts, distinct trails and locations, completions per difficulty
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::collections::HashSet;

use kilele_core::models::{Difficulty, SessionStatus};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// A session joined with the trail attributes aggregation needs
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    /// Session id, used only for diagnostics
    pub session_id: Uuid,
    /// Linked trail
    pub trail_id: Option<Uuid>,
    /// Lifecycle state
    pub status: SessionStatus,
    /// Distance covered in kilometres
    pub distance_km: f64,
    /// Climb in metres
    pub elevation_gain_m: f64,
    /// Elapsed time in hours
    pub duration_hours: f64,
    /// Difficulty of the linked trail
    pub trail_difficulty: Option<Difficulty>,
    /// Location of the linked trail
    pub trail_location: Option<String>,
}

/// Completed sessions per trail difficulty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyBreakdown {
    /// Completed on easy trails
    pub easy: u64,
    /// Completed on moderate trails
    pub moderate: u64,
    /// Completed on hard trails
    pub hard: u64,
    /// Completed on extreme trails
    pub extreme: u64,
}

impl DifficultyBreakdown {
    /// Count for one difficulty
    #[must_use]
    pub const fn get(&self, difficulty: Difficulty) -> u64 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Moderate => self.moderate,
            Difficulty::Hard => self.hard,
            Difficulty::Extreme => self.extreme,
        }
    }

    fn increment(&mut self, difficulty: Difficulty) {
        match difficulty {
            Difficulty::Easy => self.easy += 1,
            Difficulty::Moderate => self.moderate += 1,
            Difficulty::Hard => self.hard += 1,
            Difficulty::Extreme => self.extreme += 1,
        }
    }

    /// Number of difficulties with at least one completion
    #[must_use]
    pub fn distinct(&self) -> u64 {
        Difficulty::ALL
            .iter()
            .map(|difficulty| u64::from(self.get(*difficulty) > 0))
            .sum()
    }
}

/// Lifetime statistics for one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressStats {
    /// Sum of distance over all sessions
    pub total_distance_km: f64,
    /// Sum of climb over all sessions
    pub total_elevation_gain_m: f64,
    /// Sum of elapsed time over all sessions
    pub total_duration_hours: f64,
    /// Number of sessions
    pub total_sessions: u64,
    /// Sessions in the completed state
    pub completed_sessions: u64,
    /// Sessions still being tracked
    pub active_sessions: u64,
    /// Distinct trails with at least one session
    pub distinct_trails: u64,
    /// Distinct trail locations with at least one session
    pub distinct_locations: u64,
    /// Completed sessions per difficulty
    pub completed_by_difficulty: DifficultyBreakdown,
}

fn measurement(value: f64, field: &str, session_id: Uuid) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!(%session_id, field, value, "Ignoring malformed session measurement");
        0.0
    }
}

/// Fold sessions into lifetime statistics
///
/// Distance, climb, and time are summed over every session; difficulty
/// counts only consider completed sessions. A malformed measurement
/// contributes zero rather than failing the whole aggregate.
#[must_use]
pub fn aggregate(records: &[SessionRecord]) -> ProgressStats {
    let mut stats = ProgressStats::default();
    let mut trails = HashSet::new();
    let mut locations = HashSet::new();

    for record in records {
        stats.total_sessions += 1;
        stats.total_distance_km += measurement(record.distance_km, "distance_km", record.session_id);
        stats.total_elevation_gain_m +=
            measurement(record.elevation_gain_m, "elevation_gain_m", record.session_id);
        stats.total_duration_hours +=
            measurement(record.duration_hours, "duration_hours", record.session_id);

        match record.status {
            SessionStatus::Active => stats.active_sessions += 1,
            SessionStatus::Completed => {
                stats.completed_sessions += 1;
                if let Some(difficulty) = record.trail_difficulty {
                    stats.completed_by_difficulty.increment(difficulty);
                }
            }
        }

        if let Some(trail_id) = record.trail_id {
            trails.insert(trail_id);
        }
        if let Some(location) = record.trail_location.as_deref() {
            let location = location.trim();
            if !location.is_empty() {
                locations.insert(location.to_lowercase());
            }
        }
    }

    stats.distinct_trails = trails.len() as u64;
    stats.distinct_locations = locations.len() as u64;
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(distance_km: f64, status: SessionStatus) -> SessionRecord {
        SessionRecord {
            session_id: Uuid::new_v4(),
            trail_id: None,
            status,
            distance_km,
            elevation_gain_m: 0.0,
            duration_hours: 0.0,
            trail_difficulty: None,
            trail_location: None,
        }
    }

    #[test]
    fn test_no_sessions_yields_zeroes() {
        let stats = aggregate(&[]);
        assert_eq!(stats, ProgressStats::default());
        assert_eq!(stats.total_sessions, 0);
    }

    #[test]
    fn test_totals_include_every_session() {
        let records = [
            record(3.2, SessionStatus::Completed),
            record(5.0, SessionStatus::Completed),
            record(0.0, SessionStatus::Active),
        ];
        let stats = aggregate(&records);
        assert!((stats.total_distance_km - 8.2).abs() < 1e-9);
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.completed_sessions, 2);
        assert_eq!(stats.active_sessions, 1);
    }

    #[test]
    fn test_difficulty_counts_only_completed_sessions() {
        let trail = Uuid::new_v4();
        let mut done = record(4.0, SessionStatus::Completed);
        done.trail_id = Some(trail);
        done.trail_difficulty = Some(Difficulty::Hard);
        done.trail_location = Some("Mount Kenya".into());
        let mut ongoing = done.clone();
        ongoing.status = SessionStatus::Active;
        let mut other = record(2.0, SessionStatus::Completed);
        other.trail_id = Some(Uuid::new_v4());
        other.trail_difficulty = Some(Difficulty::Easy);
        other.trail_location = Some(" mount kenya ".into());

        let stats = aggregate(&[done, ongoing, other]);
        assert_eq!(stats.completed_by_difficulty.hard, 1);
        assert_eq!(stats.completed_by_difficulty.easy, 1);
        assert_eq!(stats.completed_by_difficulty.distinct(), 2);
        assert_eq!(stats.distinct_trails, 2);
        assert_eq!(stats.distinct_locations, 1);
    }

    #[test]
    fn test_malformed_measurement_contributes_zero() {
        let mut bad = record(f64::NAN, SessionStatus::Completed);
        bad.elevation_gain_m = -50.0;
        let stats = aggregate(&[bad, record(1.5, SessionStatus::Completed)]);
        assert!((stats.total_distance_km - 1.5).abs() < 1e-9);
        assert!(stats.total_elevation_gain_m.abs() < f64::EPSILON);
        assert_eq!(stats.total_sessions, 2);
    }
}
