// ABOUTME: Imports a normalized wearable track as a completed session with its route
// ABOUTME: Links the given trail or matches the first point, then evaluates achievements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use chrono::Utc;
use kilele_intelligence::{TrailMatch, TrailMatcher};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::{achievements, matching};
use crate::database::{Database, SessionManager};
use crate::errors::{AppError, AppResult};
use crate::models::{
    HikeSession, NormalizedTrack, SessionStatus, TrackPoint, TrackSummary, UnlockedAchievement,
};
use crate::notifications::AchievementNotifier;

/// Upper bound on points stored for one imported track
pub const MAX_TRACK_POINTS: usize = 50_000;

/// Body of a wearable import request
#[derive(Debug, Clone, Deserialize)]
pub struct TrackImport {
    /// Parsed track
    #[serde(flatten)]
    pub track: NormalizedTrack,
    /// Trail chosen by the user, skipping the matcher
    #[serde(default)]
    pub trail_id: Option<Uuid>,
}

/// Outcome of an import
#[derive(Debug, Clone, Serialize)]
pub struct ImportResult {
    /// Stored session
    pub session: HikeSession,
    /// How the trail link was decided; `None` when the caller supplied one
    #[serde(rename = "match")]
    pub outcome: Option<TrailMatch>,
    /// Number of route points stored
    pub route_points: usize,
    /// Achievements completed by this import
    pub unlocked: Vec<UnlockedAchievement>,
}

fn validate_summary(summary: &TrackSummary) -> AppResult<()> {
    for (field, value) in [
        ("distance_km", summary.distance_km),
        ("elevation_gain_m", summary.elevation_gain_m),
        ("duration_hours", summary.duration_hours),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(AppError::invalid_input(format!(
                "summary.{field} must be a non-negative number"
            )));
        }
    }
    Ok(())
}

fn validate_points(points: &[TrackPoint]) -> AppResult<()> {
    if points.len() > MAX_TRACK_POINTS {
        return Err(AppError::invalid_input(format!(
            "Track has {} points; at most {MAX_TRACK_POINTS} are accepted",
            points.len()
        )));
    }
    Ok(())
}

/// Points with a valid coordinate; malformed samples are left out of the route
fn usable_points(points: &[TrackPoint]) -> Vec<TrackPoint> {
    points
        .iter()
        .filter(|point| point.coordinate().validate().is_ok())
        .cloned()
        .collect()
}

/// Check an import request before anything is written
///
/// Out-of-range coordinates are not an error here. A malformed start only
/// skips matching, and malformed samples are dropped from the stored route.
///
/// # Errors
///
/// Returns `INVALID_INPUT` for a non-file source, bad summary values, or a
/// track with too many points
pub fn validate_import(track: &NormalizedTrack) -> AppResult<()> {
    if !track.source.is_file_import() {
        return Err(AppError::invalid_input(format!(
            "Unsupported import source '{}'; expected gpx, fit, or tcx",
            track.source
        )));
    }
    validate_summary(&track.summary)?;
    validate_points(&track.points)
}

fn session_from_track(user_id: Uuid, track: &NormalizedTrack) -> HikeSession {
    let now = Utc::now();
    let started_at = track.started_at().unwrap_or(now);
    HikeSession {
        id: Uuid::new_v4(),
        user_id,
        trail_id: None,
        trail_matched: false,
        source: track.source,
        external_id: None,
        name: track.name.clone(),
        status: SessionStatus::Completed,
        started_at,
        ended_at: Some(track.ended_at().unwrap_or(started_at)),
        distance_covered_km: track.summary.distance_km,
        elevation_gain_m: track.summary.elevation_gain_m,
        duration_hours: track.summary.duration_hours,
        current_latitude: None,
        current_longitude: None,
        notes: Some(format!("Imported from {} file", track.source)),
        rating: None,
        created_at: now,
        updated_at: now,
    }
}

/// Import a normalized track as a completed session
///
/// Matching reads trails before the write transaction opens; the session,
/// its route, and the achievement upserts then commit together.
///
/// # Errors
///
/// Returns validation errors, `RESOURCE_NOT_FOUND` for an unknown
/// `trail_id`, or a database error; on error nothing is persisted
pub async fn import_track(
    database: &Database,
    matcher: &TrailMatcher,
    notifier: &dyn AchievementNotifier,
    user_id: Uuid,
    request: &TrackImport,
) -> AppResult<ImportResult> {
    let track = &request.track;
    validate_import(track)?;

    let mut session = session_from_track(user_id, track);
    let outcome = if let Some(trail_id) = request.trail_id {
        database.trails().require_trail(trail_id).await?;
        session.trail_id = Some(trail_id);
        None
    } else {
        let outcome = matching::match_trail(database, matcher, track.start()).await?;
        if let Some(trail_id) = outcome.trail_id() {
            session.trail_id = Some(trail_id);
            session.trail_matched = true;
        }
        Some(outcome)
    };

    let route = usable_points(&track.points);
    let dropped = track.points.len() - route.len();
    if dropped > 0 {
        warn!(%user_id, dropped, "Dropping track points with malformed coordinates");
    }

    let mut tx = database
        .pool()
        .begin()
        .await
        .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

    SessionManager::insert_session(&mut tx, &session).await?;
    SessionManager::insert_route(&mut tx, session.id, &route).await?;
    let unlocked = achievements::evaluate_in(&mut tx, user_id).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit import: {e}")))?;

    info!(
        %user_id,
        session_id = %session.id,
        source = %track.source,
        points = route.len(),
        matched = session.trail_matched,
        "Track imported"
    );
    achievements::notify(notifier, user_id, &unlocked).await;

    Ok(ImportResult {
        session,
        outcome,
        route_points: route.len(),
        unlocked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackSource;

    fn track(source: TrackSource, points: Vec<TrackPoint>) -> NormalizedTrack {
        NormalizedTrack {
            source,
            name: Some("Karura loop".into()),
            points,
            summary: TrackSummary {
                distance_km: 5.0,
                elevation_gain_m: 120.0,
                duration_hours: 1.5,
            },
        }
    }

    fn point(latitude: f64, longitude: f64) -> TrackPoint {
        TrackPoint {
            latitude,
            longitude,
            elevation: None,
            timestamp: None,
        }
    }

    #[test]
    fn test_file_sources_are_accepted() {
        assert!(validate_import(&track(TrackSource::Gpx, vec![point(-1.23, 36.84)])).is_ok());
        assert!(validate_import(&track(TrackSource::Tcx, Vec::new())).is_ok());
    }

    #[test]
    fn test_non_file_sources_are_rejected() {
        let error = validate_import(&track(TrackSource::Strava, Vec::new())).unwrap_err();
        assert_eq!(error.http_status(), 400);
    }

    #[test]
    fn test_out_of_range_point_passes_validation() {
        assert!(validate_import(&track(TrackSource::Fit, vec![point(95.0, 36.0)])).is_ok());
    }

    #[test]
    fn test_malformed_points_are_left_out_of_route() {
        let points = vec![point(95.0, 36.0), point(-1.2, 36.8), point(f64::NAN, 36.8)];
        let route = usable_points(&points);
        assert_eq!(route, vec![point(-1.2, 36.8)]);
    }

    #[test]
    fn test_negative_summary_is_rejected() {
        let mut bad = track(TrackSource::Gpx, Vec::new());
        bad.summary.distance_km = -2.0;
        assert!(validate_import(&bad).is_err());
    }
}
