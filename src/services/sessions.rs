// ABOUTME: Manual session tracking: start, progress updates, completion, and re-matching
// ABOUTME: Completing a session and evaluating achievements commit together
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use chrono::Utc;
use kilele_intelligence::{TrailMatch, TrailMatcher};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{achievements, matching};
use crate::database::{Database, SessionManager};
use crate::errors::{AppError, AppResult};
use crate::models::{Coordinate, HikeSession, SessionProgressUpdate, UnlockedAchievement};
use crate::notifications::AchievementNotifier;

/// Session after an update plus anything the update unlocked
#[derive(Debug, Clone, Serialize)]
pub struct SessionUpdateResult {
    /// Stored session
    pub session: HikeSession,
    /// Achievements completed by this update
    pub unlocked: Vec<UnlockedAchievement>,
}

/// Session after a matching attempt
#[derive(Debug, Clone, Serialize)]
pub struct SessionMatchResult {
    /// Stored session
    pub session: HikeSession,
    /// Matcher outcome
    #[serde(rename = "match")]
    pub outcome: TrailMatch,
    /// Achievements completed because the session gained a trail
    pub unlocked: Vec<UnlockedAchievement>,
}

/// Start tracking a hike on an existing trail
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for an unknown trail and
/// `RESOURCE_ALREADY_EXISTS` when the user already has an active session on it
pub async fn start_session(
    database: &Database,
    user_id: Uuid,
    trail_id: Uuid,
) -> AppResult<HikeSession> {
    database.trails().require_trail(trail_id).await?;

    let session = HikeSession::start(user_id, trail_id);
    database.sessions().create_session(&session).await?;
    info!(%user_id, %trail_id, session_id = %session.id, "Session started");
    Ok(session)
}

/// Apply a progress update, completing the session when requested
///
/// # Errors
///
/// Returns `INVALID_INPUT` for invalid values, `RESOURCE_NOT_FOUND` for a
/// session the user does not own, and `RESOURCE_LOCKED` for a completed
/// session
pub async fn update_session(
    database: &Database,
    notifier: &dyn AchievementNotifier,
    user_id: Uuid,
    session_id: Uuid,
    update: &SessionProgressUpdate,
) -> AppResult<SessionUpdateResult> {
    update.validate()?;

    let mut session = database
        .sessions()
        .get_user_session(user_id, session_id)
        .await?;
    if session.is_completed() {
        return Err(AppError::locked("Session is already completed"));
    }

    update.apply_to(&mut session, Utc::now());

    let mut tx = database
        .pool()
        .begin()
        .await
        .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

    SessionManager::save_progress(&mut tx, &session).await?;
    let unlocked = if session.is_completed() {
        achievements::evaluate_in(&mut tx, user_id).await?
    } else {
        Vec::new()
    };

    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit session update: {e}")))?;

    if session.is_completed() {
        info!(%user_id, %session_id, distance_km = session.distance_covered_km, "Session completed");
    }
    achievements::notify(notifier, user_id, &unlocked).await;
    Ok(SessionUpdateResult { session, unlocked })
}

/// Re-run the matcher for a session without a trail
///
/// A session that already has a trail is returned unchanged with that
/// trail as the outcome.
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for a session the user does not own
pub async fn rematch_session(
    database: &Database,
    matcher: &TrailMatcher,
    notifier: &dyn AchievementNotifier,
    user_id: Uuid,
    session_id: Uuid,
) -> AppResult<SessionMatchResult> {
    let sessions = database.sessions();
    let session = sessions.get_user_session(user_id, session_id).await?;
    if let Some(trail_id) = session.trail_id {
        return Ok(SessionMatchResult {
            session,
            outcome: TrailMatch::Matched { trail_id },
            unlocked: Vec::new(),
        });
    }

    let start = session_start(database, &session).await?;
    let outcome = matching::match_trail(database, matcher, start).await?;

    let mut unlocked = Vec::new();
    if let Some(trail_id) = outcome.trail_id() {
        let mut tx = database
            .pool()
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let linked = SessionManager::link_matched_trail(&mut tx, session.id, trail_id).await?;
        if linked && session.is_completed() {
            unlocked = achievements::evaluate_in(&mut tx, user_id).await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit trail link: {e}")))?;

        if linked {
            info!(%user_id, %session_id, %trail_id, "Session linked to matched trail");
        }
        achievements::notify(notifier, user_id, &unlocked).await;
    }

    let session = sessions.get_user_session(user_id, session_id).await?;
    Ok(SessionMatchResult {
        session,
        outcome,
        unlocked,
    })
}

/// First recorded route point, falling back to the last reported position
async fn session_start(database: &Database, session: &HikeSession) -> AppResult<Option<Coordinate>> {
    let route = database.sessions().get_route(session.id).await?;
    if let Some(first) = route.first() {
        return Ok(Some(first.coordinate()));
    }
    Ok(match (session.current_latitude, session.current_longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinate {
            latitude,
            longitude,
        }),
        _ => None,
    })
}
