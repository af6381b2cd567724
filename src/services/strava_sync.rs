// ABOUTME: Imports one user's recent Strava activities as completed sessions
// ABOUTME: Re-imported activities refresh their existing session instead of duplicating it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use chrono::{Duration, Utc};
use kilele_intelligence::TrailMatcher;
use serde::Serialize;
use tracing::{debug, info};

use super::{achievements, matching};
use crate::database::{Database, SessionManager, StravaConnection, UpsertOutcome};
use crate::errors::{AppError, AppResult};
use crate::models::UnlockedAchievement;
use crate::notifications::AchievementNotifier;
use crate::providers::ActivityFeed;

/// What one user's sync did
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserSyncOutcome {
    /// Activities returned by the feed
    pub fetched: usize,
    /// New sessions created
    pub imported: usize,
    /// Existing sessions refreshed
    pub updated: usize,
    /// Activities whose start matched a trail
    pub matched: usize,
    /// Activities ignored because of their type
    pub skipped: usize,
    /// Achievements completed by the imported sessions
    pub unlocked: Vec<UnlockedAchievement>,
}

/// Shared dependencies of a sync run
pub struct SyncContext<'a> {
    /// Storage
    pub database: &'a Database,
    /// Trail matcher
    pub matcher: &'a TrailMatcher,
    /// Unlock notifier
    pub notifier: &'a dyn AchievementNotifier,
    /// Activity source
    pub feed: &'a dyn ActivityFeed,
    /// How far back to fetch
    pub lookback_days: i64,
}

/// Pull and store recent activities for one connected user
///
/// Trails are matched before the write transaction; all sessions plus the
/// achievement upserts commit together, and the connection is marked synced
/// afterwards.
///
/// # Errors
///
/// Returns an error if the feed fails or any write fails; nothing from this
/// user's run is persisted in that case
pub async fn sync_user(
    context: &SyncContext<'_>,
    connection: &StravaConnection,
) -> AppResult<UserSyncOutcome> {
    let user_id = connection.user_id;
    let now = Utc::now();
    let after = now - Duration::days(context.lookback_days.max(1));

    let activities = context
        .feed
        .recent_activities(&connection.access_token, after)
        .await?;

    let mut outcome = UserSyncOutcome {
        fetched: activities.len(),
        ..UserSyncOutcome::default()
    };

    let mut sessions = Vec::with_capacity(activities.len());
    for activity in &activities {
        if !activity.is_importable() {
            debug!(%user_id, activity_id = activity.id, kind = %activity.activity_type, "Skipping activity type");
            outcome.skipped += 1;
            continue;
        }
        let mut session = activity.to_session(user_id, now);
        let matched =
            matching::match_trail(context.database, context.matcher, activity.start_coordinate())
                .await?;
        if let Some(trail_id) = matched.trail_id() {
            session.trail_id = Some(trail_id);
            session.trail_matched = true;
            outcome.matched += 1;
        }
        sessions.push(session);
    }

    let mut tx = context
        .database
        .pool()
        .begin()
        .await
        .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

    for session in &sessions {
        match SessionManager::upsert_external(&mut tx, session).await?.1 {
            UpsertOutcome::Inserted => outcome.imported += 1,
            UpsertOutcome::Updated => outcome.updated += 1,
        }
    }
    outcome.unlocked = if sessions.is_empty() {
        Vec::new()
    } else {
        achievements::evaluate_in(&mut tx, user_id).await?
    };

    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit Strava import: {e}")))?;

    context.database.strava().mark_synced(user_id, now).await?;
    achievements::notify(context.notifier, user_id, &outcome.unlocked).await;

    info!(
        %user_id,
        fetched = outcome.fetched,
        imported = outcome.imported,
        updated = outcome.updated,
        matched = outcome.matched,
        "Strava activities synced"
    );
    Ok(outcome)
}
