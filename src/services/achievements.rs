// ABOUTME: Achievement evaluation as a single unit of work over one connection
// ABOUTME: Reads sessions, social counts, catalog, and stored progress, then upserts the merged plan
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use chrono::Utc;
use kilele_intelligence::{aggregate, AchievementEvaluator, EvaluationContext, ProgressStats};
use sqlx::SqliteConnection;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::{AchievementManager, Database, SessionManager, SocialManager};
use crate::errors::{AppError, AppResult};
use crate::models::UnlockedAchievement;
use crate::notifications::AchievementNotifier;

/// Evaluate every achievement for `user_id` on an open connection or transaction
///
/// Nothing is committed here; the caller owns the transaction so that the
/// write that triggered the evaluation and the achievement upserts land
/// together.
///
/// # Errors
///
/// Returns an error if any read or upsert fails
pub async fn evaluate_in(
    conn: &mut SqliteConnection,
    user_id: Uuid,
) -> AppResult<Vec<UnlockedAchievement>> {
    let records = SessionManager::session_records(conn, user_id).await?;
    let progress = aggregate(&records);
    let social = SocialManager::counts(conn, user_id).await?;
    let catalog = AchievementManager::catalog(conn).await?;
    let existing = AchievementManager::user_records(conn, user_id).await?;

    let now = Utc::now();
    let context = EvaluationContext {
        progress: &progress,
        social: &social,
    };
    let plan = AchievementEvaluator::plan(&catalog, &existing, &context, now);
    debug!(
        %user_id,
        changes = plan.changes.len(),
        unlocked = plan.unlocked.len(),
        "Achievement evaluation planned"
    );

    AchievementManager::apply_changes(conn, user_id, &plan.changes, now).await?;
    Ok(plan.unlocked)
}

/// Evaluate achievements in a fresh transaction, then notify
///
/// # Errors
///
/// Returns an error if the transaction cannot be opened or committed, or if
/// evaluation fails; in that case nothing is persisted
pub async fn evaluate_for_user(
    database: &Database,
    notifier: &dyn AchievementNotifier,
    user_id: Uuid,
) -> AppResult<Vec<UnlockedAchievement>> {
    let mut tx = database
        .pool()
        .begin()
        .await
        .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

    let unlocked = evaluate_in(&mut tx, user_id).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit achievements: {e}")))?;

    notify(notifier, user_id, &unlocked).await;
    Ok(unlocked)
}

/// Hand committed unlocks to the notifier, skipping empty runs
pub async fn notify(
    notifier: &dyn AchievementNotifier,
    user_id: Uuid,
    unlocked: &[UnlockedAchievement],
) {
    if unlocked.is_empty() {
        return;
    }
    info!(%user_id, count = unlocked.len(), "Achievements unlocked");
    notifier.achievements_unlocked(user_id, unlocked).await;
}

/// Recompute lifetime statistics for `user_id`
///
/// # Errors
///
/// Returns an error if the session query fails
pub async fn progress_stats(database: &Database, user_id: Uuid) -> AppResult<ProgressStats> {
    let records = database.sessions().get_session_records(user_id).await?;
    Ok(aggregate(&records))
}
