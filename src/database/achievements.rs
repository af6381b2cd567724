// ABOUTME: Achievement catalog and per-user progress database operations
// ABOUTME: Idempotent catalog seeding and monotonic user_achievements upserts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use chrono::{DateTime, Utc};
use kilele_intelligence::{AchievementSeed, ProgressChange};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::{parse_optional_timestamp, parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{Achievement, AchievementCategory, AchievementProgress, UserAchievement};

const ACHIEVEMENT_COLUMNS: &str =
    "id, name, description, icon, category, metric, requirement, points";

/// Achievement database operations manager
pub struct AchievementManager {
    pool: SqlitePool,
}

impl AchievementManager {
    /// Create a new achievement manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Insert every seed whose name is not present yet
    ///
    /// Returns how many entries were added; re-running adds none.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub async fn seed_catalog(&self, seeds: &[AchievementSeed]) -> AppResult<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let mut inserted = 0;
        for seed in seeds {
            let achievement = seed.to_achievement();
            let result = sqlx::query(&format!(
                r"
                INSERT INTO achievements ({ACHIEVEMENT_COLUMNS})
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (name) DO NOTHING
                "
            ))
            .bind(achievement.id.to_string())
            .bind(&achievement.name)
            .bind(&achievement.description)
            .bind(&achievement.icon)
            .bind(achievement.category.as_str())
            .bind(&achievement.metric)
            .bind(achievement.requirement)
            .bind(achievement.points)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to seed achievement: {e}")))?;
            inserted += usize::from(result.rows_affected() > 0);
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit catalog seed: {e}")))?;
        info!(inserted, total = seeds.len(), "Achievement catalog seeded");
        Ok(inserted)
    }

    /// The full catalog on an existing connection
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn catalog(conn: &mut SqliteConnection) -> AppResult<Vec<Achievement>> {
        let rows = sqlx::query(&format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements ORDER BY category, requirement, name"
        ))
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to list achievements: {e}")))?;

        rows.iter().map(Self::row_to_achievement).collect()
    }

    /// The full catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_achievements(&self) -> AppResult<Vec<Achievement>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        Self::catalog(&mut conn).await
    }

    // ========================================================================
    // User progress
    // ========================================================================

    /// Stored progress rows for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn user_records(
        conn: &mut SqliteConnection,
        user_id: Uuid,
    ) -> AppResult<Vec<UserAchievement>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, achievement_id, progress, completed, earned_at, updated_at
            FROM user_achievements
            WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to load user achievements: {e}")))?;

        rows.iter().map(Self::row_to_user_achievement).collect()
    }

    /// Persist merged progress
    ///
    /// The SQL keeps the larger progress and never clears completion, so a
    /// stale writer cannot regress a record.
    ///
    /// # Errors
    ///
    /// Returns an error if any upsert fails
    pub async fn apply_changes(
        conn: &mut SqliteConnection,
        user_id: Uuid,
        changes: &[ProgressChange],
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        for change in changes {
            sqlx::query(
                r"
                INSERT INTO user_achievements (id, user_id, achievement_id, progress, completed, earned_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (user_id, achievement_id) DO UPDATE SET
                    progress = MAX(user_achievements.progress, excluded.progress),
                    completed = MAX(user_achievements.completed, excluded.completed),
                    earned_at = COALESCE(user_achievements.earned_at, excluded.earned_at),
                    updated_at = excluded.updated_at
                ",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(user_id.to_string())
            .bind(change.achievement_id.to_string())
            .bind(change.progress)
            .bind(change.completed)
            .bind(change.earned_at.map(|t| t.to_rfc3339()))
            .bind(now.to_rfc3339())
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to record achievement progress: {e}"))
            })?;
        }
        Ok(())
    }

    /// Catalog joined with the user's progress; entries never touched show zero
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_user_progress(&self, user_id: Uuid) -> AppResult<Vec<AchievementProgress>> {
        let rows = sqlx::query(
            r"
            SELECT a.id, a.name, a.description, a.icon, a.category, a.metric, a.requirement, a.points,
                   COALESCE(ua.progress, 0.0) AS progress,
                   COALESCE(ua.completed, 0) AS completed,
                   ua.earned_at
            FROM achievements a
            LEFT JOIN user_achievements ua ON ua.achievement_id = a.id AND ua.user_id = $1
            ORDER BY ua.completed DESC, a.category, a.requirement, a.name
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list user achievements: {e}")))?;

        rows.iter()
            .map(|row| {
                Ok(AchievementProgress {
                    achievement: Self::row_to_achievement(row)?,
                    progress: row.get("progress"),
                    completed: row.get("completed"),
                    earned_at: parse_optional_timestamp(row.get("earned_at"))?,
                })
            })
            .collect()
    }

    /// Sum of points over completed achievements
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn total_points(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            r"
            SELECT COALESCE(SUM(a.points), 0)
            FROM user_achievements ua
            JOIN achievements a ON a.id = ua.achievement_id
            WHERE ua.user_id = $1 AND ua.completed = 1
            ",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to sum achievement points: {e}")))
    }

    fn row_to_achievement(row: &SqliteRow) -> AppResult<Achievement> {
        let id: String = row.get("id");
        let category: String = row.get("category");
        Ok(Achievement {
            id: parse_uuid(&id)?,
            name: row.get("name"),
            description: row.get("description"),
            icon: row.get("icon"),
            category: AchievementCategory::from(category),
            metric: row.get("metric"),
            requirement: row.get("requirement"),
            points: row.get("points"),
        })
    }

    fn row_to_user_achievement(row: &SqliteRow) -> AppResult<UserAchievement> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let achievement_id: String = row.get("achievement_id");
        let updated_at: String = row.get("updated_at");
        Ok(UserAchievement {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            achievement_id: parse_uuid(&achievement_id)?,
            progress: row.get("progress"),
            completed: row.get("completed"),
            earned_at: parse_optional_timestamp(row.get("earned_at"))?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}
