// ABOUTME: Goal database operations
// ABOUTME: Create, list by status, record progress, and delete user goals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_column, parse_optional_timestamp, parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{Goal, GoalStatus};

const GOAL_COLUMNS: &str = "id, user_id, title, description, goal_type, target_value, \
     current_value, deadline, status, completed_at, created_at, updated_at";

/// Goal database operations manager
pub struct GoalManager {
    pool: SqlitePool,
}

impl GoalManager {
    /// Create a new goal manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a goal
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn create_goal(&self, goal: &Goal) -> AppResult<()> {
        sqlx::query(&format!(
            r"
            INSERT INTO goals ({GOAL_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "
        ))
        .bind(goal.id.to_string())
        .bind(goal.user_id.to_string())
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.goal_type.as_str())
        .bind(goal.target_value)
        .bind(goal.current_value)
        .bind(goal.deadline.map(|t| t.to_rfc3339()))
        .bind(goal.status.as_str())
        .bind(goal.completed_at.map(|t| t.to_rfc3339()))
        .bind(goal.created_at.to_rfc3339())
        .bind(goal.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create goal: {e}")))?;
        Ok(())
    }

    /// Get a goal owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when missing or owned by someone else
    pub async fn get_user_goal(&self, user_id: Uuid, id: Uuid) -> AppResult<Goal> {
        let row = sqlx::query(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get goal: {e}")))?;

        row.map(|r| Self::row_to_goal(&r))
            .transpose()?
            .ok_or_else(|| AppError::not_found(format!("Goal {id}")))
    }

    /// A user's goals, newest first, optionally filtered by status
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_goals(&self, user_id: Uuid, status: Option<GoalStatus>) -> AppResult<Vec<Goal>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {GOAL_COLUMNS} FROM goals
            WHERE user_id = $1 AND ($2 IS NULL OR status = $2)
            ORDER BY created_at DESC
            "
        ))
        .bind(user_id.to_string())
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list goals: {e}")))?;

        rows.iter().map(Self::row_to_goal).collect()
    }

    /// Persist current value and status
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn save_progress(&self, goal: &Goal) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE goals
            SET current_value = $1, status = $2, completed_at = $3, updated_at = $4
            WHERE id = $5 AND user_id = $6
            ",
        )
        .bind(goal.current_value)
        .bind(goal.status.as_str())
        .bind(goal.completed_at.map(|t| t.to_rfc3339()))
        .bind(goal.updated_at.to_rfc3339())
        .bind(goal.id.to_string())
        .bind(goal.user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update goal: {e}")))?;
        Ok(())
    }

    /// Delete a goal owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_goal(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1 AND user_id = $2")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete goal: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_goal(row: &SqliteRow) -> AppResult<Goal> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let goal_type: String = row.get("goal_type");
        let status: String = row.get("status");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(Goal {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            title: row.get("title"),
            description: row.get("description"),
            goal_type: parse_column(&goal_type)?,
            target_value: row.get("target_value"),
            current_value: row.get("current_value"),
            deadline: parse_optional_timestamp(row.get("deadline"))?,
            status: parse_column(&status)?,
            completed_at: parse_optional_timestamp(row.get("completed_at"))?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}
