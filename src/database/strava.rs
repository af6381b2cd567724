// ABOUTME: Stored Strava connections used by the background activity sync
// ABOUTME: One access token per user plus the time of the last successful sync
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_optional_timestamp, parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};

/// A user's link to their Strava account
#[derive(Debug, Clone, Serialize)]
pub struct StravaConnection {
    /// Owning user
    pub user_id: Uuid,
    /// Bearer token for the Strava API
    #[serde(skip_serializing)]
    pub access_token: String,
    /// Strava athlete id, when known
    pub athlete_id: Option<String>,
    /// Last time activities were pulled successfully
    pub last_synced_at: Option<DateTime<Utc>>,
    /// When the connection was first stored
    pub created_at: DateTime<Utc>,
    /// When the token was last replaced
    pub updated_at: DateTime<Utc>,
}

/// Strava connection database operations manager
pub struct StravaConnectionManager {
    pool: SqlitePool,
}

impl StravaConnectionManager {
    /// Create a new connection manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store or replace a user's token
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn upsert_connection(
        &self,
        user_id: Uuid,
        access_token: &str,
        athlete_id: Option<&str>,
    ) -> AppResult<StravaConnection> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r"
            INSERT INTO strava_connections (user_id, access_token, athlete_id, last_synced_at, created_at, updated_at)
            VALUES ($1, $2, $3, NULL, $4, $4)
            ON CONFLICT(user_id) DO UPDATE SET
                access_token = excluded.access_token,
                athlete_id = COALESCE(excluded.athlete_id, strava_connections.athlete_id),
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id.to_string())
        .bind(access_token)
        .bind(athlete_id)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to store Strava connection: {e}")))?;

        self.get_connection(user_id)
            .await?
            .ok_or_else(|| AppError::internal("Strava connection vanished after upsert"))
    }

    /// Get a user's connection
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_connection(&self, user_id: Uuid) -> AppResult<Option<StravaConnection>> {
        let row = sqlx::query(
            r"
            SELECT user_id, access_token, athlete_id, last_synced_at, created_at, updated_at
            FROM strava_connections WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get Strava connection: {e}")))?;

        row.map(|r| Self::row_to_connection(&r)).transpose()
    }

    /// All stored connections, oldest sync first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_connections(&self) -> AppResult<Vec<StravaConnection>> {
        let rows = sqlx::query(
            r"
            SELECT user_id, access_token, athlete_id, last_synced_at, created_at, updated_at
            FROM strava_connections
            ORDER BY last_synced_at IS NOT NULL, last_synced_at
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list Strava connections: {e}")))?;

        rows.iter().map(Self::row_to_connection).collect()
    }

    /// Record a successful sync
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn mark_synced(&self, user_id: Uuid, synced_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE strava_connections SET last_synced_at = $1 WHERE user_id = $2")
            .bind(synced_at.to_rfc3339())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to mark Strava sync: {e}")))?;
        Ok(())
    }

    /// Remove a user's connection
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_connection(&self, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM strava_connections WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete Strava connection: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_connection(row: &SqliteRow) -> AppResult<StravaConnection> {
        let user_id: String = row.get("user_id");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");
        Ok(StravaConnection {
            user_id: parse_uuid(&user_id)?,
            access_token: row.get("access_token"),
            athlete_id: row.get("athlete_id"),
            last_synced_at: parse_optional_timestamp(row.get("last_synced_at"))?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}
