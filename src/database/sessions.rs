// ABOUTME: Hike session database operations for manual tracking, wearable imports, and Strava sync
// ABOUTME: Session CRUD, recorded routes, external-id upserts, and aggregation input rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use chrono::Utc;
use kilele_intelligence::SessionRecord;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{
    is_unique_violation, parse_column, parse_optional_timestamp, parse_optional_uuid,
    parse_timestamp, parse_uuid,
};
use crate::errors::{AppError, AppResult};
use crate::models::{HikeSession, SessionStatus, TrackPoint, TrackSource};

const SESSION_COLUMNS: &str = "id, user_id, trail_id, trail_matched, source, external_id, name, \
     status, started_at, ended_at, distance_covered_km, elevation_gain_m, duration_hours, \
     current_latitude, current_longitude, notes, rating, created_at, updated_at";

/// Whether an external upsert inserted or refreshed a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// New session created
    Inserted,
    /// Existing session refreshed
    Updated,
}

/// Hike session database operations manager
pub struct SessionManager {
    pool: SqlitePool,
}

impl SessionManager {
    /// Create a new session manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Insert a session on an existing connection
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` when the user already has an active
    /// session on the trail, or a database error
    pub async fn insert_session(conn: &mut SqliteConnection, session: &HikeSession) -> AppResult<()> {
        sqlx::query(&format!(
            r"
            INSERT INTO hike_sessions ({SESSION_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "
        ))
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(session.trail_id.map(|id| id.to_string()))
        .bind(session.trail_matched)
        .bind(session.source.as_str())
        .bind(&session.external_id)
        .bind(&session.name)
        .bind(session.status.as_str())
        .bind(session.started_at.to_rfc3339())
        .bind(session.ended_at.map(|t| t.to_rfc3339()))
        .bind(session.distance_covered_km)
        .bind(session.elevation_gain_m)
        .bind(session.duration_hours)
        .bind(session.current_latitude)
        .bind(session.current_longitude)
        .bind(&session.notes)
        .bind(session.rating)
        .bind(session.created_at.to_rfc3339())
        .bind(session.updated_at.to_rfc3339())
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists("An active session already exists for this trail")
            } else {
                AppError::database(format!("Failed to create session: {e}"))
            }
        })?;
        Ok(())
    }

    /// Insert a session using the pool
    ///
    /// # Errors
    ///
    /// See [`Self::insert_session`]
    pub async fn create_session(&self, session: &HikeSession) -> AppResult<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        Self::insert_session(&mut conn, session).await
    }

    /// Persist progress fields and status on an existing connection
    ///
    /// Only an active row is updated, so two racing completions cannot both
    /// succeed.
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_LOCKED` if the row is no longer active, or a
    /// database error
    pub async fn save_progress(conn: &mut SqliteConnection, session: &HikeSession) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE hike_sessions
            SET status = $1, ended_at = $2, distance_covered_km = $3, elevation_gain_m = $4,
                duration_hours = $5, current_latitude = $6, current_longitude = $7, notes = $8,
                rating = $9, updated_at = $10
            WHERE id = $11 AND status = 'active'
            ",
        )
        .bind(session.status.as_str())
        .bind(session.ended_at.map(|t| t.to_rfc3339()))
        .bind(session.distance_covered_km)
        .bind(session.elevation_gain_m)
        .bind(session.duration_hours)
        .bind(session.current_latitude)
        .bind(session.current_longitude)
        .bind(&session.notes)
        .bind(session.rating)
        .bind(session.updated_at.to_rfc3339())
        .bind(session.id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to update session: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::locked(format!(
                "Session {} is no longer active",
                session.id
            )));
        }
        Ok(())
    }

    /// Link a matched trail on an existing connection, only if the session
    /// has no trail yet
    ///
    /// Returns `false` when the session was already linked, which keeps
    /// repeated matching a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn link_matched_trail(
        conn: &mut SqliteConnection,
        session_id: Uuid,
        trail_id: Uuid,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE hike_sessions
            SET trail_id = $1, trail_matched = 1, updated_at = $2
            WHERE id = $3 AND trail_id IS NULL
            ",
        )
        .bind(trail_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .bind(session_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to link trail: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert or refresh a session identified by its external id
    ///
    /// An existing row keeps its id and trail link; measurements and name are
    /// refreshed, and a trail is only filled in when none was set.
    ///
    /// # Errors
    ///
    /// Returns an error if the session has no external id or a query fails
    pub async fn upsert_external(
        conn: &mut SqliteConnection,
        session: &HikeSession,
    ) -> AppResult<(Uuid, UpsertOutcome)> {
        let external_id = session
            .external_id
            .as_deref()
            .ok_or_else(|| AppError::internal("External upsert requires an external id"))?;

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id FROM hike_sessions WHERE user_id = $1 AND source = $2 AND external_id = $3",
        )
        .bind(session.user_id.to_string())
        .bind(session.source.as_str())
        .bind(external_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to look up external session: {e}")))?;

        let Some(existing) = existing else {
            Self::insert_session(conn, session).await?;
            return Ok((session.id, UpsertOutcome::Inserted));
        };

        sqlx::query(
            r"
            UPDATE hike_sessions
            SET name = $1, started_at = $2, ended_at = $3, distance_covered_km = $4,
                elevation_gain_m = $5, duration_hours = $6, updated_at = $7,
                trail_matched = CASE WHEN trail_id IS NULL AND $8 IS NOT NULL THEN $9 ELSE trail_matched END,
                trail_id = COALESCE(trail_id, $8)
            WHERE id = $10
            ",
        )
        .bind(&session.name)
        .bind(session.started_at.to_rfc3339())
        .bind(session.ended_at.map(|t| t.to_rfc3339()))
        .bind(session.distance_covered_km)
        .bind(session.elevation_gain_m)
        .bind(session.duration_hours)
        .bind(session.updated_at.to_rfc3339())
        .bind(session.trail_id.map(|id| id.to_string()))
        .bind(session.trail_matched)
        .bind(&existing)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to refresh external session: {e}")))?;

        Ok((parse_uuid(&existing)?, UpsertOutcome::Updated))
    }

    /// Delete a session owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_session(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM hike_sessions WHERE id = $1 AND user_id = $2")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete session: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Routes
    // ========================================================================

    /// Store the ordered points of a recorded track
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails
    pub async fn insert_route(
        conn: &mut SqliteConnection,
        session_id: Uuid,
        points: &[TrackPoint],
    ) -> AppResult<()> {
        for (seq, point) in points.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO session_route_points (session_id, seq, latitude, longitude, elevation, recorded_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(session_id.to_string())
            .bind(seq as i64)
            .bind(point.latitude)
            .bind(point.longitude)
            .bind(point.elevation)
            .bind(point.timestamp.map(|t| t.to_rfc3339()))
            .execute(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to store route point: {e}")))?;
        }
        Ok(())
    }

    /// Recorded route of a session in order
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_route(&self, session_id: Uuid) -> AppResult<Vec<TrackPoint>> {
        let rows = sqlx::query(
            r"
            SELECT latitude, longitude, elevation, recorded_at
            FROM session_route_points
            WHERE session_id = $1
            ORDER BY seq ASC
            ",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get route: {e}")))?;

        rows.iter()
            .map(|row| {
                Ok(TrackPoint {
                    latitude: row.get("latitude"),
                    longitude: row.get("longitude"),
                    elevation: row.get("elevation"),
                    timestamp: parse_optional_timestamp(row.get("recorded_at"))?,
                })
            })
            .collect()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Get a session by id regardless of owner
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_session(&self, id: Uuid) -> AppResult<Option<HikeSession>> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM hike_sessions WHERE id = $1"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get session: {e}")))?;

        row.map(|r| Self::row_to_session(&r)).transpose()
    }

    /// Get a session owned by `user_id`; other users' sessions are reported as missing
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` or a database error
    pub async fn get_user_session(&self, user_id: Uuid, id: Uuid) -> AppResult<HikeSession> {
        self.get_session(id)
            .await?
            .filter(|session| session.user_id == user_id)
            .ok_or_else(|| AppError::not_found(format!("Session {id}")))
    }

    /// A user's sessions, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_sessions(
        &self,
        user_id: Uuid,
        status: Option<SessionStatus>,
    ) -> AppResult<Vec<HikeSession>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {SESSION_COLUMNS} FROM hike_sessions
            WHERE user_id = $1 AND ($2 IS NULL OR status = $2)
            ORDER BY started_at DESC
            "
        ))
        .bind(user_id.to_string())
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list sessions: {e}")))?;

        rows.iter().map(Self::row_to_session).collect()
    }

    /// Sessions joined with trail difficulty and location, for aggregation
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn session_records(
        conn: &mut SqliteConnection,
        user_id: Uuid,
    ) -> AppResult<Vec<SessionRecord>> {
        let rows = sqlx::query(
            r"
            SELECT s.id, s.trail_id, s.status, s.distance_covered_km, s.elevation_gain_m,
                   s.duration_hours, t.difficulty, t.location
            FROM hike_sessions s
            LEFT JOIN trails t ON t.id = s.trail_id
            WHERE s.user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to load session records: {e}")))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    /// Aggregation rows using the pool
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_session_records(&self, user_id: Uuid) -> AppResult<Vec<SessionRecord>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        Self::session_records(&mut conn, user_id).await
    }

    fn row_to_record(row: &SqliteRow) -> AppResult<SessionRecord> {
        let id: String = row.get("id");
        let status: String = row.get("status");
        let difficulty: Option<String> = row.get("difficulty");

        Ok(SessionRecord {
            session_id: parse_uuid(&id)?,
            trail_id: parse_optional_uuid(row.get("trail_id"))?,
            status: parse_column(&status)?,
            distance_km: row.get("distance_covered_km"),
            elevation_gain_m: row.get("elevation_gain_m"),
            duration_hours: row.get("duration_hours"),
            trail_difficulty: difficulty.as_deref().map(parse_column).transpose()?,
            trail_location: row.get("location"),
        })
    }

    fn row_to_session(row: &SqliteRow) -> AppResult<HikeSession> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let source: String = row.get("source");
        let status: String = row.get("status");
        let started_at: String = row.get("started_at");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(HikeSession {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            trail_id: parse_optional_uuid(row.get("trail_id"))?,
            trail_matched: row.get("trail_matched"),
            source: parse_column::<TrackSource>(&source)?,
            external_id: row.get("external_id"),
            name: row.get("name"),
            status: parse_column(&status)?,
            started_at: parse_timestamp(&started_at)?,
            ended_at: parse_optional_timestamp(row.get("ended_at"))?,
            distance_covered_km: row.get("distance_covered_km"),
            elevation_gain_m: row.get("elevation_gain_m"),
            duration_hours: row.get("duration_hours"),
            current_latitude: row.get("current_latitude"),
            current_longitude: row.get("current_longitude"),
            notes: row.get("notes"),
            rating: row.get("rating"),
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

