// ABOUTME: Trail reference data database operations
// ABOUTME: CRUD with filtering plus the bounding-box candidate query used by trail matching
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use chrono::Utc;
use kilele_intelligence::{BoundingBox, TrailLocation};
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_column, parse_timestamp, parse_uuid};
use crate::constants::limits;
use crate::errors::{AppError, AppResult};
use crate::models::{Coordinate, Difficulty, Trail, TrailInput};

const TRAIL_COLUMNS: &str = "id, name, location, difficulty, distance_km, elevation_gain_m, \
     duration_hours, description, latitude, longitude, created_at, updated_at";

/// Listing filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrailFilter {
    /// Only this difficulty
    pub difficulty: Option<Difficulty>,
    /// Case-insensitive substring of the location
    pub location: Option<String>,
    /// Page size
    pub limit: Option<i64>,
    /// Rows to skip
    pub offset: Option<i64>,
}

impl TrailFilter {
    /// Clamped `(limit, offset)`
    #[must_use]
    pub fn page(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(limits::DEFAULT_PAGE_SIZE)
            .clamp(1, limits::MAX_PAGE_SIZE);
        (limit, self.offset.unwrap_or(0).max(0))
    }
}

/// Trail database operations manager
pub struct TrailManager {
    pool: SqlitePool,
}

impl TrailManager {
    /// Create a new trail manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Validate and insert a trail
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for bad fields or a database error
    pub async fn create_trail(&self, input: &TrailInput) -> AppResult<Trail> {
        input.validate()?;
        let now = Utc::now();
        let trail = Trail {
            id: Uuid::new_v4(),
            name: input.name.trim().to_owned(),
            location: input.location.trim().to_owned(),
            difficulty: input.difficulty,
            distance_km: input.distance_km,
            elevation_gain_m: input.elevation_gain_m,
            duration_hours: input.duration_hours,
            description: input.description.clone(),
            latitude: input.latitude,
            longitude: input.longitude,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r"
            INSERT INTO trails (id, name, location, difficulty, distance_km, elevation_gain_m,
                                duration_hours, description, latitude, longitude, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ",
        )
        .bind(trail.id.to_string())
        .bind(&trail.name)
        .bind(&trail.location)
        .bind(trail.difficulty.as_str())
        .bind(trail.distance_km)
        .bind(trail.elevation_gain_m)
        .bind(trail.duration_hours)
        .bind(&trail.description)
        .bind(trail.latitude)
        .bind(trail.longitude)
        .bind(trail.created_at.to_rfc3339())
        .bind(trail.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create trail: {e}")))?;

        Ok(trail)
    }

    /// Get a trail by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_trail(&self, id: Uuid) -> AppResult<Option<Trail>> {
        let row = sqlx::query(&format!("SELECT {TRAIL_COLUMNS} FROM trails WHERE id = $1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get trail: {e}")))?;

        row.map(|r| Self::row_to_trail(&r)).transpose()
    }

    /// Get a trail or fail with `RESOURCE_NOT_FOUND`
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` or a database error
    pub async fn require_trail(&self, id: Uuid) -> AppResult<Trail> {
        self.get_trail(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Trail {id}")))
    }

    /// List trails ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_trails(&self, filter: &TrailFilter) -> AppResult<Vec<Trail>> {
        let (limit, offset) = filter.page();
        let location = filter
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| format!("%{}%", l.to_lowercase()));

        let rows = sqlx::query(&format!(
            r"
            SELECT {TRAIL_COLUMNS} FROM trails
            WHERE ($1 IS NULL OR difficulty = $1)
              AND ($2 IS NULL OR lower(location) LIKE $2)
            ORDER BY name ASC
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(filter.difficulty.map(|d| d.as_str()))
        .bind(location)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list trails: {e}")))?;

        rows.iter().map(Self::row_to_trail).collect()
    }

    /// Replace a trail's fields
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT`, `RESOURCE_NOT_FOUND`, or a database error
    pub async fn update_trail(&self, id: Uuid, input: &TrailInput) -> AppResult<Trail> {
        input.validate()?;
        let result = sqlx::query(
            r"
            UPDATE trails
            SET name = $1, location = $2, difficulty = $3, distance_km = $4, elevation_gain_m = $5,
                duration_hours = $6, description = $7, latitude = $8, longitude = $9, updated_at = $10
            WHERE id = $11
            ",
        )
        .bind(input.name.trim())
        .bind(input.location.trim())
        .bind(input.difficulty.as_str())
        .bind(input.distance_km)
        .bind(input.elevation_gain_m)
        .bind(input.duration_hours)
        .bind(&input.description)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update trail: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Trail {id}")));
        }
        self.require_trail(id).await
    }

    /// Delete a trail; sessions keep their data with the link and the
    /// matched flag cleared
    ///
    /// # Errors
    ///
    /// Returns an error if a query or the transaction fails
    pub async fn delete_trail(&self, id: Uuid) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("UPDATE hike_sessions SET trail_matched = 0 WHERE trail_id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to unlink sessions: {e}")))?;

        let result = sqlx::query("DELETE FROM trails WHERE id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete trail: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit trail delete: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    /// Trailheads inside an inclusive bounding box
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn trails_in_box(&self, search_box: &BoundingBox) -> AppResult<Vec<TrailLocation>> {
        let rows = sqlx::query(
            r"
            SELECT id, latitude, longitude FROM trails
            WHERE latitude BETWEEN $1 AND $2
              AND longitude BETWEEN $3 AND $4
            ",
        )
        .bind(search_box.min_latitude)
        .bind(search_box.max_latitude)
        .bind(search_box.min_longitude)
        .bind(search_box.max_longitude)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to query nearby trails: {e}")))?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                Ok(TrailLocation {
                    trail_id: parse_uuid(&id)?,
                    trailhead: Coordinate {
                        latitude: row.get("latitude"),
                        longitude: row.get("longitude"),
                    },
                })
            })
            .collect()
    }

    fn row_to_trail(row: &SqliteRow) -> AppResult<Trail> {
        let id: String = row.get("id");
        let difficulty: String = row.get("difficulty");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(Trail {
            id: parse_uuid(&id)?,
            name: row.get("name"),
            location: row.get("location"),
            difficulty: parse_column(&difficulty)?,
            distance_km: row.get("distance_km"),
            elevation_gain_m: row.get("elevation_gain_m"),
            duration_hours: row.get("duration_hours"),
            description: row.get("description"),
            latitude: row.get("latitude"),
            longitude: row.get("longitude"),
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}
