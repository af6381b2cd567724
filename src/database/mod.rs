// ABOUTME: SQLite persistence for trails, sessions, achievements, goals, social data, and Strava links
// ABOUTME: Owns the connection pool, runs idempotent schema migrations, and hands out managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

//! # Database Management
//!
//! A single [`Database`] wraps the `SqlitePool`. Each table family has a
//! manager (`TrailManager`, `SessionManager`, ...) holding a pool clone and
//! exposing explicit query functions. Functions that must join a larger unit
//! of work take a `&mut SqliteConnection` so callers can pass `&mut *tx`.

/// Achievement catalog and per-user progress
pub mod achievements;
/// User goals
pub mod goals;
/// Hike sessions and their recorded routes
pub mod sessions;
/// Reviews, votes, bookmarks, and follows
pub mod social;
/// Stored Strava access tokens
pub mod strava;
/// Trail reference data
pub mod trails;
/// Accounts
pub mod users;

pub use achievements::AchievementManager;
pub use goals::GoalManager;
pub use sessions::{SessionManager, UpsertOutcome};
pub use social::SocialManager;
pub use strava::{StravaConnection, StravaConnectionManager};
pub use trails::{TrailFilter, TrailManager};
pub use users::UserManager;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::DatabaseUrl;
use crate::errors::{AppError, AppResult};

const FILE_POOL_MAX_CONNECTIONS: u32 = 8;

/// Schema statements, applied in order on every start
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "users",
        r"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT,
            password_hash TEXT NOT NULL,
            is_admin INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        ",
    ),
    (
        "trails",
        r"
        CREATE TABLE IF NOT EXISTS trails (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            location TEXT NOT NULL,
            difficulty TEXT NOT NULL CHECK (difficulty IN ('easy', 'moderate', 'hard', 'extreme')),
            distance_km REAL NOT NULL,
            elevation_gain_m REAL,
            duration_hours REAL NOT NULL,
            description TEXT,
            latitude REAL,
            longitude REAL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        ",
    ),
    (
        "idx_trails_coordinates",
        "CREATE INDEX IF NOT EXISTS idx_trails_coordinates ON trails (latitude, longitude)",
    ),
    (
        "hike_sessions",
        r"
        CREATE TABLE IF NOT EXISTS hike_sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            trail_id TEXT REFERENCES trails (id) ON DELETE SET NULL,
            trail_matched INTEGER NOT NULL DEFAULT 0,
            source TEXT NOT NULL DEFAULT 'manual',
            external_id TEXT,
            name TEXT,
            status TEXT NOT NULL CHECK (status IN ('active', 'completed')),
            started_at TEXT NOT NULL,
            ended_at TEXT,
            distance_covered_km REAL NOT NULL DEFAULT 0,
            elevation_gain_m REAL NOT NULL DEFAULT 0,
            duration_hours REAL NOT NULL DEFAULT 0,
            current_latitude REAL,
            current_longitude REAL,
            notes TEXT,
            rating INTEGER CHECK (rating IS NULL OR rating BETWEEN 1 AND 5),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, source, external_id)
        )
        ",
    ),
    (
        "idx_hike_sessions_user",
        "CREATE INDEX IF NOT EXISTS idx_hike_sessions_user ON hike_sessions (user_id, started_at)",
    ),
    (
        "idx_hike_sessions_one_active",
        r"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_hike_sessions_one_active
        ON hike_sessions (user_id, trail_id) WHERE status = 'active'
        ",
    ),
    (
        "session_route_points",
        r"
        CREATE TABLE IF NOT EXISTS session_route_points (
            session_id TEXT NOT NULL REFERENCES hike_sessions (id) ON DELETE CASCADE,
            seq INTEGER NOT NULL,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL,
            elevation REAL,
            recorded_at TEXT,
            PRIMARY KEY (session_id, seq)
        )
        ",
    ),
    (
        "achievements",
        r"
        CREATE TABLE IF NOT EXISTS achievements (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            icon TEXT,
            category TEXT NOT NULL,
            metric TEXT,
            requirement REAL NOT NULL,
            points INTEGER NOT NULL DEFAULT 0
        )
        ",
    ),
    (
        "user_achievements",
        r"
        CREATE TABLE IF NOT EXISTS user_achievements (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            achievement_id TEXT NOT NULL REFERENCES achievements (id) ON DELETE CASCADE,
            progress REAL NOT NULL DEFAULT 0,
            completed INTEGER NOT NULL DEFAULT 0,
            earned_at TEXT,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, achievement_id)
        )
        ",
    ),
    (
        "goals",
        r"
        CREATE TABLE IF NOT EXISTS goals (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT,
            goal_type TEXT NOT NULL,
            target_value REAL NOT NULL CHECK (target_value > 0),
            current_value REAL NOT NULL DEFAULT 0,
            deadline TEXT,
            status TEXT NOT NULL CHECK (status IN ('active', 'completed', 'failed')),
            completed_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        ",
    ),
    (
        "reviews",
        r"
        CREATE TABLE IF NOT EXISTS reviews (
            id TEXT PRIMARY KEY,
            trail_id TEXT NOT NULL REFERENCES trails (id) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            comment TEXT,
            helpful_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        ",
    ),
    (
        "review_votes",
        r"
        CREATE TABLE IF NOT EXISTS review_votes (
            review_id TEXT NOT NULL REFERENCES reviews (id) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            PRIMARY KEY (review_id, user_id)
        )
        ",
    ),
    (
        "bookmarks",
        r"
        CREATE TABLE IF NOT EXISTS bookmarks (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            trail_id TEXT NOT NULL REFERENCES trails (id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            UNIQUE (user_id, trail_id)
        )
        ",
    ),
    (
        "follows",
        r"
        CREATE TABLE IF NOT EXISTS follows (
            follower_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            following_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            PRIMARY KEY (follower_id, following_id),
            CHECK (follower_id <> following_id)
        )
        ",
    ),
    (
        "strava_connections",
        r"
        CREATE TABLE IF NOT EXISTS strava_connections (
            user_id TEXT PRIMARY KEY REFERENCES users (id) ON DELETE CASCADE,
            access_token TEXT NOT NULL,
            athlete_id TEXT,
            last_synced_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        ",
    ),
];

/// Connection pool plus manager factories
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the file cannot be opened, or
    /// a migration fails
    pub async fn new(url: &DatabaseUrl) -> AppResult<Self> {
        if let DatabaseUrl::SQLite { path } = url {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::config(format!(
                        "Failed to create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(&url.to_connection_string())
            .map_err(|e| AppError::config(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives and dies with its single connection
        let pool_options = if url.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(FILE_POOL_MAX_CONNECTIONS)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database {url}: {e}")))?;

        let database = Self { pool };
        database.migrate().await?;
        info!(database = %url, "Database ready");
        Ok(database)
    }

    /// Underlying pool, for transactions that span managers
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply all schema statements
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        for (name, statement) in MIGRATIONS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Migration '{name}' failed: {e}")))?;
            debug!(migration = name, "Applied migration");
        }
        Ok(())
    }

    /// Check the pool can serve a trivial query
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    /// Account queries
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// Trail queries
    #[must_use]
    pub fn trails(&self) -> TrailManager {
        TrailManager::new(self.pool.clone())
    }

    /// Session queries
    #[must_use]
    pub fn sessions(&self) -> SessionManager {
        SessionManager::new(self.pool.clone())
    }

    /// Achievement queries
    #[must_use]
    pub fn achievements(&self) -> AchievementManager {
        AchievementManager::new(self.pool.clone())
    }

    /// Goal queries
    #[must_use]
    pub fn goals(&self) -> GoalManager {
        GoalManager::new(self.pool.clone())
    }

    /// Review, bookmark, and follow queries
    #[must_use]
    pub fn social(&self) -> SocialManager {
        SocialManager::new(self.pool.clone())
    }

    /// Strava token queries
    #[must_use]
    pub fn strava(&self) -> StravaConnectionManager {
        StravaConnectionManager::new(self.pool.clone())
    }
}

pub(crate) fn parse_uuid(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::database(format!("Invalid UUID '{value}': {e}")))
}

pub(crate) fn parse_optional_uuid(value: Option<String>) -> AppResult<Option<Uuid>> {
    value.as_deref().map(parse_uuid).transpose()
}

pub(crate) fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid date '{value}': {e}")))
}

pub(crate) fn parse_optional_timestamp(value: Option<String>) -> AppResult<Option<DateTime<Utc>>> {
    value.as_deref().map(parse_timestamp).transpose()
}

pub(crate) fn parse_column<T>(value: &str) -> AppResult<T>
where
    T: FromStr<Err = AppError>,
{
    value.parse().map_err(|e: AppError| AppError::database(e.message))
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|db_error| db_error.is_unique_violation())
}
