// ABOUTME: User account database operations
// ABOUTME: Registration, lookup by id or email, and admin promotion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{is_unique_violation, parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::User;

const USER_COLUMNS: &str =
    "id, username, email, display_name, password_hash, is_admin, created_at";

/// Account database operations manager
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` if the username or email is taken
    pub async fn create_user(&self, user: &User) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO users (id, username, email, display_name, password_hash, is_admin, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists("Username or email is already registered")
            } else {
                AppError::database(format!("Failed to create user: {e}"))
            }
        })?;

        Ok(user.id)
    }

    /// Get a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| Self::row_to_user(&r)).transpose()
    }

    /// Get a user by email, case-insensitively
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user by email: {e}")))?;

        row.map(|r| Self::row_to_user(&r)).transpose()
    }

    /// Grant the admin flag
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if no user has that email
    pub async fn promote_to_admin(&self, email: &str) -> AppResult<User> {
        let result = sqlx::query("UPDATE users SET is_admin = 1 WHERE lower(email) = lower($1)")
            .bind(email.trim())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to promote user: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User with email {email}")));
        }
        self.get_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User with email {email}")))
    }

    /// Whether a user exists
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = $1")
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to check user: {e}")))?;
        Ok(count > 0)
    }

    fn row_to_user(row: &SqliteRow) -> AppResult<User> {
        let id: String = row.get("id");
        let created_at: String = row.get("created_at");
        Ok(User {
            id: parse_uuid(&id)?,
            username: row.get("username"),
            email: row.get("email"),
            display_name: row.get("display_name"),
            password_hash: row.get("password_hash"),
            is_admin: row.get("is_admin"),
            created_at: parse_timestamp(&created_at)?,
        })
    }
}
