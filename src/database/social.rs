// ABOUTME: Social database operations feeding achievement evaluation
// ABOUTME: Trail reviews with helpful votes, bookmarks, follow relations, and per-user counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{is_unique_violation, parse_timestamp, parse_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::{Bookmark, Review, SocialCounts};

/// Social features database operations manager
pub struct SocialManager {
    pool: SqlitePool,
}

impl SocialManager {
    /// Create a new social manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Reviews
    // ========================================================================

    /// Insert a review
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn create_review(&self, review: &Review) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO reviews (id, trail_id, user_id, rating, comment, helpful_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(review.id.to_string())
        .bind(review.trail_id.to_string())
        .bind(review.user_id.to_string())
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.helpful_count)
        .bind(review.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create review: {e}")))?;
        Ok(())
    }

    /// Get a review by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_review(&self, id: Uuid) -> AppResult<Option<Review>> {
        let row = sqlx::query(
            r"
            SELECT id, trail_id, user_id, rating, comment, helpful_count, created_at
            FROM reviews WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get review: {e}")))?;

        row.map(|r| Self::row_to_review(&r)).transpose()
    }

    /// Reviews of a trail, most helpful first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_trail_reviews(&self, trail_id: Uuid) -> AppResult<Vec<Review>> {
        let rows = sqlx::query(
            r"
            SELECT id, trail_id, user_id, rating, comment, helpful_count, created_at
            FROM reviews WHERE trail_id = $1
            ORDER BY helpful_count DESC, created_at DESC
            ",
        )
        .bind(trail_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list reviews: {e}")))?;

        rows.iter().map(Self::row_to_review).collect()
    }

    /// Record one helpful vote and bump the review's counter
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` if this user already voted
    pub async fn add_helpful_vote(&self, review_id: Uuid, voter_id: Uuid) -> AppResult<i64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("INSERT INTO review_votes (review_id, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(review_id.to_string())
            .bind(voter_id.to_string())
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::already_exists("You already marked this review as helpful")
                } else {
                    AppError::database(format!("Failed to record vote: {e}"))
                }
            })?;

        let helpful_count: i64 = sqlx::query_scalar(
            "UPDATE reviews SET helpful_count = helpful_count + 1 WHERE id = $1 RETURNING helpful_count",
        )
        .bind(review_id.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update helpful count: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit vote: {e}")))?;
        Ok(helpful_count)
    }

    // ========================================================================
    // Bookmarks
    // ========================================================================

    /// Bookmark a trail
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_ALREADY_EXISTS` for a duplicate bookmark
    pub async fn create_bookmark(&self, user_id: Uuid, trail_id: Uuid) -> AppResult<Bookmark> {
        let bookmark = Bookmark {
            id: Uuid::new_v4(),
            user_id,
            trail_id,
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO bookmarks (id, user_id, trail_id, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(bookmark.id.to_string())
        .bind(user_id.to_string())
        .bind(trail_id.to_string())
        .bind(bookmark.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists("Trail is already bookmarked")
            } else {
                AppError::database(format!("Failed to create bookmark: {e}"))
            }
        })?;
        Ok(bookmark)
    }

    /// A user's bookmarks, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_bookmarks(&self, user_id: Uuid) -> AppResult<Vec<Bookmark>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, trail_id, created_at FROM bookmarks
            WHERE user_id = $1 ORDER BY created_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list bookmarks: {e}")))?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                let user_id: String = row.get("user_id");
                let trail_id: String = row.get("trail_id");
                let created_at: String = row.get("created_at");
                Ok(Bookmark {
                    id: parse_uuid(&id)?,
                    user_id: parse_uuid(&user_id)?,
                    trail_id: parse_uuid(&trail_id)?,
                    created_at: parse_timestamp(&created_at)?,
                })
            })
            .collect()
    }

    /// Remove a bookmark
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_bookmark(&self, user_id: Uuid, trail_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND trail_id = $2")
            .bind(user_id.to_string())
            .bind(trail_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete bookmark: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Follows
    // ========================================================================

    /// Make `follower_id` follow `following_id`
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for self-follows and `RESOURCE_ALREADY_EXISTS`
    /// for duplicates
    pub async fn follow(&self, follower_id: Uuid, following_id: Uuid) -> AppResult<()> {
        if follower_id == following_id {
            return Err(AppError::invalid_input("You cannot follow yourself"));
        }
        sqlx::query(
            "INSERT INTO follows (follower_id, following_id, created_at) VALUES ($1, $2, $3)",
        )
        .bind(follower_id.to_string())
        .bind(following_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists("Already following this user")
            } else {
                AppError::database(format!("Failed to follow user: {e}"))
            }
        })?;
        Ok(())
    }

    /// Remove a follow relation
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn unfollow(&self, follower_id: Uuid, following_id: Uuid) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
                .bind(follower_id.to_string())
                .bind(following_id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to unfollow user: {e}")))?;
        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Counts
    // ========================================================================

    /// Follower, following, review, vote, and bookmark counts for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn counts(conn: &mut SqliteConnection, user_id: Uuid) -> AppResult<SocialCounts> {
        let row = sqlx::query(
            r"
            SELECT
                (SELECT COUNT(*) FROM follows WHERE following_id = $1) AS followers,
                (SELECT COUNT(*) FROM follows WHERE follower_id = $1) AS following,
                (SELECT COUNT(*) FROM reviews WHERE user_id = $1) AS reviews_written,
                (SELECT COALESCE(SUM(helpful_count), 0) FROM reviews WHERE user_id = $1) AS helpful_votes,
                (SELECT COUNT(*) FROM bookmarks WHERE user_id = $1) AS bookmarks
            ",
        )
        .bind(user_id.to_string())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to load social counts: {e}")))?;

        let count = |column: &str| -> u64 { u64::try_from(row.get::<i64, _>(column)).unwrap_or(0) };
        Ok(SocialCounts {
            followers: count("followers"),
            following: count("following"),
            reviews_written: count("reviews_written"),
            helpful_votes: count("helpful_votes"),
            bookmarks: count("bookmarks"),
        })
    }

    /// Social counts using the pool
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_counts(&self, user_id: Uuid) -> AppResult<SocialCounts> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
        Self::counts(&mut conn, user_id).await
    }

    fn row_to_review(row: &SqliteRow) -> AppResult<Review> {
        let id: String = row.get("id");
        let trail_id: String = row.get("trail_id");
        let user_id: String = row.get("user_id");
        let created_at: String = row.get("created_at");
        Ok(Review {
            id: parse_uuid(&id)?,
            trail_id: parse_uuid(&trail_id)?,
            user_id: parse_uuid(&user_id)?,
            rating: row.get("rating"),
            comment: row.get("comment"),
            helpful_count: row.get("helpful_count"),
            created_at: parse_timestamp(&created_at)?,
        })
    }
}
