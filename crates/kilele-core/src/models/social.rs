// ABOUTME: Reviews, bookmarks, and follow relation records
// ABOUTME: Their counts feed the social, reviews, and exploration achievement rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::limits;
use crate::errors::{AppError, AppResult};

/// A user's review of a trail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    /// Unique identifier
    pub id: Uuid,
    /// Reviewed trail
    pub trail_id: Uuid,
    /// Author
    pub user_id: Uuid,
    /// Rating 1-5
    pub rating: i64,
    /// Review text
    pub comment: Option<String>,
    /// Number of helpful votes from other users
    pub helpful_count: i64,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Validate and build a new review
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when the rating is outside 1-5
    pub fn new(
        trail_id: Uuid,
        user_id: Uuid,
        rating: i64,
        comment: Option<String>,
    ) -> AppResult<Self> {
        if !(limits::MIN_RATING..=limits::MAX_RATING).contains(&rating) {
            return Err(AppError::invalid_input("rating must be between 1 and 5"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            trail_id,
            user_id,
            rating,
            comment: comment.filter(|text| !text.trim().is_empty()),
            helpful_count: 0,
            created_at: Utc::now(),
        })
    }
}

/// A trail saved by a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bookmark {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Saved trail
    pub trail_id: Uuid,
    /// When it was saved
    pub created_at: DateTime<Utc>,
}

/// Counts from the social relations a user participates in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SocialCounts {
    /// Users following this user
    pub followers: u64,
    /// Users this user follows
    pub following: u64,
    /// Reviews written
    pub reviews_written: u64,
    /// Helpful votes received across all reviews
    pub helpful_votes: u64,
    /// Trails bookmarked
    pub bookmarks: u64,
}
