// ABOUTME: Trail reviews, helpful votes, bookmarks, and follow route handlers
// ABOUTME: Each social write re-evaluates achievements for the user whose counts changed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::{authenticate, parse_id};
use crate::errors::AppError;
use crate::models::{Bookmark, Review, UnlockedAchievement};
use crate::resources::ServerResources;
use crate::services::achievements;

/// Body of a review request
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    /// Rating 1-5
    pub rating: i64,
    /// Optional text
    #[serde(default)]
    pub comment: Option<String>,
}

/// Body of a bookmark request
#[derive(Debug, Deserialize)]
pub struct BookmarkRequest {
    /// Trail to save
    pub trail_id: Uuid,
}

/// Stored review plus anything writing it unlocked
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    /// Stored review
    pub review: Review,
    /// Achievements completed for the author
    pub unlocked: Vec<UnlockedAchievement>,
}

/// Stored bookmark plus anything saving it unlocked
#[derive(Debug, Serialize)]
pub struct BookmarkResponse {
    /// Stored bookmark
    pub bookmark: Bookmark,
    /// Achievements completed for the caller
    pub unlocked: Vec<UnlockedAchievement>,
}

/// Helpful vote result
#[derive(Debug, Serialize)]
pub struct HelpfulVoteResponse {
    /// Voted review
    pub review_id: Uuid,
    /// Vote count after this vote
    pub helpful_count: i64,
}

/// Social routes
pub struct SocialRoutes;

impl SocialRoutes {
    /// Create all social routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/trails/:id/reviews",
                get(Self::handle_list_reviews).post(Self::handle_create_review),
            )
            .route("/api/reviews/:id/helpful", post(Self::handle_helpful))
            .route(
                "/api/bookmarks",
                get(Self::handle_list_bookmarks).post(Self::handle_create_bookmark),
            )
            .route("/api/bookmarks/:trail_id", delete(Self::handle_delete_bookmark))
            .route(
                "/api/users/:id/follow",
                post(Self::handle_follow).delete(Self::handle_unfollow),
            )
            .route("/api/users/:id/social", get(Self::handle_counts))
            .with_state(resources)
    }

    /// Handle POST /api/trails/:id/reviews
    async fn handle_create_review(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(request): Json<ReviewRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let trail_id = parse_id(&id, "trail")?;
        resources.database.trails().require_trail(trail_id).await?;

        let review = Review::new(trail_id, auth.user_id, request.rating, request.comment)?;
        resources.database.social().create_review(&review).await?;
        let unlocked = reevaluate(&resources, auth.user_id).await;

        Ok((StatusCode::CREATED, Json(ReviewResponse { review, unlocked })).into_response())
    }

    /// Handle GET /api/trails/:id/reviews
    async fn handle_list_reviews(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let trail_id = parse_id(&id, "trail")?;
        resources.database.trails().require_trail(trail_id).await?;
        let reviews = resources
            .database
            .social()
            .list_trail_reviews(trail_id)
            .await?;
        Ok((StatusCode::OK, Json(reviews)).into_response())
    }

    /// Handle POST /api/reviews/:id/helpful
    async fn handle_helpful(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let review_id = parse_id(&id, "review")?;
        let social = resources.database.social();

        let review = social
            .get_review(review_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Review {review_id}")))?;
        if review.user_id == auth.user_id {
            return Err(AppError::invalid_input(
                "Cannot vote for your own review",
            ));
        }

        let helpful_count = social.add_helpful_vote(review_id, auth.user_id).await?;
        reevaluate(&resources, review.user_id).await;

        let response = HelpfulVoteResponse {
            review_id,
            helpful_count,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/bookmarks
    async fn handle_create_bookmark(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<BookmarkRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        resources
            .database
            .trails()
            .require_trail(request.trail_id)
            .await?;

        let bookmark = resources
            .database
            .social()
            .create_bookmark(auth.user_id, request.trail_id)
            .await?;
        let unlocked = reevaluate(&resources, auth.user_id).await;

        Ok((
            StatusCode::CREATED,
            Json(BookmarkResponse { bookmark, unlocked }),
        )
            .into_response())
    }

    /// Handle GET /api/bookmarks
    async fn handle_list_bookmarks(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let bookmarks = resources
            .database
            .social()
            .list_bookmarks(auth.user_id)
            .await?;
        Ok((StatusCode::OK, Json(bookmarks)).into_response())
    }

    /// Handle DELETE /api/bookmarks/:trail_id
    async fn handle_delete_bookmark(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(trail_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let trail_id = parse_id(&trail_id, "trail")?;
        if !resources
            .database
            .social()
            .delete_bookmark(auth.user_id, trail_id)
            .await?
        {
            return Err(AppError::not_found("Bookmark"));
        }
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/users/:id/follow
    async fn handle_follow(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let target = parse_id(&id, "user")?;
        if !resources.database.users().exists(target).await? {
            return Err(AppError::not_found(format!("User {target}")));
        }

        resources.database.social().follow(auth.user_id, target).await?;
        reevaluate(&resources, auth.user_id).await;
        reevaluate(&resources, target).await;

        let counts = resources.database.social().get_counts(target).await?;
        Ok((StatusCode::CREATED, Json(counts)).into_response())
    }

    /// Handle DELETE /api/users/:id/follow
    async fn handle_unfollow(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let target = parse_id(&id, "user")?;
        if !resources
            .database
            .social()
            .unfollow(auth.user_id, target)
            .await?
        {
            return Err(AppError::not_found("Follow relationship"));
        }
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /api/users/:id/social
    async fn handle_counts(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;
        let user_id = parse_id(&id, "user")?;
        if !resources.database.users().exists(user_id).await? {
            return Err(AppError::not_found(format!("User {user_id}")));
        }
        let counts = resources.database.social().get_counts(user_id).await?;
        Ok((StatusCode::OK, Json(counts)).into_response())
    }
}

/// Re-run achievement evaluation after a committed social write
///
/// The write stays committed when evaluation fails; the next evaluation
/// picks up the change.
async fn reevaluate(resources: &ServerResources, user_id: Uuid) -> Vec<UnlockedAchievement> {
    achievements::evaluate_for_user(&resources.database, resources.notifier.as_ref(), user_id)
        .await
        .unwrap_or_else(|e| {
            warn!(%user_id, error = %e, "Achievement evaluation after social write failed");
            Vec::new()
        })
}
