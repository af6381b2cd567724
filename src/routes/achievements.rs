// ABOUTME: Achievement catalog, per-user progress, and lifetime statistics route handlers
// ABOUTME: Evaluation can be triggered explicitly; it also runs after completions and imports
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use kilele_intelligence::ProgressStats;
use serde::Serialize;

use super::authenticate;
use crate::errors::AppError;
use crate::models::{AchievementProgress, SocialCounts, UnlockedAchievement};
use crate::resources::ServerResources;
use crate::services::achievements;

/// Lifetime statistics for the caller
#[derive(Debug, Serialize)]
pub struct UserStatsResponse {
    /// Aggregated session statistics
    #[serde(flatten)]
    pub stats: ProgressStats,
    /// Social activity counts
    pub social: SocialCounts,
    /// Points from completed achievements
    pub achievement_points: i64,
}

/// Caller's achievement progress
#[derive(Debug, Serialize)]
pub struct UserAchievementsResponse {
    /// Every catalog entry with the caller's progress
    pub achievements: Vec<AchievementProgress>,
    /// Number completed
    pub completed: usize,
    /// Points from completed achievements
    pub total_points: i64,
}

/// Result of an explicit evaluation
#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    /// Achievements completed by this run
    pub unlocked: Vec<UnlockedAchievement>,
}

/// Achievement and statistics routes
pub struct AchievementRoutes;

impl AchievementRoutes {
    /// Create all achievement routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users/me/stats", get(Self::handle_stats))
            .route("/api/achievements", get(Self::handle_catalog))
            .route("/api/achievements/me", get(Self::handle_mine))
            .route("/api/achievements/evaluate", post(Self::handle_evaluate))
            .with_state(resources)
    }

    /// Handle GET /api/users/me/stats
    async fn handle_stats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let stats = achievements::progress_stats(&resources.database, auth.user_id).await?;
        let social = resources.database.social().get_counts(auth.user_id).await?;
        let achievement_points = resources
            .database
            .achievements()
            .total_points(auth.user_id)
            .await?;

        let response = UserStatsResponse {
            stats,
            social,
            achievement_points,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/achievements
    async fn handle_catalog(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let catalog = resources.database.achievements().list_achievements().await?;
        Ok((StatusCode::OK, Json(catalog)).into_response())
    }

    /// Handle GET /api/achievements/me
    async fn handle_mine(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let manager = resources.database.achievements();
        let achievements = manager.list_user_progress(auth.user_id).await?;
        let total_points = manager.total_points(auth.user_id).await?;

        let response = UserAchievementsResponse {
            completed: achievements.iter().filter(|a| a.completed).count(),
            achievements,
            total_points,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/achievements/evaluate
    async fn handle_evaluate(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let unlocked = achievements::evaluate_for_user(
            &resources.database,
            resources.notifier.as_ref(),
            auth.user_id,
        )
        .await?;
        Ok((StatusCode::OK, Json(EvaluateResponse { unlocked })).into_response())
    }
}
