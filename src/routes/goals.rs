// ABOUTME: Goal route handlers
// ABOUTME: Create, list, fetch, record progress, and delete goals; responses carry progress_percent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use kilele_intelligence::GoalTransition;
use serde::{Deserialize, Serialize};

use super::{authenticate, parse_id};
use crate::errors::AppError;
use crate::models::{Goal, GoalStatus, NewGoal};
use crate::resources::ServerResources;
use crate::services::goals::{self, GoalProgressUpdate};

/// Goal with its derived completion percentage
#[derive(Debug, Serialize)]
pub struct GoalResponse {
    /// Stored goal
    #[serde(flatten)]
    pub goal: Goal,
    /// `current_value / target_value`, capped at 100
    pub progress_percent: f64,
}

impl From<Goal> for GoalResponse {
    fn from(goal: Goal) -> Self {
        Self {
            progress_percent: goal.progress_percent(),
            goal,
        }
    }
}

/// Goal after a progress update
#[derive(Debug, Serialize)]
pub struct GoalProgressResponse {
    /// Updated goal
    pub goal: GoalResponse,
    /// Whether this update completed the goal
    pub just_completed: bool,
}

/// Query parameters for listing goals
#[derive(Debug, Default, Deserialize)]
pub struct GoalListQuery {
    /// Restrict to one status
    #[serde(default)]
    pub status: Option<GoalStatus>,
}

/// Goal routes
pub struct GoalRoutes;

impl GoalRoutes {
    /// Create all goal routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/goals", get(Self::handle_list).post(Self::handle_create))
            .route(
                "/api/goals/:id",
                get(Self::handle_get).delete(Self::handle_delete),
            )
            .route("/api/goals/:id/progress", put(Self::handle_progress))
            .with_state(resources)
    }

    /// Handle POST /api/goals
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(input): Json<NewGoal>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let goal = goals::create_goal(&resources.database, auth.user_id, input).await?;
        Ok((StatusCode::CREATED, Json(GoalResponse::from(goal))).into_response())
    }

    /// Handle GET /api/goals
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<GoalListQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let goals: Vec<GoalResponse> = resources
            .database
            .goals()
            .list_goals(auth.user_id, query.status)
            .await?
            .into_iter()
            .map(GoalResponse::from)
            .collect();
        Ok((StatusCode::OK, Json(goals)).into_response())
    }

    /// Handle GET /api/goals/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let goal_id = parse_id(&id, "goal")?;
        let goal = resources
            .database
            .goals()
            .get_user_goal(auth.user_id, goal_id)
            .await?;
        Ok((StatusCode::OK, Json(GoalResponse::from(goal))).into_response())
    }

    /// Handle PUT /api/goals/:id/progress
    async fn handle_progress(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(update): Json<GoalProgressUpdate>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let goal_id = parse_id(&id, "goal")?;
        let (goal, transition) =
            goals::update_progress(&resources.database, auth.user_id, goal_id, &update).await?;

        let response = GoalProgressResponse {
            goal: GoalResponse::from(goal),
            just_completed: transition == GoalTransition::Completed,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/goals/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let goal_id = parse_id(&id, "goal")?;
        if !resources
            .database
            .goals()
            .delete_goal(auth.user_id, goal_id)
            .await?
        {
            return Err(AppError::not_found(format!("Goal {goal_id}")));
        }
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
