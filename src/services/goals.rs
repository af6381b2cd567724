// ABOUTME: Goal creation and progress updates backed by the goal tracker rules
// ABOUTME: Progress can be reported explicitly or derived from the user's session statistics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use chrono::Utc;
use kilele_intelligence::{GoalTracker, GoalTransition};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::achievements;
use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{Goal, NewGoal};

/// Body of a progress update; omit `current_value` to derive it from sessions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalProgressUpdate {
    /// New current value
    #[serde(default)]
    pub current_value: Option<f64>,
}

/// Validate and store a new goal
///
/// # Errors
///
/// Returns `INVALID_INPUT` for an empty title or non-positive target
pub async fn create_goal(database: &Database, user_id: Uuid, input: NewGoal) -> AppResult<Goal> {
    let goal = GoalTracker::create(user_id, input, Utc::now())?;
    database.goals().create_goal(&goal).await?;
    info!(%user_id, goal_id = %goal.id, goal_type = %goal.goal_type, "Goal created");
    Ok(goal)
}

/// Record progress on a goal the user owns
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` for another user's goal and `INVALID_INPUT`
/// for a negative value
pub async fn update_progress(
    database: &Database,
    user_id: Uuid,
    goal_id: Uuid,
    update: &GoalProgressUpdate,
) -> AppResult<(Goal, GoalTransition)> {
    let goals = database.goals();
    let mut goal = goals.get_user_goal(user_id, goal_id).await?;

    let value = match update.current_value {
        Some(value) => value,
        None => {
            let stats = achievements::progress_stats(database, user_id).await?;
            GoalTracker::observed_value(goal.goal_type, &stats)
        }
    };

    let transition = GoalTracker::apply_progress(&mut goal, value, Utc::now())?;
    goals.save_progress(&goal).await?;
    if transition == GoalTransition::Completed {
        info!(%user_id, %goal_id, "Goal completed");
    }
    Ok((goal, transition))
}
