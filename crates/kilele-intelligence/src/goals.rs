// ABOUTME: Goal tracker validating new goals and applying progress updates
// ABOUTME: A goal completes when its current value reaches the target; completion is terminal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use chrono::{DateTime, Utc};
use kilele_core::errors::{AppError, AppResult};
use kilele_core::models::{Goal, GoalStatus, GoalType, NewGoal};
use uuid::Uuid;

use crate::progress::ProgressStats;

/// Maximum goal title length in characters
pub const MAX_TITLE_LENGTH: usize = 200;

/// Status change caused by a progress update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalTransition {
    /// Status did not change
    Unchanged,
    /// The goal moved from active to completed
    Completed,
}

/// Stateless goal lifecycle rules
pub struct GoalTracker;

impl GoalTracker {
    /// Build a new active goal for `user_id`
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for an empty title or a target that is not a
    /// positive finite number
    pub fn create(user_id: Uuid, input: NewGoal, now: DateTime<Utc>) -> AppResult<Goal> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(AppError::invalid_input("Goal title is required"));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(AppError::invalid_input(format!(
                "Goal title must be at most {MAX_TITLE_LENGTH} characters"
            )));
        }
        if !input.target_value.is_finite() || input.target_value <= 0.0 {
            return Err(AppError::invalid_input(
                "target_value must be a positive number",
            ));
        }

        Ok(Goal {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_owned(),
            description: input.description,
            goal_type: input.goal_type,
            target_value: input.target_value,
            current_value: 0.0,
            deadline: input.deadline,
            status: GoalStatus::Active,
            completed_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Record a new current value
    ///
    /// The value is always stored. Only an active goal can transition, and
    /// only to completed, once `current_value >= target_value`.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for a negative or non-finite value
    pub fn apply_progress(
        goal: &mut Goal,
        current_value: f64,
        now: DateTime<Utc>,
    ) -> AppResult<GoalTransition> {
        if !current_value.is_finite() || current_value < 0.0 {
            return Err(AppError::invalid_input(
                "current_value must be a non-negative number",
            ));
        }

        goal.current_value = current_value;
        goal.updated_at = now;

        if goal.status == GoalStatus::Active && current_value >= goal.target_value {
            goal.status = GoalStatus::Completed;
            goal.completed_at = Some(now);
            return Ok(GoalTransition::Completed);
        }
        Ok(GoalTransition::Unchanged)
    }

    /// The aggregated statistic a goal of this type measures
    #[must_use]
    pub fn observed_value(goal_type: GoalType, stats: &ProgressStats) -> f64 {
        match goal_type {
            GoalType::Distance => stats.total_distance_km,
            GoalType::Elevation => stats.total_elevation_gain_m,
            GoalType::HikesCount => stats.completed_sessions as f64,
            GoalType::Duration => stats.total_duration_hours,
        }
    }
}
