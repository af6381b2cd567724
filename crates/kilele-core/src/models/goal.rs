// ABOUTME: User-defined numeric goals with target, current value, and lifecycle status
// ABOUTME: Goal types mirror the aggregated statistics a hiker can track
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// What a goal measures
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    /// Kilometres hiked
    Distance,
    /// Metres climbed
    Elevation,
    /// Number of hikes
    HikesCount,
    /// Hours on trail
    Duration,
}

impl GoalType {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Elevation => "elevation",
            Self::HikesCount => "hikes_count",
            Self::Duration => "duration",
        }
    }
}

impl Display for GoalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "distance" => Ok(Self::Distance),
            "elevation" => Ok(Self::Elevation),
            "hikes_count" => Ok(Self::HikesCount),
            "duration" => Ok(Self::Duration),
            _ => Err(AppError::invalid_input(format!("Invalid goal type: {s}"))),
        }
    }
}

/// Lifecycle state of a goal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Being worked towards
    #[default]
    Active,
    /// Target reached; terminal
    Completed,
    /// Deadline passed with target unmet; terminal
    Failed,
}

impl GoalStatus {
    /// Database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether no further status transition is possible
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl Display for GoalStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(AppError::invalid_input(format!("Invalid goal status: {s}"))),
        }
    }
}

/// A self-defined numeric objective
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Short title
    pub title: String,
    /// Longer description
    pub description: Option<String>,
    /// What is measured
    pub goal_type: GoalType,
    /// Value that completes the goal
    pub target_value: f64,
    /// Latest reported value
    pub current_value: f64,
    /// Optional deadline
    pub deadline: Option<DateTime<Utc>>,
    /// Lifecycle state
    pub status: GoalStatus,
    /// When the target was reached
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Progress towards the target as a percentage, capped at 100
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        if self.target_value <= 0.0 {
            return 0.0;
        }
        (self.current_value / self.target_value * 100.0).min(100.0)
    }
}

/// Fields supplied when creating a goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGoal {
    /// Short title
    pub title: String,
    /// Longer description
    #[serde(default)]
    pub description: Option<String>,
    /// What is measured
    pub goal_type: GoalType,
    /// Value that completes the goal
    pub target_value: f64,
    /// Optional deadline
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}
