// ABOUTME: Achievement catalog entries and per-user achievement progress records
// ABOUTME: Categories select the statistic an achievement requirement is measured against
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of an achievement
///
/// Stored as free text so catalog rows with categories this build does not
/// evaluate still load; those surface as [`AchievementCategory::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AchievementCategory {
    /// Cumulative distance
    Distance,
    /// Cumulative elevation gain
    Elevation,
    /// Completed-hike count (also spelled `milestones`)
    Count,
    /// Completed hikes on trails of a given difficulty
    Difficulty,
    /// Follower / following counts
    Social,
    /// Reviews written or helpful votes received
    Reviews,
    /// Locations, trails, and bookmarks
    Exploration,
    /// Hand-awarded achievements
    Special,
    /// Any category without an evaluation rule
    Other(String),
}

impl AchievementCategory {
    /// Database string representation
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Distance => "distance",
            Self::Elevation => "elevation",
            Self::Count => "count",
            Self::Difficulty => "difficulty",
            Self::Social => "social",
            Self::Reviews => "reviews",
            Self::Exploration => "exploration",
            Self::Special => "special",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for AchievementCategory {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "distance" => Self::Distance,
            "elevation" => Self::Elevation,
            "count" | "milestones" => Self::Count,
            "difficulty" => Self::Difficulty,
            "social" => Self::Social,
            "reviews" => Self::Reviews,
            "exploration" => Self::Exploration,
            "special" => Self::Special,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for AchievementCategory {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_owned())
    }
}

impl From<AchievementCategory> for String {
    fn from(category: AchievementCategory) -> Self {
        category.as_str().to_owned()
    }
}

impl Display for AchievementCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Static catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    /// Unique identifier
    pub id: Uuid,
    /// Unique display name
    pub name: String,
    /// What the user has to do
    pub description: Option<String>,
    /// Icon or emoji
    pub icon: Option<String>,
    /// Statistic family
    pub category: AchievementCategory,
    /// Qualifier inside the category (e.g. `hard`, `followers`)
    pub metric: Option<String>,
    /// Threshold the statistic must reach
    pub requirement: f64,
    /// Points awarded
    pub points: i64,
}

/// A user's standing against one achievement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserAchievement {
    /// Row identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Catalog entry
    pub achievement_id: Uuid,
    /// Best observed statistic, capped at the requirement
    pub progress: f64,
    /// Whether the requirement was met; never reverts
    pub completed: bool,
    /// When the achievement was completed
    pub earned_at: Option<DateTime<Utc>>,
    /// Last time progress was recorded
    pub updated_at: DateTime<Utc>,
}

/// Catalog entry joined with the user's progress, for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementProgress {
    /// Catalog entry
    pub achievement: Achievement,
    /// Best observed statistic
    pub progress: f64,
    /// Whether the requirement was met
    pub completed: bool,
    /// When it was earned
    pub earned_at: Option<DateTime<Utc>>,
}

/// An achievement that became completed during an evaluation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnlockedAchievement {
    /// Catalog entry id
    pub achievement_id: Uuid,
    /// Display name
    pub name: String,
    /// Points awarded
    pub points: i64,
    /// Completion time
    pub earned_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milestones_alias_maps_to_count() {
        assert_eq!(AchievementCategory::from("milestones"), AchievementCategory::Count);
        assert_eq!(AchievementCategory::from("Count"), AchievementCategory::Count);
    }

    #[test]
    fn test_unknown_category_is_preserved() {
        let category = AchievementCategory::from("consistency");
        assert_eq!(category, AchievementCategory::Other("consistency".into()));
        assert_eq!(category.as_str(), "consistency");
    }
}
