// ABOUTME: Built-in achievement catalog seeded into a fresh database
// ABOUTME: Milestone, distance, elevation, difficulty, social, review, exploration, and special badges
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use kilele_core::models::{Achievement, AchievementCategory};
use uuid::Uuid;

/// Static description of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AchievementSeed {
    /// Unique display name, used as the seeding key
    pub name: &'static str,
    /// What the user has to do
    pub description: &'static str,
    /// Emoji icon
    pub icon: &'static str,
    /// Category string as stored
    pub category: &'static str,
    /// Qualifier inside the category
    pub metric: Option<&'static str>,
    /// Threshold
    pub requirement: f64,
    /// Points awarded
    pub points: i64,
}

impl AchievementSeed {
    /// Materialize as a catalog entry with a fresh id
    #[must_use]
    pub fn to_achievement(&self) -> Achievement {
        Achievement {
            id: Uuid::new_v4(),
            name: self.name.to_owned(),
            description: Some(self.description.to_owned()),
            icon: Some(self.icon.to_owned()),
            category: AchievementCategory::from(self.category),
            metric: self.metric.map(str::to_owned),
            requirement: self.requirement,
            points: self.points,
        }
    }
}

const fn seed(
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    category: &'static str,
    metric: Option<&'static str>,
    requirement: f64,
    points: i64,
) -> AchievementSeed {
    AchievementSeed {
        name,
        description,
        icon,
        category,
        metric,
        requirement,
        points,
    }
}

/// Every built-in achievement
///
/// `consistency` and `special` entries are listed for display but have no
/// evaluation rule, so they are never unlocked automatically.
pub const SEED_ACHIEVEMENTS: &[AchievementSeed] = &[
    // Milestones
    seed("First Steps", "Complete your first hike", "🥾", "milestones", None, 1.0, 10),
    seed("Trail Enthusiast", "Complete 5 hikes", "🏃", "milestones", None, 5.0, 25),
    seed("Hiking Champion", "Complete 10 hikes", "🏆", "milestones", None, 10.0, 50),
    seed("Trail Master", "Complete 25 hikes", "👑", "milestones", None, 25.0, 100),
    seed("Hiking Legend", "Complete 50 hikes", "⭐", "milestones", None, 50.0, 250),
    // Distance (km)
    seed("10K Walker", "Cover 10km total distance", "🚶", "distance", None, 10.0, 15),
    seed("Marathon Hiker", "Cover 42km total distance", "🎯", "distance", None, 42.0, 40),
    seed("Century Hiker", "Cover 100km total distance", "💯", "distance", None, 100.0, 100),
    seed("Ultra Distance", "Cover 250km total distance", "🌟", "distance", None, 250.0, 200),
    seed("Distance Dominator", "Cover 500km total distance", "🔥", "distance", None, 500.0, 500),
    // Elevation (m)
    seed("Hill Climber", "Gain 500m total elevation", "⛰️", "elevation", None, 500.0, 20),
    seed("Peak Seeker", "Gain 1000m total elevation", "🏔️", "elevation", None, 1000.0, 50),
    seed("Mountain Conqueror", "Gain 2500m total elevation", "🗻", "elevation", None, 2500.0, 100),
    seed("Summit Master", "Gain 5000m total elevation", "🏅", "elevation", None, 5000.0, 250),
    seed(
        "Everest Equivalent",
        "Gain 8848m total elevation (Mount Everest height!)",
        "🎖️",
        "elevation",
        None,
        8848.0,
        1000,
    ),
    // Difficulty
    seed("Easy Does It", "Complete 5 Easy trails", "🌿", "difficulty", Some("easy"), 5.0, 20),
    seed("Moderate Explorer", "Complete 5 Moderate trails", "🌲", "difficulty", Some("moderate"), 5.0, 40),
    seed("Hard Core", "Complete 5 Hard trails", "🪨", "difficulty", Some("hard"), 5.0, 80),
    seed("Extreme Adventurer", "Complete 3 Extreme trails", "⚡", "difficulty", Some("extreme"), 3.0, 150),
    seed(
        "All-Rounder",
        "Complete at least one trail of each difficulty",
        "🎨",
        "difficulty",
        Some("all"),
        4.0,
        100,
    ),
    // Social
    seed("Social Butterfly", "Follow 10 other hikers", "🦋", "social", Some("following"), 10.0, 15),
    seed("Popular Hiker", "Get 25 followers", "👥", "social", Some("followers"), 25.0, 50),
    seed("Influencer", "Get 100 followers", "📢", "social", Some("followers"), 100.0, 200),
    // Reviews
    seed("Critic's Choice", "Write 5 trail reviews", "✍️", "reviews", Some("reviews"), 5.0, 25),
    seed(
        "Helpful Reviewer",
        "Get 25 'helpful' votes on your reviews",
        "👍",
        "reviews",
        Some("helpful_votes"),
        25.0,
        50,
    ),
    seed("Top Reviewer", "Write 25 trail reviews", "📝", "reviews", Some("reviews"), 25.0, 100),
    seed("Photo Journalist", "Upload 50 trail photos", "📸", "reviews", Some("photos"), 50.0, 75),
    // Exploration
    seed(
        "Explorer",
        "Bookmark 10 trails to explore later",
        "🔖",
        "exploration",
        Some("bookmarks"),
        10.0,
        15,
    ),
    seed(
        "Trail Scout",
        "Visit trails in 5 different locations",
        "🧭",
        "exploration",
        Some("locations"),
        5.0,
        40,
    ),
    seed(
        "Kenya Explorer",
        "Visit trails in 10 different locations",
        "🗺️",
        "exploration",
        Some("locations"),
        10.0,
        100,
    ),
    // Consistency
    seed(
        "Weekend Warrior",
        "Complete 4 hikes in 4 consecutive weekends",
        "⚔️",
        "consistency",
        None,
        4.0,
        50,
    ),
    seed(
        "Monthly Hiker",
        "Complete at least one hike per month for 6 months",
        "📅",
        "consistency",
        None,
        6.0,
        100,
    ),
    seed(
        "Year-Round Adventurer",
        "Complete hikes in all 12 months of a year",
        "🌍",
        "consistency",
        None,
        12.0,
        250,
    ),
    // Special
    seed("Early Bird", "Start a hike before 6 AM", "🌅", "special", None, 1.0, 20),
    seed("Sunrise Chaser", "Complete 5 hikes starting before sunrise", "🌄", "special", None, 5.0, 60),
    seed(
        "Season Explorer",
        "Complete hikes in both dry and rainy seasons",
        "🌦️",
        "special",
        None,
        2.0,
        40,
    ),
    seed("Loop Enthusiast", "Complete 10 loop trails", "🔄", "special", None, 10.0, 50),
    seed("Point to Point Pro", "Complete 10 point-to-point trails", "➡️", "special", None, 10.0, 50),
];
