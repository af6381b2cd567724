// ABOUTME: Achievement evaluator comparing aggregated statistics against catalog requirements
// ABOUTME: Produces monotonic progress changes and the set of newly unlocked achievements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

//! Achievement evaluation.
//!
//! Each catalog entry resolves to an [`AchievementRule`] from its category
//! and metric. Entries without a rule, or with a requirement that is not a
//! positive finite number, are skipped. Progress only ever grows and a
//! completed achievement stays completed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kilele_core::models::{
    Achievement, AchievementCategory, Difficulty, SocialCounts, UnlockedAchievement,
    UserAchievement,
};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::progress::ProgressStats;

/// Statistic an achievement requirement is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementRule {
    /// Total kilometres
    TotalDistance,
    /// Total metres climbed
    TotalElevation,
    /// Completed sessions
    CompletedHikes,
    /// Completed sessions on one difficulty
    CompletedOnDifficulty(Difficulty),
    /// Number of difficulties with a completion
    DistinctDifficulties,
    /// Users following this user
    Followers,
    /// Users this user follows
    Following,
    /// Reviews written
    ReviewsWritten,
    /// Helpful votes received on reviews
    HelpfulVotes,
    /// Distinct trail locations visited
    DistinctLocations,
    /// Distinct trails visited
    DistinctTrails,
    /// Trails bookmarked
    Bookmarks,
}

impl AchievementRule {
    /// Rule for a category/metric pair, `None` when nothing evaluates it
    #[must_use]
    pub fn resolve(category: &AchievementCategory, metric: Option<&str>) -> Option<Self> {
        let metric = metric.map(|m| m.trim().to_lowercase());
        let metric = metric.as_deref();
        match category {
            AchievementCategory::Distance => Some(Self::TotalDistance),
            AchievementCategory::Elevation => Some(Self::TotalElevation),
            AchievementCategory::Count => Some(Self::CompletedHikes),
            AchievementCategory::Difficulty => match metric? {
                "all" => Some(Self::DistinctDifficulties),
                label => label.parse().ok().map(Self::CompletedOnDifficulty),
            },
            AchievementCategory::Social => match metric {
                None | Some("followers") => Some(Self::Followers),
                Some("following") => Some(Self::Following),
                Some(_) => None,
            },
            AchievementCategory::Reviews => match metric {
                None | Some("reviews") => Some(Self::ReviewsWritten),
                Some("helpful_votes") => Some(Self::HelpfulVotes),
                Some(_) => None,
            },
            AchievementCategory::Exploration => match metric {
                None | Some("locations") => Some(Self::DistinctLocations),
                Some("trails") => Some(Self::DistinctTrails),
                Some("bookmarks") => Some(Self::Bookmarks),
                Some(_) => None,
            },
            AchievementCategory::Special | AchievementCategory::Other(_) => None,
        }
    }

    /// Current value of the statistic
    #[must_use]
    pub fn observe(&self, context: &EvaluationContext<'_>) -> f64 {
        let stats = context.progress;
        let social = context.social;
        match self {
            Self::TotalDistance => stats.total_distance_km,
            Self::TotalElevation => stats.total_elevation_gain_m,
            Self::CompletedHikes => stats.completed_sessions as f64,
            Self::CompletedOnDifficulty(difficulty) => {
                stats.completed_by_difficulty.get(*difficulty) as f64
            }
            Self::DistinctDifficulties => stats.completed_by_difficulty.distinct() as f64,
            Self::Followers => social.followers as f64,
            Self::Following => social.following as f64,
            Self::ReviewsWritten => social.reviews_written as f64,
            Self::HelpfulVotes => social.helpful_votes as f64,
            Self::DistinctLocations => stats.distinct_locations as f64,
            Self::DistinctTrails => stats.distinct_trails as f64,
            Self::Bookmarks => social.bookmarks as f64,
        }
    }
}

/// Statistics an evaluation run reads
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Aggregated session statistics
    pub progress: &'a ProgressStats,
    /// Social and review counts
    pub social: &'a SocialCounts,
}

/// Result of checking one catalog entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementOutcome {
    /// Catalog entry
    pub achievement_id: Uuid,
    /// Raw statistic value
    pub observed: f64,
    /// Observed value capped at the requirement
    pub progress: f64,
    /// Whether the requirement is met
    pub satisfied: bool,
}

/// What should be persisted for one achievement
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressChange {
    /// Catalog entry
    pub achievement_id: Uuid,
    /// Progress after merging with the stored record
    pub progress: f64,
    /// Completion after merging
    pub completed: bool,
    /// Completion timestamp after merging
    pub earned_at: Option<DateTime<Utc>>,
    /// True only on the run that first completes it
    pub newly_completed: bool,
}

/// Changes to persist plus the achievements unlocked by this run
#[derive(Debug, Clone, Default)]
pub struct EvaluationPlan {
    /// Records to upsert
    pub changes: Vec<ProgressChange>,
    /// Achievements completed for the first time
    pub unlocked: Vec<UnlockedAchievement>,
}

/// Stateless achievement evaluator
pub struct AchievementEvaluator;

impl AchievementEvaluator {
    /// Check every evaluable catalog entry against the context
    #[must_use]
    pub fn evaluate(
        catalog: &[Achievement],
        context: &EvaluationContext<'_>,
    ) -> Vec<AchievementOutcome> {
        catalog
            .iter()
            .filter_map(|achievement| Self::evaluate_one(achievement, context))
            .collect()
    }

    /// Check one catalog entry, `None` when it cannot be evaluated
    #[must_use]
    pub fn evaluate_one(
        achievement: &Achievement,
        context: &EvaluationContext<'_>,
    ) -> Option<AchievementOutcome> {
        let requirement = achievement.requirement;
        if !requirement.is_finite() || requirement <= 0.0 {
            warn!(
                achievement = %achievement.name,
                requirement,
                "Skipping achievement with non-positive requirement"
            );
            return None;
        }
        let Some(rule) =
            AchievementRule::resolve(&achievement.category, achievement.metric.as_deref())
        else {
            debug!(
                achievement = %achievement.name,
                category = %achievement.category,
                "No evaluation rule for achievement"
            );
            return None;
        };

        let observed = rule.observe(context);
        Some(AchievementOutcome {
            achievement_id: achievement.id,
            observed,
            progress: observed.min(requirement),
            satisfied: observed >= requirement,
        })
    }

    /// Merge an outcome into the stored record without ever regressing it
    #[must_use]
    pub fn merge(
        existing: Option<&UserAchievement>,
        outcome: &AchievementOutcome,
        now: DateTime<Utc>,
    ) -> ProgressChange {
        let (previous_progress, previous_completed, previous_earned) = existing
            .map_or((0.0, false, None), |record| {
                (record.progress, record.completed, record.earned_at)
            });

        let newly_completed = outcome.satisfied && !previous_completed;
        ProgressChange {
            achievement_id: outcome.achievement_id,
            progress: previous_progress.max(outcome.progress),
            completed: previous_completed || outcome.satisfied,
            earned_at: previous_earned.or(newly_completed.then_some(now)),
            newly_completed,
        }
    }

    /// Full evaluation run: outcomes merged against stored records
    ///
    /// Only records whose progress grew or that became completed are
    /// returned as changes, so re-running with unchanged statistics yields
    /// an empty plan.
    #[must_use]
    pub fn plan(
        catalog: &[Achievement],
        existing: &[UserAchievement],
        context: &EvaluationContext<'_>,
        now: DateTime<Utc>,
    ) -> EvaluationPlan {
        let stored: HashMap<Uuid, &UserAchievement> = existing
            .iter()
            .map(|record| (record.achievement_id, record))
            .collect();

        let mut plan = EvaluationPlan::default();
        for achievement in catalog {
            let Some(outcome) = Self::evaluate_one(achievement, context) else {
                continue;
            };
            let previous = stored.get(&achievement.id).copied();
            let change = Self::merge(previous, &outcome, now);

            let grew = previous.map_or(change.progress > 0.0, |record| {
                change.progress > record.progress
            });
            if !grew && !change.newly_completed {
                continue;
            }
            if change.newly_completed {
                plan.unlocked.push(UnlockedAchievement {
                    achievement_id: achievement.id,
                    name: achievement.name.clone(),
                    points: achievement.points,
                    earned_at: now,
                });
            }
            plan.changes.push(change);
        }
        plan
    }
}
