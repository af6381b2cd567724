// ABOUTME: Activity intelligence for Kilele: trail matching, statistics, achievements, goals
// ABOUTME: Pure functions over domain models; the server supplies data and persists results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

#![deny(unsafe_code)]

//! # Kilele Intelligence
//!
//! Algorithms behind the hiking platform, free of I/O:
//!
//! - [`matching`]: links an imported track to the one trail whose trailhead
//!   lies near its start
//! - [`progress`]: folds sessions into lifetime statistics
//! - [`achievements`]: evaluates the catalog against those statistics
//! - [`goals`]: goal lifecycle rules
//! - [`catalog`]: the built-in achievement set

/// Built-in achievement catalog
pub mod catalog;

/// Achievement evaluation and monotonic progress merging
pub mod achievements;

/// Goal validation and completion
pub mod goals;

/// Bounding-box trail proximity matching
pub mod matching;

/// Session statistics aggregation
pub mod progress;

pub use achievements::{
    AchievementEvaluator, AchievementOutcome, AchievementRule, EvaluationContext, EvaluationPlan,
    ProgressChange,
};
pub use catalog::{AchievementSeed, SEED_ACHIEVEMENTS};
pub use goals::{GoalTracker, GoalTransition};
pub use matching::{BoundingBox, MatchingConfig, TrailLocation, TrailMatch, TrailMatcher};
pub use progress::{aggregate, DifficultyBreakdown, ProgressStats, SessionRecord};
