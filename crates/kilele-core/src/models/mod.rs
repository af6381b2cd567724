// ABOUTME: Domain models shared by the algorithms crate and the server
// ABOUTME: Plain data records with validation helpers; no storage access
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

mod achievement;
mod goal;
mod session;
mod social;
mod track;
mod trail;
mod user;

pub use achievement::{
    Achievement, AchievementCategory, AchievementProgress, UnlockedAchievement, UserAchievement,
};
pub use goal::{Goal, GoalStatus, GoalType, NewGoal};
pub use session::{HikeSession, SessionProgressUpdate, SessionStatus};
pub use social::{Bookmark, Review, SocialCounts};
pub use track::{Coordinate, NormalizedTrack, TrackPoint, TrackSource, TrackSummary};
pub use trail::{Difficulty, Trail, TrailInput};
pub use user::{User, UserProfile};
