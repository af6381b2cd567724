// ABOUTME: Hook invoked after achievements are unlocked and committed
// ABOUTME: The default notifier records a structured log event per unlock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::models::UnlockedAchievement;

/// Receives newly unlocked achievements once their unit of work has committed
#[async_trait]
pub trait AchievementNotifier: Send + Sync {
    /// Deliver `unlocked` for `user_id`; never called with an empty slice
    async fn achievements_unlocked(&self, user_id: Uuid, unlocked: &[UnlockedAchievement]);
}

/// Notifier that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotifier;

#[async_trait]
impl AchievementNotifier for LoggingNotifier {
    async fn achievements_unlocked(&self, user_id: Uuid, unlocked: &[UnlockedAchievement]) {
        for achievement in unlocked {
            info!(
                %user_id,
                achievement_id = %achievement.achievement_id,
                name = %achievement.name,
                points = achievement.points,
                "Achievement unlocked"
            );
        }
    }
}
