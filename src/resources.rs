// ABOUTME: Shared resource container handed to every route and background job
// ABOUTME: Holds the database, auth manager, configuration, matcher, notifier, and activity feed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

//! # Server Resources
//!
// NOTE: All `.clone()` calls in this file are Safe - they are Arc clones of
// shared resources
//!
//! Everything a request handler needs is built once at startup from an
//! explicit [`ServerConfig`] and passed around behind an `Arc`.

use std::sync::Arc;

use kilele_intelligence::TrailMatcher;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::errors::AppResult;
use crate::notifications::{AchievementNotifier, LoggingNotifier};
use crate::providers::{ActivityFeed, StravaClient};

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Storage
    pub database: Arc<Database>,
    /// Token and password handling
    pub auth_manager: Arc<AuthManager>,
    /// Configuration the server was started with
    pub config: Arc<ServerConfig>,
    /// Trail proximity matcher built from the configured radius
    pub matcher: TrailMatcher,
    /// Receives unlocked achievements after commit
    pub notifier: Arc<dyn AchievementNotifier>,
    /// Source of Strava activities
    pub activity_feed: Arc<dyn ActivityFeed>,
}

impl ServerResources {
    /// Build resources with the logging notifier and the live Strava client
    ///
    /// # Errors
    ///
    /// Returns an error if the Strava HTTP client cannot be built
    pub fn new(database: Database, config: Arc<ServerConfig>) -> AppResult<Self> {
        let activity_feed = Arc::new(StravaClient::from_config(&config.strava)?);
        Ok(Self {
            database: Arc::new(database),
            auth_manager: Arc::new(AuthManager::from_config(&config.auth)),
            matcher: TrailMatcher::new(config.matching),
            notifier: Arc::new(LoggingNotifier),
            activity_feed,
            config,
        })
    }

    /// Replace the achievement notifier
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn AchievementNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replace the activity feed
    #[must_use]
    pub fn with_activity_feed(mut self, activity_feed: Arc<dyn ActivityFeed>) -> Self {
        self.activity_feed = activity_feed;
        self
    }
}
