// ABOUTME: Top-level server configuration assembled from environment variables
// ABOUTME: HTTP port, deployment environment, database, auth, CORS, matching, and Strava settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};

use kilele_core::errors::{AppError, AppResult};
use kilele_intelligence::MatchingConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AuthConfig, DatabaseUrl, SecurityConfig, StravaConfig};

const DEFAULT_HTTP_PORT: u16 = 8000;

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback to development
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        })
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the HTTP server binds to
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Database location
    pub database: DatabaseUrl,
    /// Token and password settings
    pub auth: AuthConfig,
    /// CORS settings
    pub security: SecurityConfig,
    /// Trail proximity matching
    pub matching: MatchingConfig,
    /// Strava client and sync settings
    pub strava: StravaConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            environment: Environment::Development,
            database: DatabaseUrl::default(),
            auth: AuthConfig::default(),
            security: SecurityConfig::default(),
            matching: MatchingConfig::default(),
            strava: StravaConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_ERROR` when a variable is present but invalid
    pub fn from_env() -> AppResult<Self> {
        let environment = Environment::from_str_or_default(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        );

        let http_port = match env::var("HTTP_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| AppError::config(format!("Invalid HTTP_PORT '{raw}': {e}")))?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        let database = match env::var("DATABASE_URL") {
            Ok(raw) => DatabaseUrl::parse_url(&raw)?,
            Err(_) => DatabaseUrl::default(),
        };

        let matching = match env::var("TRAIL_MATCH_RADIUS_DEG") {
            Ok(raw) => {
                let radius = raw.parse().map_err(|e| {
                    AppError::config(format!("Invalid TRAIL_MATCH_RADIUS_DEG '{raw}': {e}"))
                })?;
                MatchingConfig::with_radius(radius)?
            }
            Err(_) => MatchingConfig::default(),
        };

        let config = Self {
            http_port,
            environment,
            database,
            auth: AuthConfig::from_env(environment)?,
            security: SecurityConfig::from_env(),
            matching,
            strava: StravaConfig::from_env(),
        };
        config.log_summary();
        Ok(config)
    }

    fn log_summary(&self) {
        info!(
            http_port = self.http_port,
            environment = %self.environment,
            database = %self.database,
            match_radius_deg = self.matching.radius_deg,
            strava_sync = self.strava.sync_enabled,
            "Server configuration loaded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing_falls_back_to_development() {
        assert_eq!(Environment::from_str_or_default("PROD"), Environment::Production);
        assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
        assert_eq!(Environment::from_str_or_default("staging"), Environment::Development);
    }

    #[test]
    fn test_default_config_values() {
        let config = ServerConfig::default();
        assert_eq!(config.http_port, 8000);
        assert!((config.matching.radius_deg - 0.05).abs() < f64::EPSILON);
        assert!(!config.strava.sync_enabled);
        assert_eq!(config.auth.jwt_expiry_hours, 720);
    }
}
