// ABOUTME: Authentication and CORS configuration
// ABOUTME: JWT signing secret and lifetime, bcrypt cost, and allowed browser origins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::env;

use kilele_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use super::environment::Environment;

const DEFAULT_JWT_EXPIRY_HOURS: i64 = 720;
const DEFAULT_BCRYPT_COST: u32 = 12;
const MIN_JWT_SECRET_LENGTH: usize = 32;
const DEVELOPMENT_JWT_SECRET: &str = "kilele-development-secret-change-me-in-production";

/// Authentication configuration for JWT tokens and password hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign tokens
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_owned(),
            jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

impl AuthConfig {
    /// Load authentication configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing or short in production, or
    /// if `BCRYPT_COST` is outside bcrypt's accepted range
    pub fn from_env(environment: Environment) -> AppResult<Self> {
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if secret.len() >= MIN_JWT_SECRET_LENGTH => secret,
            Ok(_) if environment.is_production() => {
                return Err(AppError::config(format!(
                    "JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} characters"
                )))
            }
            Err(_) if environment.is_production() => {
                return Err(AppError::config("JWT_SECRET is required in production"))
            }
            Ok(secret) => secret,
            Err(_) => DEVELOPMENT_JWT_SECRET.to_owned(),
        };

        let bcrypt_cost = env::var("BCRYPT_COST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_BCRYPT_COST);
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(AppError::config(format!(
                "BCRYPT_COST must be between 4 and 31, got {bcrypt_cost}"
            )));
        }

        Ok(Self {
            jwt_secret,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .filter(|hours| *hours > 0)
                .unwrap_or(DEFAULT_JWT_EXPIRY_HOURS),
            bcrypt_cost,
        })
    }
}

/// Browser-facing security settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

impl SecurityConfig {
    /// Load security configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            cors_origins: parse_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_owned()),
            ),
        }
    }

    /// Whether any origin is accepted
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|origin| origin == "*")
    }
}

/// Split a comma-separated origin list
#[must_use]
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_skips_empty() {
        let origins = parse_origins("http://localhost:3000, https://kilele.app,,");
        assert_eq!(origins, vec!["http://localhost:3000", "https://kilele.app"]);
    }

    #[test]
    fn test_wildcard_allows_any_origin() {
        let config = SecurityConfig {
            cors_origins: vec!["*".into()],
        };
        assert!(config.allows_any_origin());
        let strict = SecurityConfig {
            cors_origins: vec!["https://kilele.app".into()],
        };
        assert!(!strict.allows_any_origin());
    }
}
