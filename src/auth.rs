// ABOUTME: JWT issuing and validation plus bcrypt password hashing
// ABOUTME: Resolves the caller identity from an Authorization bearer header
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

//! # Authentication
//!
//! Tokens are HS256 `JWT`s signed with the configured secret. They carry the
//! user id, username, and admin flag; nothing is stored server-side, so a
//! token stays valid until it expires.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::debug;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::constants::service_names;
use crate::errors::{AppError, AppResult};
use crate::models::User;

/// `JWT` claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// Username at issue time
    pub username: String,
    /// Whether the user may manage trail reference data
    pub is_admin: bool,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience
    pub aud: String,
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    /// Authenticated user `ID`
    pub user_id: Uuid,
    /// Username from the token
    pub username: String,
    /// Admin flag from the token
    pub is_admin: bool,
}

impl AuthResult {
    /// Require the admin flag
    ///
    /// # Errors
    ///
    /// Returns `PERMISSION_DENIED` for non-admin callers
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::permission_denied(
                "Administrator privileges required",
            ))
        }
    }
}

/// Token and password manager
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    bcrypt_cost: u32,
}

impl AuthManager {
    /// Create a manager from a raw HMAC secret
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64, bcrypt_cost: u32) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
            bcrypt_cost,
        }
    }

    /// Create a manager from server configuration
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            config.jwt_expiry_hours,
            config.bcrypt_cost,
        )
    }

    /// Issue a token for `user`
    ///
    /// # Errors
    ///
    /// Returns an error if token encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            is_admin: user.is_admin,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.token_expiry_hours)).timestamp(),
            aud: service_names::KILELE_SERVER.to_owned(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `AUTH_INVALID` for malformed, tampered, or expired tokens
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_audience(&[service_names::KILELE_SERVER]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("JWT validation failed: {e}");
                AppError::auth_invalid(format!("Invalid token: {e}"))
            })
    }

    /// Resolve the caller from the `Authorization` header
    ///
    /// # Errors
    ///
    /// Returns `AUTH_REQUIRED` when no bearer token is present and
    /// `AUTH_INVALID` when it does not validate
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let token = extract_bearer_token(headers).ok_or_else(AppError::auth_required)?;
        let claims = self.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Token subject is not a user id"))?;

        Ok(AuthResult {
            user_id,
            username: claims.username,
            is_admin: claims.is_admin,
        })
    }

    /// Hash a password with the configured cost off the async runtime
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
    }

    /// Check a password against a stored hash off the async runtime
    ///
    /// # Errors
    ///
    /// Returns an error if the verification task fails
    pub async fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
#[must_use]
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
