// ABOUTME: Registration, login, and current-user route handlers
// ABOUTME: Issues bearer tokens; passwords are stored only as bcrypt hashes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

//! Authentication routes
//!
//! Registration and login are public; `/api/users/me` requires a token.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::authenticate;
use crate::constants::limits;
use crate::errors::{AppError, AppResult};
use crate::models::{User, UserProfile};
use crate::resources::ServerResources;

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Unique handle
    pub username: String,
    /// Unique email
    pub email: String,
    /// Plain-text password, at least eight characters
    pub password: String,
    /// Optional display name
    #[serde(default)]
    pub display_name: Option<String>,
}

impl RegisterRequest {
    fn validate(&self) -> AppResult<()> {
        if self.username.trim().is_empty() {
            return Err(AppError::invalid_input("Username is required"));
        }
        let email = self.email.trim();
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(AppError::invalid_input("A valid email address is required"));
        }
        if self.password.chars().count() < limits::MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {} characters",
                limits::MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Token plus the profile it was issued for
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token
    pub token: String,
    /// Token type, always `Bearer`
    pub token_type: String,
    /// Public profile
    pub user: UserProfile,
}

impl AuthResponse {
    fn new(token: String, user: &User) -> Self {
        Self {
            token,
            token_type: "Bearer".to_owned(),
            user: UserProfile::from(user),
        }
    }
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/users/me", get(Self::handle_me))
            .with_state(resources)
    }

    /// Handle POST /api/auth/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        request.validate()?;

        let password_hash = resources.auth_manager.hash_password(&request.password).await?;
        let user = User::new(
            request.username.trim().to_owned(),
            request.email.trim().to_lowercase(),
            password_hash,
            request.display_name.filter(|name| !name.trim().is_empty()),
        );
        resources.database.users().create_user(&user).await?;
        info!(user_id = %user.id, username = %user.username, "User registered");

        let token = resources.auth_manager.generate_token(&user)?;
        Ok((StatusCode::CREATED, Json(AuthResponse::new(token, &user))).into_response())
    }

    /// Handle POST /api/auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let invalid = || AppError::auth_invalid("Invalid email or password");

        let user = resources
            .database
            .users()
            .get_user_by_email(request.email.trim())
            .await?
            .ok_or_else(invalid)?;
        if !resources
            .auth_manager
            .verify_password(&request.password, &user.password_hash)
            .await?
        {
            return Err(invalid());
        }

        let token = resources.auth_manager.generate_token(&user)?;
        Ok((StatusCode::OK, Json(AuthResponse::new(token, &user))).into_response())
    }

    /// Handle GET /api/users/me
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let user = resources
            .database
            .users()
            .get_user(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        Ok((StatusCode::OK, Json(UserProfile::from(&user))).into_response())
    }
}
