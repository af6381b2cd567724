// ABOUTME: User account model and the public profile view returned by the API
// ABOUTME: Password hashes never leave the storage layer through the profile type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered hiker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Unique handle
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Optional full name
    pub display_name: Option<String>,
    /// Bcrypt password hash
    pub password_hash: String,
    /// May curate trail reference data
    pub is_admin: bool,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a non-admin user with a fresh id
    #[must_use]
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        display_name: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            display_name,
            password_hash,
            is_admin: false,
            created_at: Utc::now(),
        }
    }
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    /// Unique identifier
    pub id: Uuid,
    /// Unique handle
    pub username: String,
    /// Optional full name
    pub display_name: Option<String>,
    /// May curate trail reference data
    pub is_admin: bool,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}
