// ABOUTME: Type-safe database URL configuration
// ABOUTME: Distinguishes file-backed SQLite from the in-memory database used in tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

use kilele_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Where the database lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Path to `SQLite` database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error for empty or non-`SQLite` URLs
    pub fn parse_url(s: &str) -> AppResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AppError::config("DATABASE_URL must not be empty"));
        }
        if trimmed.starts_with("postgres://") || trimmed.starts_with("postgresql://") {
            return Err(AppError::config(
                "Only SQLite databases are supported (sqlite:<path> or sqlite::memory:)",
            ));
        }
        let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
        let path_str = path_str.strip_prefix("//").unwrap_or(path_str);
        if path_str == ":memory:" {
            Ok(Self::Memory)
        } else {
            Ok(Self::SQLite {
                path: PathBuf::from(path_str),
            })
        }
    }

    /// Convert to a connection string understood by sqlx
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".into(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/kilele.db"),
        }
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.to_connection_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_and_file_urls() {
        assert_eq!(DatabaseUrl::parse_url("sqlite::memory:").unwrap(), DatabaseUrl::Memory);
        let file = DatabaseUrl::parse_url("sqlite:./data/test.db").unwrap();
        assert_eq!(file.to_connection_string(), "sqlite:./data/test.db");
        assert!(DatabaseUrl::parse_url("postgres://localhost/db").is_err());
        assert!(DatabaseUrl::parse_url("  ").is_err());
    }
}
