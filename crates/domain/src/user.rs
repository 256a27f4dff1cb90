//! User principals and their lifecycle status.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use templar_core::{AppError, AppResult, NonEmptyString};

use crate::UserId;

/// Lifecycle status of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// The user can sign in and hold grants.
    Active,
    /// The user is temporarily disabled; grants are hidden but kept.
    Suspended,
    /// The user was soft-deleted; grants are hidden but kept.
    Deleted,
}

impl UserStatus {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Deleted => "deleted",
        }
    }

    /// Returns whether a user in this status counts as a live principal.
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl FromStr for UserStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "deleted" => Ok(Self::Deleted),
            _ => Err(AppError::Validation(format!(
                "unknown user status '{value}'"
            ))),
        }
    }
}

/// User principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: NonEmptyString,
    status: UserStatus,
}

impl User {
    /// Creates a validated user.
    pub fn new(id: UserId, username: impl Into<String>, status: UserStatus) -> AppResult<Self> {
        Ok(Self {
            id,
            username: NonEmptyString::new(username)?,
            status,
        })
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the login name.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub fn status(&self) -> UserStatus {
        self.status
    }

    /// Returns whether the user currently resolves as a live principal.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    /// Returns a copy with a different status.
    #[must_use]
    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }
}
