//! Resource-scoped template grants.
//!
//! A [`TemplateRole`] is separate from the site-wide [`crate::Role`]: it is
//! attached to one principal for one template. `Deleted` is a write-time
//! instruction only and never appears in stored or returned entries.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use templar_core::AppError;

use crate::{Action, GroupId, TemplateId, UserId};

/// Template-scoped role token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateRole {
    /// Read the template and create workspaces from it.
    Use,
    /// Full control of the template, including its grants.
    Admin,
    /// Removes any existing grant for the principal.
    Deleted,
}

impl TemplateRole {
    /// Returns the transport token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Use => "use",
            Self::Admin => "admin",
            Self::Deleted => "",
        }
    }

    /// Parses a transport token into a template role.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }

    /// Returns the relative strength of the grant; `Deleted` grants nothing.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Self::Deleted => 0,
            Self::Use => 1,
            Self::Admin => 2,
        }
    }

    /// Returns whether the grant permits the template action.
    #[must_use]
    pub fn permits(&self, action: Action) -> bool {
        match self {
            Self::Deleted => false,
            Self::Use => matches!(action, Action::Read | Action::Use),
            Self::Admin => matches!(
                action,
                Action::Read
                    | Action::Use
                    | Action::Update
                    | Action::Delete
                    | Action::CreateVersion
                    | Action::ManageAcl
            ),
        }
    }

    /// Returns the stronger of two grants.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        if other.rank() > self.rank() { other } else { self }
    }
}

impl FromStr for TemplateRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "use" => Ok(Self::Use),
            "admin" => Ok(Self::Admin),
            "" | "deleted" => Ok(Self::Deleted),
            _ => Err(AppError::Validation(format!(
                "unknown template role '{value}'"
            ))),
        }
    }
}

/// Principal a template grant is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum AclPrincipal {
    /// Individual user.
    User(UserId),
    /// Group, including an organization's implicit group.
    Group(GroupId),
}

impl AclPrincipal {
    /// Returns the storage kind label.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Group(_) => "group",
        }
    }

    /// Returns the raw principal UUID.
    #[must_use]
    pub fn as_uuid(&self) -> uuid::Uuid {
        match self {
            Self::User(user_id) => user_id.as_uuid(),
            Self::Group(group_id) => group_id.as_uuid(),
        }
    }
}

/// One stored grant: only `use` and `admin` ever persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateAclEntry {
    /// Template the grant belongs to.
    pub template_id: TemplateId,
    /// Grantee.
    pub principal: AclPrincipal,
    /// Granted role.
    pub role: TemplateRole,
}

/// One validated grant change, applied with upsert semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateAclChange {
    /// Grantee.
    pub principal: AclPrincipal,
    /// Role to set; `Deleted` removes the entry.
    pub role: TemplateRole,
}
