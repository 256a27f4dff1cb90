use std::str::FromStr;

use serde::{Deserialize, Serialize};
use templar_core::{AppError, OrganizationId};
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
            #[must_use]
            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
                    AppError::Validation(format!("invalid {} id '{value}': {error}", $label))
                })
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier for a user record.
    UserId,
    "user"
);

uuid_identifier!(
    /// Unique identifier for a group record.
    GroupId,
    "group"
);

uuid_identifier!(
    /// Unique identifier for a template.
    TemplateId,
    "template"
);

uuid_identifier!(
    /// Unique identifier for a workspace.
    WorkspaceId,
    "workspace"
);

impl GroupId {
    /// Returns the identifier of the organization's implicit "everyone" group.
    #[must_use]
    pub fn everyone(organization_id: OrganizationId) -> Self {
        Self(organization_id.as_uuid())
    }

    /// Returns whether this id names the "everyone" group of the organization.
    #[must_use]
    pub fn is_everyone_of(&self, organization_id: OrganizationId) -> bool {
        self.0 == organization_id.as_uuid()
    }
}
