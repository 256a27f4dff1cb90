use std::time::Duration;

use serde::{Deserialize, Serialize};
use templar_core::{AppResult, NonEmptyString, OrganizationId};

use crate::schedule::validate_template_schedule;
use crate::{TemplateId, UserId};

/// Workspace blueprint carrying scheduling policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    id: TemplateId,
    organization_id: OrganizationId,
    name: NonEmptyString,
    created_by: UserId,
    default_ttl: Duration,
    max_ttl: Duration,
}

impl Template {
    /// Creates a validated template.
    pub fn new(
        id: TemplateId,
        organization_id: OrganizationId,
        name: impl Into<String>,
        created_by: UserId,
        default_ttl: Duration,
        max_ttl: Duration,
    ) -> AppResult<Self> {
        validate_template_schedule(default_ttl, max_ttl)?;

        Ok(Self {
            id,
            organization_id,
            name: NonEmptyString::new(name)?,
            created_by,
            default_ttl,
            max_ttl,
        })
    }

    /// Returns the template identifier.
    #[must_use]
    pub fn id(&self) -> TemplateId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the template name, unique within its organization.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the creating user.
    #[must_use]
    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    /// TTL copied onto workspaces created without one; zero means none.
    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Upper bound on workspace TTLs; zero means unconstrained.
    #[must_use]
    pub fn max_ttl(&self) -> Duration {
        self.max_ttl
    }

    /// Returns a copy with a validated new schedule.
    pub fn with_schedule(mut self, default_ttl: Duration, max_ttl: Duration) -> AppResult<Self> {
        validate_template_schedule(default_ttl, max_ttl)?;
        self.default_ttl = default_ttl;
        self.max_ttl = max_ttl;
        Ok(self)
    }
}
