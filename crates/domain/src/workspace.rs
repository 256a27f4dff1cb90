use std::time::Duration;

use serde::{Deserialize, Serialize};
use templar_core::{AppResult, NonEmptyString, OrganizationId};

use crate::{TemplateId, UserId, WorkspaceId};

/// Workspace created from a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    id: WorkspaceId,
    organization_id: OrganizationId,
    template_id: TemplateId,
    owner_id: UserId,
    name: NonEmptyString,
    ttl: Option<Duration>,
}

impl Workspace {
    /// Creates a validated workspace.
    pub fn new(
        id: WorkspaceId,
        organization_id: OrganizationId,
        template_id: TemplateId,
        owner_id: UserId,
        name: impl Into<String>,
        ttl: Option<Duration>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            organization_id,
            template_id,
            owner_id,
            name: NonEmptyString::new(name)?,
            ttl,
        })
    }

    /// Returns the workspace identifier.
    #[must_use]
    pub fn id(&self) -> WorkspaceId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the template this workspace was created from.
    #[must_use]
    pub fn template_id(&self) -> TemplateId {
        self.template_id
    }

    /// Returns the owning user.
    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Returns the workspace name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Autostop TTL; `None` means no automatic stop.
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Returns a copy with a different TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }
}
