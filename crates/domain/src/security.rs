use std::str::FromStr;

use serde::{Deserialize, Serialize};
use templar_core::{AppError, OrganizationId};

/// Resource classes covered by the static permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    /// Versioned workspace blueprint.
    Template,
    /// Workspace derived from a template.
    Workspace,
    /// Organization-scoped group.
    Group,
    /// User account.
    User,
    /// Organization itself.
    Organization,
}

impl ResourceClass {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Workspace => "workspace",
            Self::Group => "group",
            Self::User => "user",
            Self::Organization => "organization",
        }
    }
}

/// Actions checked by authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// View the resource.
    Read,
    /// Create workspaces from a template.
    Use,
    /// Change resource metadata.
    Update,
    /// Remove the resource.
    Delete,
    /// Create a resource of this class.
    Create,
    /// Push a new template version.
    CreateVersion,
    /// Change resource-scoped grants.
    ManageAcl,
}

impl Action {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Use => "use",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Create => "create",
            Self::CreateVersion => "create_version",
            Self::ManageAcl => "manage_acl",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[
            Action::Read,
            Action::Use,
            Action::Update,
            Action::Delete,
            Action::Create,
            Action::CreateVersion,
            Action::ManageAcl,
        ];

        ALL
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown action '{value}'")))
    }
}

/// Site-wide role held by a user, optionally bound to one organization.
///
/// Variants are declared in precedence order: owner outranks everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "role", content = "organization_id")]
pub enum Role {
    /// Site owner.
    Owner,
    /// Site-wide template administrator.
    TemplateAdmin,
    /// Administrator of one organization.
    OrgAdmin(OrganizationId),
    /// Member of one organization.
    OrgMember(OrganizationId),
}

impl Role {
    /// Returns the stable role name without scope.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::TemplateAdmin => "template-admin",
            Self::OrgAdmin(_) => "organization-admin",
            Self::OrgMember(_) => "organization-member",
        }
    }

    /// Parses a stored role name and optional organization scope.
    pub fn parse(name: &str, organization_id: Option<OrganizationId>) -> Result<Self, AppError> {
        match (name, organization_id) {
            ("owner", None) => Ok(Self::Owner),
            ("template-admin", None) => Ok(Self::TemplateAdmin),
            ("organization-admin", Some(organization_id)) => Ok(Self::OrgAdmin(organization_id)),
            ("organization-member", Some(organization_id)) => {
                Ok(Self::OrgMember(organization_id))
            }
            ("owner" | "template-admin", Some(_)) => Err(AppError::Validation(format!(
                "role '{name}' is site-wide and cannot be scoped to an organization"
            ))),
            ("organization-admin" | "organization-member", None) => Err(AppError::Validation(
                format!("role '{name}' requires an organization scope"),
            )),
            _ => Err(AppError::Validation(format!("unknown role '{name}'"))),
        }
    }

    /// Returns the organization this role is bound to, if any.
    #[must_use]
    pub fn organization_id(&self) -> Option<OrganizationId> {
        match self {
            Self::Owner | Self::TemplateAdmin => None,
            Self::OrgAdmin(organization_id) | Self::OrgMember(organization_id) => {
                Some(*organization_id)
            }
        }
    }

    /// Returns whether the role reaches resources of the organization.
    #[must_use]
    pub fn applies_to(&self, organization_id: OrganizationId) -> bool {
        self.organization_id()
            .is_none_or(|scope| scope == organization_id)
    }

    /// Static permission table lookup, ignoring organization scope.
    #[must_use]
    pub fn permits(&self, resource_class: ResourceClass, action: Action) -> bool {
        use Action::{Create, Delete, Read, Update};
        use ResourceClass::{Group, Organization, Template, User, Workspace};

        match self {
            Self::Owner => true,
            Self::TemplateAdmin => match resource_class {
                Template => true,
                Workspace | Group | User | Organization => action == Read,
            },
            Self::OrgAdmin(_) => match resource_class {
                Template | Workspace | Group => true,
                Organization => matches!(action, Read | Update),
                User => action == Read,
            },
            Self::OrgMember(_) => match resource_class {
                Template => false,
                Workspace => matches!(action, Read | Update | Delete | Create),
                Group | User | Organization => action == Read,
            },
        }
    }

    /// Returns whether the role grants the action on a resource of the organization.
    #[must_use]
    pub fn allows(
        &self,
        organization_id: OrganizationId,
        resource_class: ResourceClass,
        action: Action,
    ) -> bool {
        self.applies_to(organization_id) && self.permits(resource_class, action)
    }

    /// Returns whether the role grants the action on the class in every organization.
    #[must_use]
    pub fn allows_site_wide(&self, resource_class: ResourceClass, action: Action) -> bool {
        self.organization_id().is_none() && self.permits(resource_class, action)
    }
}

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a template is created.
    TemplateCreated,
    /// Emitted when template grants change.
    TemplateAclUpdated,
    /// Emitted when template TTL settings change.
    TemplateScheduleUpdated,
    /// Emitted when a workspace TTL changes.
    WorkspaceTtlUpdated,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TemplateCreated => "template.created",
            Self::TemplateAclUpdated => "template.acl.updated",
            Self::TemplateScheduleUpdated => "template.schedule.updated",
            Self::WorkspaceTtlUpdated => "workspace.ttl.updated",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use templar_core::OrganizationId;

    use super::{Action, ResourceClass, Role};

    #[test]
    fn action_roundtrip_storage_value() {
        let action = Action::CreateVersion;
        let restored = Action::from_str(action.as_str());
        assert_eq!(restored.ok(), Some(action));
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(Action::from_str("impersonate").is_err());
    }

    #[test]
    fn org_admin_is_confined_to_its_organization() {
        let home = OrganizationId::new();
        let other = OrganizationId::new();
        let role = Role::OrgAdmin(home);

        assert!(role.allows(home, ResourceClass::Template, Action::Read));
        assert!(!role.allows(other, ResourceClass::Template, Action::Read));
        assert!(!role.allows_site_wide(ResourceClass::Template, Action::Read));
    }

    #[test]
    fn template_admin_reads_templates_everywhere() {
        let role = Role::TemplateAdmin;
        assert!(role.allows_site_wide(ResourceClass::Template, Action::Read));
        assert!(role.allows(OrganizationId::new(), ResourceClass::Template, Action::ManageAcl));
        assert!(!role.permits(ResourceClass::Workspace, Action::Delete));
    }

    #[test]
    fn org_member_has_no_blanket_template_access() {
        let organization_id = OrganizationId::new();
        let role = Role::OrgMember(organization_id);

        for action in Action::all() {
            assert!(!role.allows(organization_id, ResourceClass::Template, *action));
        }
        assert!(role.allows(organization_id, ResourceClass::Organization, Action::Read));
    }

    #[test]
    fn owner_permits_everything() {
        for action in Action::all() {
            assert!(Role::Owner.allows_site_wide(ResourceClass::Template, *action));
            assert!(Role::Owner.allows_site_wide(ResourceClass::User, *action));
        }
    }

    #[test]
    fn role_parse_enforces_scope() {
        let organization_id = OrganizationId::new();
        assert_eq!(Role::parse("owner", None).ok(), Some(Role::Owner));
        assert_eq!(
            Role::parse("organization-member", Some(organization_id)).ok(),
            Some(Role::OrgMember(organization_id))
        );
        assert!(Role::parse("organization-admin", None).is_err());
        assert!(Role::parse("template-admin", Some(organization_id)).is_err());
        assert!(Role::parse("auditor", None).is_err());
    }

    #[test]
    fn roles_are_ordered_by_precedence() {
        let organization_id = OrganizationId::new();
        assert!(Role::Owner < Role::TemplateAdmin);
        assert!(Role::TemplateAdmin < Role::OrgAdmin(organization_id));
        assert!(Role::OrgAdmin(organization_id) < Role::OrgMember(organization_id));
    }
}
