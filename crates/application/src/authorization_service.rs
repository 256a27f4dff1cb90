use std::collections::BTreeSet;
use std::sync::Arc;

use templar_core::{AppError, AppResult, OrganizationId};
use templar_domain::{AclPrincipal, Action, FeatureSet, GroupId, ResourceClass, Role, User, UserId};

use crate::{PrincipalRepository, TemplateAclRepository};

mod templates;
mod workspaces;


/// Live principal resolved for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    user: User,
    roles: Vec<Role>,
    group_ids: Vec<GroupId>,
}

impl ActorContext {
    /// Creates an actor context from resolved principal data.
    #[must_use]
    pub fn new(user: User, mut roles: Vec<Role>, group_ids: Vec<GroupId>) -> Self {
        roles.sort();
        roles.dedup();
        Self {
            user,
            roles,
            group_ids,
        }
    }

    /// Returns the acting user.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Returns the acting user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user.id()
    }

    /// Returns site roles in precedence order.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Returns organizations the actor belongs to.
    #[must_use]
    pub fn member_organizations(&self) -> BTreeSet<OrganizationId> {
        self.roles
            .iter()
            .filter_map(Role::organization_id)
            .collect()
    }

    /// Returns whether the actor belongs to the organization.
    #[must_use]
    pub fn is_member_of(&self, organization_id: OrganizationId) -> bool {
        self.roles
            .iter()
            .any(|role| role.organization_id() == Some(organization_id))
    }

    /// Returns whether any role grants the action on the class in the organization.
    #[must_use]
    pub fn has_role_permission(
        &self,
        organization_id: OrganizationId,
        resource_class: ResourceClass,
        action: Action,
    ) -> bool {
        self.roles
            .iter()
            .any(|role| role.allows(organization_id, resource_class, action))
    }

    /// Returns whether the actor holds a site-wide role with template access.
    #[must_use]
    pub fn has_site_wide_template_role(&self) -> bool {
        self.roles
            .iter()
            .any(|role| role.allows_site_wide(ResourceClass::Template, Action::Read))
    }

    /// Explicit groups the actor belongs to.
    #[must_use]
    pub fn group_ids(&self) -> &[GroupId] {
        &self.group_ids
    }

    /// Principals whose grants apply to the actor on a template of the organization.
    ///
    /// Returns nothing when the actor is not a member: grants never reach
    /// across organizations.
    #[must_use]
    pub fn principals_in(&self, organization_id: OrganizationId) -> Vec<AclPrincipal> {
        if !self.is_member_of(organization_id) {
            return Vec::new();
        }

        let mut principals = Vec::with_capacity(self.group_ids.len() + 2);
        principals.push(AclPrincipal::User(self.user_id()));
        principals.push(AclPrincipal::Group(GroupId::everyone(organization_id)));
        principals.extend(self.group_ids.iter().copied().map(AclPrincipal::Group));
        principals
    }
}

/// Application service for template and workspace authorization checks.
#[derive(Clone)]
pub struct AuthorizationService {
    principals: Arc<dyn PrincipalRepository>,
    acl_repository: Arc<dyn TemplateAclRepository>,
    features: FeatureSet,
}

impl AuthorizationService {
    /// Creates a new authorization service from repository implementations.
    #[must_use]
    pub fn new(
        principals: Arc<dyn PrincipalRepository>,
        acl_repository: Arc<dyn TemplateAclRepository>,
        features: FeatureSet,
    ) -> Self {
        Self {
            principals,
            acl_repository,
            features,
        }
    }

    /// Returns the enabled feature set.
    #[must_use]
    pub fn features(&self) -> FeatureSet {
        self.features
    }

    /// Resolves a live actor with its roles and explicit groups.
    pub async fn resolve_actor(&self, user_id: UserId) -> AppResult<ActorContext> {
        let user = self
            .principals
            .find_user(user_id)
            .await?
            .filter(User::is_live)
            .ok_or_else(|| {
                AppError::Unauthorized(format!("user '{user_id}' is not an active principal"))
            })?;

        let roles = self.principals.list_roles_for_user(user_id).await?;
        let group_ids = self.principals.list_group_ids_for_user(user_id).await?;

        Ok(ActorContext::new(user, roles, group_ids))
    }

    /// Returns whether the actor may read the organization itself.
    #[must_use]
    pub fn can_read_organization(
        &self,
        actor: &ActorContext,
        organization_id: OrganizationId,
    ) -> bool {
        actor.has_role_permission(organization_id, ResourceClass::Organization, Action::Read)
    }
}
