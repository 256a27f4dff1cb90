use templar_core::{AppError, AppResult};
use templar_domain::{Action, GroupId, ResourceClass, Template, TemplateRole};

use crate::TemplateAccessFilter;

use super::{ActorContext, AuthorizationService};

impl AuthorizationService {
    /// Returns the strongest template-scoped grant that applies to the actor.
    ///
    /// Without template RBAC every organization member is treated as a `use`
    /// grantee of all templates in the organization.
    pub async fn template_grant(
        &self,
        actor: &ActorContext,
        template: &Template,
    ) -> AppResult<Option<TemplateRole>> {
        let organization_id = template.organization_id();
        if !actor.is_member_of(organization_id) {
            return Ok(None);
        }

        if !self.features.template_rbac {
            return Ok(Some(TemplateRole::Use));
        }

        let principals = actor.principals_in(organization_id);
        let grants = self
            .acl_repository
            .list_grants_for_principals(template.id(), &principals)
            .await?;

        Ok(grants
            .into_iter()
            .map(|entry| entry.role)
            .filter(|role| *role != TemplateRole::Deleted)
            .reduce(TemplateRole::max))
    }

    /// Returns whether the actor may perform the action on the template.
    pub async fn can_access_template(
        &self,
        actor: &ActorContext,
        action: Action,
        template: &Template,
    ) -> AppResult<bool> {
        let grant = self.template_grant(actor, template).await?;
        Ok(Self::template_access_allows(actor, template, grant, action))
    }

    /// Ensures the actor may perform the action on the template.
    ///
    /// A template the actor cannot read is reported as missing. A readable
    /// template with an insufficient grant is forbidden, except for grant
    /// management which is reported as missing.
    pub async fn authorize_template(
        &self,
        actor: &ActorContext,
        action: Action,
        template: &Template,
    ) -> AppResult<()> {
        let grant = self.template_grant(actor, template).await?;
        if Self::template_access_allows(actor, template, grant, action) {
            return Ok(());
        }

        let readable = Self::template_access_allows(actor, template, grant, Action::Read);
        if !readable || matches!(action, Action::Read | Action::ManageAcl) {
            return Err(AppError::NotFound(format!(
                "template '{}' does not exist",
                template.id()
            )));
        }

        Err(AppError::Forbidden(format!(
            "user '{}' is missing '{}' on template '{}'",
            actor.user_id(),
            action.as_str(),
            template.id()
        )))
    }

    /// Builds the visibility predicate used for template listing.
    #[must_use]
    pub fn template_list_filter(&self, actor: &ActorContext) -> TemplateAccessFilter {
        if actor.has_site_wide_template_role() {
            return TemplateAccessFilter::All;
        }

        let admin_organizations = actor
            .roles()
            .iter()
            .filter(|role| role.permits(ResourceClass::Template, Action::Read))
            .filter_map(|role| role.organization_id())
            .collect::<Vec<_>>();
        let member_organizations = actor.member_organizations();

        let mut nodes = Vec::new();
        if !admin_organizations.is_empty() {
            nodes.push(TemplateAccessFilter::InOrganizations(admin_organizations));
        }

        if !member_organizations.is_empty() {
            let scope =
                TemplateAccessFilter::InOrganizations(member_organizations.iter().copied().collect());
            if self.features.template_rbac {
                let mut groups = actor.group_ids().to_vec();
                groups.extend(
                    member_organizations
                        .iter()
                        .copied()
                        .map(GroupId::everyone),
                );
                nodes.push(TemplateAccessFilter::all_of(vec![
                    scope,
                    TemplateAccessFilter::GrantedTo {
                        users: vec![actor.user_id()],
                        groups,
                    },
                ]));
            } else {
                nodes.push(scope);
            }
        }

        TemplateAccessFilter::any_of(nodes)
    }

    fn template_access_allows(
        actor: &ActorContext,
        template: &Template,
        grant: Option<TemplateRole>,
        action: Action,
    ) -> bool {
        actor.has_role_permission(template.organization_id(), ResourceClass::Template, action)
            || grant.is_some_and(|role| role.permits(action))
    }
}
