use std::str::FromStr;
use std::sync::Arc;

use templar_core::{AppError, AppResult};
use templar_domain::{
    AclPrincipal, Action, AuditAction, GroupId, ResourceClass, Role, Template, TemplateAclChange,
    TemplateId, TemplateRole, UserId,
};
use tracing::{info, warn};

use crate::{
    ActorContext, AuditEvent, AuditRepository, AuthorizationService, PrincipalRepository,
    TemplateAcl, TemplateAclRepository, TemplateRepository,
};


const USER_PERMS_FIELD: &str = "user_perms";
const GROUP_PERMS_FIELD: &str = "group_perms";

/// Raw grant changes as supplied by a caller.
///
/// Each pair is `(principal id, role token)`; pairs are applied in order and
/// a later pair for the same principal overrides an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTemplateAclInput {
    /// User grants keyed by user id.
    pub user_perms: Vec<(String, String)>,
    /// Group grants keyed by group id; the organization id names the implicit group.
    pub group_perms: Vec<(String, String)>,
}

/// Application service for template grant reads and updates.
#[derive(Clone)]
pub struct TemplateAclService {
    authorization_service: AuthorizationService,
    principals: Arc<dyn PrincipalRepository>,
    templates: Arc<dyn TemplateRepository>,
    acl_repository: Arc<dyn TemplateAclRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl TemplateAclService {
    /// Creates a template ACL service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        principals: Arc<dyn PrincipalRepository>,
        templates: Arc<dyn TemplateRepository>,
        acl_repository: Arc<dyn TemplateAclRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            principals,
            templates,
            acl_repository,
            audit_repository,
        }
    }

    /// Returns the live grants of a template the actor can read.
    pub async fn get_template_acl(
        &self,
        actor_id: UserId,
        template_id: TemplateId,
    ) -> AppResult<TemplateAcl> {
        self.require_template_rbac()?;
        let actor = self.authorization_service.resolve_actor(actor_id).await?;
        let template = self.find_template(template_id).await?;

        self.authorization_service
            .authorize_template(&actor, Action::Read, &template)
            .await?;

        self.acl_repository.get_template_acl(template_id).await
    }

    /// Validates and applies grant changes as one atomic unit.
    pub async fn update_template_acl(
        &self,
        actor_id: UserId,
        template_id: TemplateId,
        input: UpdateTemplateAclInput,
    ) -> AppResult<()> {
        self.require_template_rbac()?;
        let actor = self.authorization_service.resolve_actor(actor_id).await?;
        let template = self.find_template(template_id).await?;

        if let Err(error) = self
            .authorization_service
            .authorize_template(&actor, Action::ManageAcl, &template)
            .await
        {
            warn!(
                actor_id = %actor_id,
                template_id = %template_id,
                "template ACL update denied"
            );
            return Err(error);
        }

        let mut changes = Vec::with_capacity(input.user_perms.len() + input.group_perms.len());
        for (raw_id, raw_role) in &input.user_perms {
            changes.push(self.parse_user_change(&template, raw_id, raw_role).await?);
        }
        for (raw_id, raw_role) in &input.group_perms {
            changes.push(self.parse_group_change(&template, raw_id, raw_role).await?);
        }

        self.reject_self_escalation(&actor, &template, &changes).await?;

        let user_changes = input.user_perms.len();
        let group_changes = input.group_perms.len();
        self.acl_repository
            .apply_acl_changes(template_id, changes)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                organization_id: template.organization_id(),
                actor_id,
                action: AuditAction::TemplateAclUpdated,
                resource_type: ResourceClass::Template.as_str().to_owned(),
                resource_id: template_id.to_string(),
                detail: Some(format!(
                    "applied {user_changes} user and {group_changes} group grant changes"
                )),
            })
            .await?;

        info!(
            template_id = %template_id,
            actor_id = %actor_id,
            user_changes,
            group_changes,
            "template ACL updated"
        );

        Ok(())
    }

    async fn parse_user_change(
        &self,
        template: &Template,
        raw_id: &str,
        raw_role: &str,
    ) -> AppResult<TemplateAclChange> {
        let user_id = UserId::from_str(raw_id)
            .map_err(|_| AppError::invalid_field(USER_PERMS_FIELD, format!("invalid user id '{raw_id}'")))?;
        let role = parse_role(USER_PERMS_FIELD, raw_role)?;

        let user = self
            .principals
            .find_user(user_id)
            .await?
            .filter(|user| user.is_live());
        let is_member = match user {
            Some(_) => self
                .principals
                .list_roles_for_user(user_id)
                .await?
                .iter()
                .any(|role| role.organization_id() == Some(template.organization_id())),
            None => false,
        };

        if !is_member {
            return Err(AppError::invalid_field(
                USER_PERMS_FIELD,
                format!(
                    "user '{user_id}' is not an active member of organization '{}'",
                    template.organization_id()
                ),
            ));
        }

        Ok(TemplateAclChange {
            principal: AclPrincipal::User(user_id),
            role,
        })
    }

    async fn parse_group_change(
        &self,
        template: &Template,
        raw_id: &str,
        raw_role: &str,
    ) -> AppResult<TemplateAclChange> {
        let group_id = GroupId::from_str(raw_id).map_err(|_| {
            AppError::invalid_field(GROUP_PERMS_FIELD, format!("invalid group id '{raw_id}'"))
        })?;
        let role = parse_role(GROUP_PERMS_FIELD, raw_role)?;

        let resolves = group_id.is_everyone_of(template.organization_id())
            || self
                .principals
                .find_group(group_id)
                .await?
                .is_some_and(|group| {
                    !group.is_deleted() && group.organization_id() == template.organization_id()
                });

        if !resolves {
            return Err(AppError::invalid_field(
                GROUP_PERMS_FIELD,
                format!(
                    "group '{group_id}' does not exist in organization '{}'",
                    template.organization_id()
                ),
            ));
        }

        Ok(TemplateAclChange {
            principal: AclPrincipal::Group(group_id),
            role,
        })
    }

    /// Rejects a caller raising their own direct grant above its stored level.
    ///
    /// Holders of a blanket role are exempt. Lowering, removing or rewriting
    /// the same level is always allowed; the last change for the caller wins.
    async fn reject_self_escalation(
        &self,
        actor: &ActorContext,
        template: &Template,
        changes: &[TemplateAclChange],
    ) -> AppResult<()> {
        let own_principal = AclPrincipal::User(actor.user_id());
        let Some(requested) = changes
            .iter()
            .rev()
            .find(|change| change.principal == own_principal)
            .map(|change| change.role)
        else {
            return Ok(());
        };

        let has_blanket_role = actor.roles().iter().any(|role| {
            !matches!(role, Role::OrgMember(_))
                && role.allows(
                    template.organization_id(),
                    ResourceClass::Template,
                    Action::ManageAcl,
                )
        });
        if has_blanket_role {
            return Ok(());
        }

        let current = self
            .acl_repository
            .list_grants_for_principals(template.id(), &[own_principal])
            .await?
            .into_iter()
            .map(|entry| entry.role)
            .fold(TemplateRole::Deleted, TemplateRole::max);

        if requested.rank() > current.rank() {
            return Err(AppError::Forbidden(format!(
                "user '{}' cannot raise their own grant on template '{}' from '{}' to '{}'",
                actor.user_id(),
                template.id(),
                current.as_str(),
                requested.as_str()
            )));
        }

        Ok(())
    }

    fn require_template_rbac(&self) -> AppResult<()> {
        if self.authorization_service.features().template_rbac {
            return Ok(());
        }

        Err(AppError::Forbidden("template RBAC is not enabled".to_owned()))
    }

    async fn find_template(&self, template_id: TemplateId) -> AppResult<Template> {
        self.templates
            .find_template(template_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("template '{template_id}' does not exist")))
    }
}

fn parse_role(field: &str, raw_role: &str) -> AppResult<TemplateRole> {
    TemplateRole::from_transport(raw_role)
        .map_err(|_| AppError::invalid_field(field, format!("invalid template role '{raw_role}'")))
}
