use std::sync::Arc;
use std::time::Duration;

use templar_core::{AppError, AppResult, OrganizationId};
use templar_domain::{
    AclPrincipal, Action, AuditAction, GroupId, ResourceClass, Template, TemplateAclEntry,
    TemplateId, TemplateRole, UserId, schedule::MAX_TTL_FIELD,
};
use tracing::{debug, info};

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, TemplateListQuery, TemplateRepository,
};

#[cfg(test)]
mod tests;

/// Input payload for template creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTemplateInput {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Template name, unique within the organization.
    pub name: String,
    /// Default workspace TTL; zero means none.
    pub default_ttl: Duration,
    /// Max workspace TTL; zero means unconstrained.
    pub max_ttl: Duration,
}

/// Application service for template creation, reads and listing.
#[derive(Clone)]
pub struct TemplateService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn TemplateRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl TemplateService {
    /// Creates a template service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn TemplateRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_repository,
        }
    }

    /// Creates a template and grants the organization's implicit group `use`.
    pub async fn create_template(
        &self,
        actor_id: UserId,
        input: CreateTemplateInput,
    ) -> AppResult<Template> {
        let actor = self.authorization_service.resolve_actor(actor_id).await?;
        let organization_id = input.organization_id;

        if !actor.has_role_permission(organization_id, ResourceClass::Template, Action::Create) {
            if self
                .authorization_service
                .can_read_organization(&actor, organization_id)
            {
                return Err(AppError::Forbidden(format!(
                    "user '{actor_id}' cannot create templates in organization '{organization_id}'"
                )));
            }
            return Err(AppError::NotFound(format!(
                "organization '{organization_id}' does not exist"
            )));
        }

        if !self.authorization_service.features().advanced_scheduling && !input.max_ttl.is_zero()
        {
            return Err(AppError::invalid_field(
                MAX_TTL_FIELD,
                "max TTL requires advanced template scheduling",
            ));
        }

        let template = Template::new(
            TemplateId::new(),
            organization_id,
            input.name,
            actor_id,
            input.default_ttl,
            input.max_ttl,
        )?;
        let everyone_grant = TemplateAclEntry {
            template_id: template.id(),
            principal: AclPrincipal::Group(GroupId::everyone(organization_id)),
            role: TemplateRole::Use,
        };

        let template = self
            .repository
            .create_template(template, vec![everyone_grant])
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                organization_id,
                actor_id,
                action: AuditAction::TemplateCreated,
                resource_type: ResourceClass::Template.as_str().to_owned(),
                resource_id: template.id().to_string(),
                detail: Some(format!("created template '{}'", template.name())),
            })
            .await?;

        info!(
            template_id = %template.id(),
            organization_id = %organization_id,
            actor_id = %actor_id,
            "template created"
        );

        Ok(template)
    }

    /// Returns a template the actor can read.
    pub async fn get_template(&self, actor_id: UserId, template_id: TemplateId) -> AppResult<Template> {
        let actor = self.authorization_service.resolve_actor(actor_id).await?;
        let template = self.find_template(template_id).await?;

        self.authorization_service
            .authorize_template(&actor, Action::Read, &template)
            .await?;

        Ok(template)
    }

    /// Returns whether the actor may perform the action on the template.
    pub async fn can_access_template(
        &self,
        actor_id: UserId,
        action: Action,
        template_id: TemplateId,
    ) -> AppResult<bool> {
        let actor = self.authorization_service.resolve_actor(actor_id).await?;
        let template = self.find_template(template_id).await?;
        let allowed = self
            .authorization_service
            .can_access_template(&actor, action, &template)
            .await?;

        debug!(
            actor_id = %actor_id,
            template_id = %template_id,
            action = action.as_str(),
            allowed,
            "template access evaluated"
        );

        Ok(allowed)
    }

    /// Lists templates visible to the actor, optionally within one organization.
    pub async fn list_accessible_templates(
        &self,
        actor_id: UserId,
        organization_id: Option<OrganizationId>,
    ) -> AppResult<Vec<Template>> {
        let actor = self.authorization_service.resolve_actor(actor_id).await?;

        if let Some(organization_id) = organization_id
            && !self
                .authorization_service
                .can_read_organization(&actor, organization_id)
        {
            return Err(AppError::NotFound(format!(
                "organization '{organization_id}' does not exist"
            )));
        }

        let access = self.authorization_service.template_list_filter(&actor);
        self.repository
            .list_templates(TemplateListQuery {
                organization_id,
                access,
            })
            .await
    }

    async fn find_template(&self, template_id: TemplateId) -> AppResult<Template> {
        self.repository
            .find_template(template_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("template '{template_id}' does not exist")))
    }
}
