use std::sync::Arc;
use std::time::Duration;

use templar_core::{AppError, AppResult};
use templar_domain::schedule::{
    MAX_TTL_FIELD, plan_workspace_ttl_update, resolve_creation_ttl, validate_template_schedule,
};
use templar_domain::{
    Action, AuditAction, ResourceClass, Template, TemplateId, TtlRequest, TtlUpdatePlan, UserId,
    Workspace, WorkspaceId,
};
use tracing::info;

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, TemplateRepository, WorkspaceRepository,
};


/// Input payload for a template schedule update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateTemplateScheduleInput {
    /// New default workspace TTL; zero means none.
    pub default_ttl: Duration,
    /// New max workspace TTL; zero means unconstrained.
    pub max_ttl: Duration,
}

/// Input payload for workspace creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateWorkspaceInput {
    /// Template to build from.
    pub template_id: TemplateId,
    /// Workspace name.
    pub name: String,
    /// Requested TTL.
    pub ttl: TtlRequest,
}

/// Application service enforcing template TTL policy on workspaces.
#[derive(Clone)]
pub struct ScheduleService {
    authorization_service: AuthorizationService,
    templates: Arc<dyn TemplateRepository>,
    workspaces: Arc<dyn WorkspaceRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl ScheduleService {
    /// Creates a schedule service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        templates: Arc<dyn TemplateRepository>,
        workspaces: Arc<dyn WorkspaceRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            templates,
            workspaces,
            audit_repository,
        }
    }

    /// Updates a template schedule and clamps workspaces above the new max TTL.
    pub async fn update_template_schedule(
        &self,
        actor_id: UserId,
        template_id: TemplateId,
        input: UpdateTemplateScheduleInput,
    ) -> AppResult<Template> {
        let actor = self.authorization_service.resolve_actor(actor_id).await?;
        let template = self.find_template(template_id).await?;

        self.authorization_service
            .authorize_template(&actor, Action::Update, &template)
            .await?;

        if !self.authorization_service.features().advanced_scheduling && !input.max_ttl.is_zero()
        {
            return Err(AppError::invalid_field(
                MAX_TTL_FIELD,
                "max TTL requires advanced template scheduling",
            ));
        }
        validate_template_schedule(input.default_ttl, input.max_ttl)?;

        let update = self
            .templates
            .update_template_schedule(template_id, input.default_ttl, input.max_ttl)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                organization_id: template.organization_id(),
                actor_id,
                action: AuditAction::TemplateScheduleUpdated,
                resource_type: ResourceClass::Template.as_str().to_owned(),
                resource_id: template_id.to_string(),
                detail: Some(format!(
                    "default_ttl_ms={} max_ttl_ms={} clamped_workspaces={}",
                    input.default_ttl.as_millis(),
                    input.max_ttl.as_millis(),
                    update.clamped_workspaces
                )),
            })
            .await?;

        info!(
            template_id = %template_id,
            max_ttl_ms = input.max_ttl.as_millis() as u64,
            clamped_workspaces = update.clamped_workspaces,
            "template schedule updated"
        );

        Ok(update.template)
    }

    /// Resolves the TTL a new workspace of the template would receive.
    pub async fn validate_and_resolve_workspace_ttl(
        &self,
        template_id: TemplateId,
        requested: TtlRequest,
    ) -> AppResult<Option<Duration>> {
        let template = self.find_template(template_id).await?;
        resolve_creation_ttl(
            template.default_ttl(),
            self.effective_max_ttl(&template),
            requested,
        )
    }

    /// Creates a workspace from a template the actor may use.
    pub async fn create_workspace(
        &self,
        actor_id: UserId,
        input: CreateWorkspaceInput,
    ) -> AppResult<Workspace> {
        let actor = self.authorization_service.resolve_actor(actor_id).await?;
        let template = self.find_template(input.template_id).await?;

        self.authorization_service
            .authorize_template(&actor, Action::Use, &template)
            .await?;

        if !actor.has_role_permission(
            template.organization_id(),
            ResourceClass::Workspace,
            Action::Create,
        ) {
            return Err(AppError::Forbidden(format!(
                "user '{actor_id}' cannot create workspaces in organization '{}'",
                template.organization_id()
            )));
        }

        let ttl = resolve_creation_ttl(
            template.default_ttl(),
            self.effective_max_ttl(&template),
            input.ttl,
        )?;
        let workspace = Workspace::new(
            WorkspaceId::new(),
            template.organization_id(),
            template.id(),
            actor_id,
            input.name,
            ttl,
        )?;

        self.workspaces
            .create_workspace(workspace, self.enforces_max_ttl())
            .await
    }

    /// Returns a workspace the actor can read.
    pub async fn get_workspace(
        &self,
        actor_id: UserId,
        workspace_id: WorkspaceId,
    ) -> AppResult<Workspace> {
        let actor = self.authorization_service.resolve_actor(actor_id).await?;
        let workspace = self.find_workspace(workspace_id).await?;
        self.authorization_service
            .authorize_workspace(&actor, Action::Read, &workspace)?;
        Ok(workspace)
    }

    /// Updates a workspace TTL within the template's max TTL.
    ///
    /// An unset or zero TTL always succeeds; under a non-zero max TTL the
    /// stored value is left unchanged. The repository re-checks the max TTL
    /// at write time, so a concurrent schedule update cannot be overtaken.
    pub async fn update_workspace_ttl(
        &self,
        actor_id: UserId,
        workspace_id: WorkspaceId,
        ttl: Option<Duration>,
    ) -> AppResult<Workspace> {
        let actor = self.authorization_service.resolve_actor(actor_id).await?;
        let workspace = self.find_workspace(workspace_id).await?;
        self.authorization_service
            .authorize_workspace(&actor, Action::Update, &workspace)?;

        let template = self.find_template(workspace.template_id()).await?;
        let ttl = match plan_workspace_ttl_update(self.effective_max_ttl(&template), ttl)? {
            TtlUpdatePlan::KeepCurrent => return Ok(workspace),
            TtlUpdatePlan::Apply(ttl) => ttl,
        };

        let workspace = self
            .workspaces
            .update_workspace_ttl(workspace_id, ttl, self.enforces_max_ttl())
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                organization_id: workspace.organization_id(),
                actor_id,
                action: AuditAction::WorkspaceTtlUpdated,
                resource_type: ResourceClass::Workspace.as_str().to_owned(),
                resource_id: workspace_id.to_string(),
                detail: Some(match ttl {
                    Some(ttl) => format!("ttl_ms={}", ttl.as_millis()),
                    None => "ttl cleared".to_owned(),
                }),
            })
            .await?;

        Ok(workspace)
    }

    fn enforces_max_ttl(&self) -> bool {
        self.authorization_service.features().advanced_scheduling
    }

    fn effective_max_ttl(&self, template: &Template) -> Duration {
        if self.enforces_max_ttl() {
            template.max_ttl()
        } else {
            Duration::ZERO
        }
    }

    async fn find_template(&self, template_id: TemplateId) -> AppResult<Template> {
        self.templates
            .find_template(template_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("template '{template_id}' does not exist")))
    }

    async fn find_workspace(&self, workspace_id: WorkspaceId) -> AppResult<Workspace> {
        self.workspaces
            .find_workspace(workspace_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("workspace '{workspace_id}' does not exist"))
            })
    }
}
