use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use templar_core::{AppError, AppResult, OrganizationId};
use templar_domain::schedule::{clamp_to_max_ttl, validate_workspace_ttl};
use templar_domain::{
    AclPrincipal, FeatureSet, Group, GroupId, Role, Template, TemplateAclChange, TemplateAclEntry,
    TemplateId, TemplateRole, User, UserId, UserStatus, Workspace, WorkspaceId,
};
use tokio::sync::Mutex;

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, PrincipalRepository, TemplateAcl,
    TemplateAclRepository, TemplateGroupGrant, TemplateListQuery, TemplateRepository,
    TemplateScheduleUpdate, TemplateUserGrant, WorkspaceRepository,
};

/// Single fake backing every port so services share one view of state.
#[derive(Default)]
pub(crate) struct FakeStore {
    users: Mutex<HashMap<UserId, User>>,
    groups: Mutex<HashMap<GroupId, Group>>,
    roles: Mutex<HashMap<UserId, Vec<Role>>>,
    templates: Mutex<HashMap<TemplateId, Template>>,
    entries: Mutex<Vec<TemplateAclEntry>>,
    workspaces: Mutex<HashMap<WorkspaceId, Workspace>>,
    pub(crate) events: Mutex<Vec<AuditEvent>>,
}

impl FakeStore {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn authorization(self: &Arc<Self>, features: FeatureSet) -> AuthorizationService {
        AuthorizationService::new(self.clone(), self.clone(), features)
    }

    pub(crate) async fn add_user(&self, username: &str, roles: Vec<Role>) -> UserId {
        let user_id = UserId::new();
        let user = User::new(user_id, username, UserStatus::Active)
            .unwrap_or_else(|_| unreachable!());
        self.users.lock().await.insert(user_id, user);
        self.roles.lock().await.insert(user_id, roles);
        user_id
    }

    pub(crate) async fn set_status(&self, user_id: UserId, status: UserStatus) {
        let mut users = self.users.lock().await;
        if let Some(user) = users.remove(&user_id) {
            users.insert(user_id, user.with_status(status));
        }
    }

    pub(crate) async fn add_group(
        &self,
        organization_id: OrganizationId,
        members: Vec<UserId>,
    ) -> GroupId {
        let group_id = GroupId::new();
        let group = Group::new(group_id, organization_id, "group", members)
            .unwrap_or_else(|_| unreachable!());
        self.groups.lock().await.insert(group_id, group);
        group_id
    }

    pub(crate) async fn delete_group(&self, group_id: GroupId) {
        let mut groups = self.groups.lock().await;
        if let Some(group) = groups.remove(&group_id) {
            groups.insert(group_id, group.into_deleted());
        }
    }

    pub(crate) async fn add_template(
        &self,
        organization_id: OrganizationId,
        default_ttl: Duration,
        max_ttl: Duration,
    ) -> Template {
        let template = Template::new(
            TemplateId::new(),
            organization_id,
            format!("template-{}", TemplateId::new()),
            UserId::new(),
            default_ttl,
            max_ttl,
        )
        .unwrap_or_else(|_| unreachable!());
        self.templates
            .lock()
            .await
            .insert(template.id(), template.clone());
        template
    }

    pub(crate) async fn grant(
        &self,
        template_id: TemplateId,
        principal: AclPrincipal,
        role: TemplateRole,
    ) {
        let _ = self
            .apply_acl_changes(template_id, vec![TemplateAclChange { principal, role }])
            .await;
    }

    pub(crate) async fn add_workspace(
        &self,
        template: &Template,
        owner_id: UserId,
        ttl: Option<Duration>,
    ) -> Workspace {
        let workspace = Workspace::new(
            WorkspaceId::new(),
            template.organization_id(),
            template.id(),
            owner_id,
            "dev",
            ttl,
        )
        .unwrap_or_else(|_| unreachable!());
        self.workspaces
            .lock()
            .await
            .insert(workspace.id(), workspace.clone());
        workspace
    }

    pub(crate) async fn entries_for(&self, template_id: TemplateId) -> Vec<TemplateAclEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|entry| entry.template_id == template_id)
            .copied()
            .collect()
    }
}

#[async_trait]
impl AuditRepository for FakeStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

#[async_trait]
impl PrincipalRepository for FakeStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.lock().await.get(&user_id).cloned())
    }

    async fn find_group(&self, group_id: GroupId) -> AppResult<Option<Group>> {
        Ok(self.groups.lock().await.get(&group_id).cloned())
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_group_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupId>> {
        Ok(self
            .groups
            .lock()
            .await
            .values()
            .filter(|group| !group.is_deleted() && group.members().contains(&user_id))
            .map(Group::id)
            .collect())
    }
}

#[async_trait]
impl TemplateRepository for FakeStore {
    async fn create_template(
        &self,
        template: Template,
        initial_grants: Vec<TemplateAclEntry>,
    ) -> AppResult<Template> {
        self.templates
            .lock()
            .await
            .insert(template.id(), template.clone());
        self.entries.lock().await.extend(initial_grants);
        Ok(template)
    }

    async fn find_template(&self, template_id: TemplateId) -> AppResult<Option<Template>> {
        Ok(self.templates.lock().await.get(&template_id).cloned())
    }

    async fn list_templates(&self, query: TemplateListQuery) -> AppResult<Vec<Template>> {
        let templates = self.templates.lock().await;
        let entries = self.entries.lock().await;

        Ok(templates
            .values()
            .filter(|template| {
                query
                    .organization_id
                    .is_none_or(|organization_id| template.organization_id() == organization_id)
            })
            .filter(|template| {
                let template_entries = entries
                    .iter()
                    .filter(|entry| entry.template_id == template.id())
                    .copied()
                    .collect::<Vec<_>>();
                query
                    .access
                    .matches(template.organization_id(), &template_entries)
            })
            .cloned()
            .collect())
    }

    async fn update_template_schedule(
        &self,
        template_id: TemplateId,
        default_ttl: Duration,
        max_ttl: Duration,
    ) -> AppResult<TemplateScheduleUpdate> {
        let mut templates = self.templates.lock().await;
        let mut workspaces = self.workspaces.lock().await;

        let template = templates
            .get(&template_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("template '{template_id}' does not exist")))?
            .with_schedule(default_ttl, max_ttl)?;
        templates.insert(template_id, template.clone());

        let mut clamped_workspaces = 0;
        for workspace in workspaces
            .values_mut()
            .filter(|workspace| workspace.template_id() == template_id)
        {
            if let Some(clamped) = clamp_to_max_ttl(workspace.ttl(), max_ttl) {
                *workspace = workspace.clone().with_ttl(Some(clamped));
                clamped_workspaces += 1;
            }
        }

        Ok(TemplateScheduleUpdate {
            template,
            clamped_workspaces,
        })
    }
}

#[async_trait]
impl TemplateAclRepository for FakeStore {
    async fn apply_acl_changes(
        &self,
        template_id: TemplateId,
        changes: Vec<TemplateAclChange>,
    ) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        for change in changes {
            entries.retain(|entry| {
                !(entry.template_id == template_id && entry.principal == change.principal)
            });
            if change.role != TemplateRole::Deleted {
                entries.push(TemplateAclEntry {
                    template_id,
                    principal: change.principal,
                    role: change.role,
                });
            }
        }
        Ok(())
    }

    async fn get_template_acl(&self, template_id: TemplateId) -> AppResult<TemplateAcl> {
        let organization_id = self
            .templates
            .lock()
            .await
            .get(&template_id)
            .map(Template::organization_id)
            .ok_or_else(|| AppError::NotFound(format!("template '{template_id}' does not exist")))?;
        let users = self.users.lock().await;
        let groups = self.groups.lock().await;

        let mut acl = TemplateAcl::default();
        for entry in self.entries_for(template_id).await {
            match entry.principal {
                AclPrincipal::User(user_id) => {
                    if let Some(user) = users.get(&user_id).filter(|user| user.is_live()) {
                        acl.users.push(TemplateUserGrant {
                            user: user.clone(),
                            role: entry.role,
                        });
                    }
                }
                AclPrincipal::Group(group_id) if group_id.is_everyone_of(organization_id) => {
                    acl.groups.push(TemplateGroupGrant {
                        group: Group::everyone(organization_id),
                        role: entry.role,
                    });
                }
                AclPrincipal::Group(group_id) => {
                    if let Some(group) = groups.get(&group_id).filter(|group| !group.is_deleted())
                    {
                        acl.groups.push(TemplateGroupGrant {
                            group: group.clone(),
                            role: entry.role,
                        });
                    }
                }
            }
        }

        Ok(acl)
    }

    async fn list_grants_for_principals(
        &self,
        template_id: TemplateId,
        principals: &[AclPrincipal],
    ) -> AppResult<Vec<TemplateAclEntry>> {
        Ok(self
            .entries_for(template_id)
            .await
            .into_iter()
            .filter(|entry| principals.contains(&entry.principal))
            .collect())
    }
}

#[async_trait]
impl WorkspaceRepository for FakeStore {
    async fn create_workspace(
        &self,
        workspace: Workspace,
        enforce_max_ttl: bool,
    ) -> AppResult<Workspace> {
        let templates = self.templates.lock().await;
        let mut workspaces = self.workspaces.lock().await;
        let template = templates.get(&workspace.template_id()).ok_or_else(|| {
            AppError::NotFound(format!(
                "template '{}' does not exist",
                workspace.template_id()
            ))
        })?;
        if enforce_max_ttl {
            validate_workspace_ttl(template.max_ttl(), workspace.ttl())?;
        }

        workspaces.insert(workspace.id(), workspace.clone());
        Ok(workspace)
    }

    async fn find_workspace(&self, workspace_id: WorkspaceId) -> AppResult<Option<Workspace>> {
        Ok(self.workspaces.lock().await.get(&workspace_id).cloned())
    }

    async fn update_workspace_ttl(
        &self,
        workspace_id: WorkspaceId,
        ttl: Option<Duration>,
        enforce_max_ttl: bool,
    ) -> AppResult<Workspace> {
        let templates = self.templates.lock().await;
        let mut workspaces = self.workspaces.lock().await;
        let workspace = workspaces
            .get(&workspace_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("workspace '{workspace_id}' does not exist")))?;
        if enforce_max_ttl {
            let max_ttl = templates
                .get(&workspace.template_id())
                .map(Template::max_ttl)
                .unwrap_or_default();
            validate_workspace_ttl(max_ttl, ttl)?;
        }

        let workspace = workspace.with_ttl(ttl);
        workspaces.insert(workspace_id, workspace.clone());
        Ok(workspace)
    }
}
