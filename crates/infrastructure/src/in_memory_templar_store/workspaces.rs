use std::time::Duration;

use async_trait::async_trait;
use templar_application::WorkspaceRepository;
use templar_core::{AppError, AppResult};
use templar_domain::schedule::validate_workspace_ttl;
use templar_domain::{Template, Workspace, WorkspaceId};

use super::InMemoryTemplarStore;

#[async_trait]
impl WorkspaceRepository for InMemoryTemplarStore {
    async fn create_workspace(
        &self,
        workspace: Workspace,
        enforce_max_ttl: bool,
    ) -> AppResult<Workspace> {
        let mut state = self.state.write().await;
        let max_ttl = state
            .templates
            .get(&workspace.template_id())
            .map(Template::max_ttl)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "template '{}' does not exist",
                    workspace.template_id()
                ))
            })?;
        if enforce_max_ttl {
            validate_workspace_ttl(max_ttl, workspace.ttl())?;
        }

        let duplicate = state.workspaces.values().any(|existing| {
            existing.owner_id() == workspace.owner_id() && existing.name() == workspace.name()
        });
        if duplicate {
            return Err(AppError::Conflict(format!(
                "workspace '{}' already exists for user '{}'",
                workspace.name(),
                workspace.owner_id()
            )));
        }

        state.workspaces.insert(workspace.id(), workspace.clone());
        Ok(workspace)
    }

    async fn find_workspace(&self, workspace_id: WorkspaceId) -> AppResult<Option<Workspace>> {
        Ok(self.state.read().await.workspaces.get(&workspace_id).cloned())
    }

    async fn update_workspace_ttl(
        &self,
        workspace_id: WorkspaceId,
        ttl: Option<Duration>,
        enforce_max_ttl: bool,
    ) -> AppResult<Workspace> {
        let mut state = self.state.write().await;
        let workspace = state
            .workspaces
            .get(&workspace_id)
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!("workspace '{workspace_id}' does not exist"))
            })?;
        if enforce_max_ttl {
            let max_ttl = state
                .templates
                .get(&workspace.template_id())
                .map(Template::max_ttl)
                .unwrap_or_default();
            validate_workspace_ttl(max_ttl, ttl)?;
        }

        let workspace = workspace.with_ttl(ttl);
        state.workspaces.insert(workspace_id, workspace.clone());
        Ok(workspace)
    }
}
