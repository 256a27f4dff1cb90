use templar_core::{AppError, AppResult};
use templar_domain::{Action, ResourceClass, Role, Workspace};

use super::{ActorContext, AuthorizationService};

impl AuthorizationService {
    /// Returns whether the actor may perform the action on the workspace.
    ///
    /// Organization members only reach workspaces they own.
    #[must_use]
    pub fn can_access_workspace(
        &self,
        actor: &ActorContext,
        action: Action,
        workspace: &Workspace,
    ) -> bool {
        let owns_workspace = workspace.owner_id() == actor.user_id();
        actor.roles().iter().any(|role| {
            role.allows(workspace.organization_id(), ResourceClass::Workspace, action)
                && (owns_workspace || !matches!(role, Role::OrgMember(_)))
        })
    }

    /// Ensures the actor may perform the action on the workspace.
    pub fn authorize_workspace(
        &self,
        actor: &ActorContext,
        action: Action,
        workspace: &Workspace,
    ) -> AppResult<()> {
        if self.can_access_workspace(actor, action, workspace) {
            return Ok(());
        }

        if action == Action::Read || !self.can_access_workspace(actor, Action::Read, workspace) {
            return Err(AppError::NotFound(format!(
                "workspace '{}' does not exist",
                workspace.id()
            )));
        }

        Err(AppError::Forbidden(format!(
            "user '{}' is missing '{}' on workspace '{}'",
            actor.user_id(),
            action.as_str(),
            workspace.id()
        )))
    }
}
