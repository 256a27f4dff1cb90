use std::collections::{BTreeMap, BTreeSet, HashMap};

use templar_application::AuditEvent;
use templar_core::{AppError, AppResult};
use templar_domain::{
    AclPrincipal, Group, GroupId, Role, Template, TemplateId, TemplateRole, User, UserId,
    UserStatus, Workspace, WorkspaceId,
};
use tokio::sync::RwLock;

mod acl;
mod principals;
mod templates;
mod workspaces;

#[cfg(test)]
mod tests;

/// In-memory implementation of every template and workspace port.
///
/// All state sits behind one lock so multi-record writes such as schedule
/// propagation are observed atomically.
#[derive(Debug, Default)]
pub struct InMemoryTemplarStore {
    state: RwLock<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    users: HashMap<UserId, User>,
    roles: HashMap<UserId, BTreeSet<Role>>,
    groups: HashMap<GroupId, Group>,
    templates: HashMap<TemplateId, Template>,
    acl: HashMap<TemplateId, BTreeMap<AclPrincipal, TemplateRole>>,
    workspaces: HashMap<WorkspaceId, Workspace>,
    audit_events: Vec<AuditEvent>,
}

impl InMemoryTemplarStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user.
    pub async fn save_user(&self, user: User) -> AppResult<()> {
        let mut state = self.state.write().await;
        let duplicate = state
            .users
            .values()
            .any(|existing| existing.id() != user.id() && existing.username() == user.username());
        if duplicate {
            return Err(AppError::Conflict(format!(
                "username '{}' is already taken",
                user.username()
            )));
        }

        state.users.insert(user.id(), user);
        Ok(())
    }

    /// Changes the lifecycle status of a stored user.
    pub async fn set_user_status(&self, user_id: UserId, status: UserStatus) -> AppResult<()> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .remove(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        state.users.insert(user_id, user.with_status(status));
        Ok(())
    }

    /// Assigns a site role to a stored user.
    pub async fn assign_role(&self, user_id: UserId, role: Role) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }

        state.roles.entry(user_id).or_default().insert(role);
        Ok(())
    }

    /// Inserts or replaces an explicit group.
    pub async fn save_group(&self, group: Group) -> AppResult<()> {
        if group.is_everyone() {
            return Err(AppError::Validation(
                "the implicit organization group cannot be stored".to_owned(),
            ));
        }

        self.state.write().await.groups.insert(group.id(), group);
        Ok(())
    }

    /// Soft-deletes an explicit group; its grants stay stored but stop applying.
    pub async fn delete_group(&self, group_id: GroupId) -> AppResult<()> {
        let mut state = self.state.write().await;
        let group = state
            .groups
            .remove(&group_id)
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}' does not exist")))?;
        state.groups.insert(group_id, group.into_deleted());
        Ok(())
    }

    /// Returns a snapshot of appended audit events.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.read().await.audit_events.clone()
    }
}
