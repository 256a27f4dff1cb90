use async_trait::async_trait;
use templar_application::{AuditEvent, AuditRepository, PrincipalRepository};
use templar_core::AppResult;
use templar_domain::{Group, GroupId, Role, User, UserId};

use super::InMemoryTemplarStore;

#[async_trait]
impl PrincipalRepository for InMemoryTemplarStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_group(&self, group_id: GroupId) -> AppResult<Option<Group>> {
        Ok(self.state.read().await.groups.get(&group_id).cloned())
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .get(&user_id)
            .map(|roles| roles.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn list_group_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupId>> {
        let state = self.state.read().await;
        let mut group_ids = state
            .groups
            .values()
            .filter(|group| !group.is_deleted() && group.members().contains(&user_id))
            .map(Group::id)
            .collect::<Vec<_>>();
        group_ids.sort_by_key(GroupId::as_uuid);
        Ok(group_ids)
    }
}

#[async_trait]
impl AuditRepository for InMemoryTemplarStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.write().await.audit_events.push(event);
        Ok(())
    }
}
