use async_trait::async_trait;
use templar_core::AppResult;
use templar_domain::{Group, GroupId, Role, User, UserId};

/// Read port over users, groups and site role assignments.
#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    /// Finds a user regardless of status.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// Finds an explicit group, including soft-deleted ones.
    ///
    /// Implicit "everyone" groups are never stored and are not returned here.
    async fn find_group(&self, group_id: GroupId) -> AppResult<Option<Group>>;

    /// Lists the site roles assigned to a user.
    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>>;

    /// Lists non-deleted explicit groups the user belongs to.
    async fn list_group_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupId>>;
}
