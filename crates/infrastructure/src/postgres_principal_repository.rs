use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use templar_application::PrincipalRepository;
use templar_core::{AppError, AppResult, OrganizationId};
use templar_domain::{Group, GroupId, Role, User, UserId, UserStatus};

/// PostgreSQL-backed read repository for users, groups and role assignments.
#[derive(Clone)]
pub struct PostgresPrincipalRepository {
    pool: PgPool,
}

impl PostgresPrincipalRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: uuid::Uuid,
    username: String,
    status: String,
}

#[derive(Debug, FromRow)]
struct GroupRow {
    id: uuid::Uuid,
    organization_id: uuid::Uuid,
    name: String,
    deleted: bool,
}

#[derive(Debug, FromRow)]
struct RoleAssignmentRow {
    role_name: String,
    organization_id: Option<uuid::Uuid>,
}

pub(crate) fn user_from_row(id: uuid::Uuid, username: String, status: &str) -> AppResult<User> {
    User::new(UserId::from_uuid(id), username, UserStatus::from_str(status)?)
}

#[async_trait]
impl PrincipalRepository for PostgresPrincipalRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, status
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user '{user_id}': {error}")))?;

        row.map(|row| user_from_row(row.id, row.username, row.status.as_str()))
            .transpose()
    }

    async fn find_group(&self, group_id: GroupId) -> AppResult<Option<Group>> {
        let row = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT id, organization_id, name, deleted
            FROM groups
            WHERE id = $1
            "#,
        )
        .bind(group_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find group '{group_id}': {error}"))
        })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let members: Vec<uuid::Uuid> = sqlx::query_scalar(
            r#"
            SELECT user_id
            FROM group_members
            WHERE group_id = $1
            ORDER BY user_id
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list members of group '{group_id}': {error}"
            ))
        })?;

        let group = Group::new(
            GroupId::from_uuid(row.id),
            OrganizationId::from_uuid(row.organization_id),
            row.name,
            members.into_iter().map(UserId::from_uuid),
        )?;

        Ok(Some(if row.deleted {
            group.into_deleted()
        } else {
            group
        }))
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleAssignmentRow>(
            r#"
            SELECT role_name, organization_id
            FROM user_role_assignments
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list roles for user '{user_id}': {error}"
            ))
        })?;

        rows.into_iter()
            .map(|row| {
                Role::parse(
                    row.role_name.as_str(),
                    row.organization_id.map(OrganizationId::from_uuid),
                )
            })
            .collect()
    }

    async fn list_group_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupId>> {
        let group_ids: Vec<uuid::Uuid> = sqlx::query_scalar(
            r#"
            SELECT groups.id
            FROM group_members
            JOIN groups ON groups.id = group_members.group_id
            WHERE group_members.user_id = $1
              AND NOT groups.deleted
            ORDER BY groups.id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list groups for user '{user_id}': {error}"
            ))
        })?;

        Ok(group_ids.into_iter().map(GroupId::from_uuid).collect())
    }
}
