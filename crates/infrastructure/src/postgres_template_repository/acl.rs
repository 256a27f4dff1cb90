use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection};
use templar_application::{
    TemplateAcl, TemplateAclRepository, TemplateGroupGrant, TemplateUserGrant,
};
use templar_core::{AppError, AppResult, OrganizationId};
use templar_domain::{
    AclPrincipal, Group, GroupId, TemplateAclChange, TemplateAclEntry, TemplateId, TemplateRole,
    UserId,
};

use super::PostgresTemplateRepository;
use crate::postgres_principal_repository::user_from_row;

#[derive(Debug, FromRow)]
struct UserGrantRow {
    id: uuid::Uuid,
    username: String,
    status: String,
    role: String,
}

#[derive(Debug, FromRow)]
struct GroupGrantRow {
    id: uuid::Uuid,
    organization_id: uuid::Uuid,
    name: String,
    role: String,
}

#[derive(Debug, FromRow)]
struct GroupMemberRow {
    group_id: uuid::Uuid,
    user_id: uuid::Uuid,
}

#[derive(Debug, FromRow)]
struct EntryRow {
    principal_kind: String,
    principal_id: uuid::Uuid,
    role: String,
}

fn stored_role(value: &str) -> AppResult<TemplateRole> {
    match TemplateRole::from_str(value)? {
        TemplateRole::Deleted => Err(AppError::Internal(
            "stored template grant carries no role".to_owned(),
        )),
        role => Ok(role),
    }
}

async fn template_organization(
    connection: &mut PgConnection,
    template_id: TemplateId,
) -> AppResult<OrganizationId> {
    let organization_id: Option<uuid::Uuid> = sqlx::query_scalar(
        r#"
        SELECT organization_id
        FROM templates
        WHERE id = $1
        "#,
    )
    .bind(template_id.as_uuid())
    .fetch_optional(connection)
    .await
    .map_err(|error| {
        AppError::Internal(format!(
            "failed to find organization of template '{template_id}': {error}"
        ))
    })?;

    organization_id
        .map(OrganizationId::from_uuid)
        .ok_or_else(|| AppError::NotFound(format!("template '{template_id}' does not exist")))
}

#[async_trait]
impl TemplateAclRepository for PostgresTemplateRepository {
    async fn apply_acl_changes(
        &self,
        template_id: TemplateId,
        changes: Vec<TemplateAclChange>,
    ) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start grant update transaction for template '{template_id}': {error}"
            ))
        })?;

        let locked: Option<uuid::Uuid> = sqlx::query_scalar(
            r#"
            SELECT id
            FROM templates
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(template_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to lock template '{template_id}': {error}"))
        })?;

        if locked.is_none() {
            return Err(AppError::NotFound(format!(
                "template '{template_id}' does not exist"
            )));
        }

        for change in changes {
            let result = match change.role {
                TemplateRole::Deleted => {
                    sqlx::query(
                        r#"
                        DELETE FROM template_acl_entries
                        WHERE template_id = $1
                          AND principal_kind = $2
                          AND principal_id = $3
                        "#,
                    )
                    .bind(template_id.as_uuid())
                    .bind(change.principal.kind())
                    .bind(change.principal.as_uuid())
                    .execute(&mut *transaction)
                    .await
                }
                role => {
                    sqlx::query(
                        r#"
                        INSERT INTO template_acl_entries (template_id, principal_kind, principal_id, role)
                        VALUES ($1, $2, $3, $4)
                        ON CONFLICT (template_id, principal_kind, principal_id)
                        DO UPDATE SET role = EXCLUDED.role, updated_at = now()
                        "#,
                    )
                    .bind(template_id.as_uuid())
                    .bind(change.principal.kind())
                    .bind(change.principal.as_uuid())
                    .bind(role.as_str())
                    .execute(&mut *transaction)
                    .await
                }
            };

            result.map_err(|error| {
                AppError::Internal(format!(
                    "failed to apply grant change for template '{template_id}': {error}"
                ))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit grant update for template '{template_id}': {error}"
            ))
        })
    }

    async fn get_template_acl(&self, template_id: TemplateId) -> AppResult<TemplateAcl> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start grant read transaction for template '{template_id}': {error}"
            ))
        })?;

        // Every read below sees the same snapshot of grants and members.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to set grant read isolation for template '{template_id}': {error}"
                ))
            })?;

        let organization_id = template_organization(&mut transaction, template_id).await?;

        let user_rows = sqlx::query_as::<_, UserGrantRow>(
            r#"
            SELECT users.id, users.username, users.status, grants.role
            FROM template_acl_entries AS grants
            JOIN users ON users.id = grants.principal_id
            WHERE grants.template_id = $1
              AND grants.principal_kind = 'user'
              AND users.status = 'active'
            ORDER BY users.username
            "#,
        )
        .bind(template_id.as_uuid())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list user grants of template '{template_id}': {error}"
            ))
        })?;

        let everyone_role: Option<String> = sqlx::query_scalar(
            r#"
            SELECT role
            FROM template_acl_entries
            WHERE template_id = $1
              AND principal_kind = 'group'
              AND principal_id = $2
            "#,
        )
        .bind(template_id.as_uuid())
        .bind(organization_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load implicit group grant of template '{template_id}': {error}"
            ))
        })?;

        let group_rows = sqlx::query_as::<_, GroupGrantRow>(
            r#"
            SELECT groups.id, groups.organization_id, groups.name, grants.role
            FROM template_acl_entries AS grants
            JOIN groups ON groups.id = grants.principal_id
            WHERE grants.template_id = $1
              AND grants.principal_kind = 'group'
              AND NOT groups.deleted
            ORDER BY groups.name
            "#,
        )
        .bind(template_id.as_uuid())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list group grants of template '{template_id}': {error}"
            ))
        })?;

        let member_rows = sqlx::query_as::<_, GroupMemberRow>(
            r#"
            SELECT members.group_id, members.user_id
            FROM group_members AS members
            JOIN template_acl_entries AS grants
              ON grants.principal_id = members.group_id
             AND grants.principal_kind = 'group'
            WHERE grants.template_id = $1
            "#,
        )
        .bind(template_id.as_uuid())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list granted group members of template '{template_id}': {error}"
            ))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to finish grant read for template '{template_id}': {error}"
            ))
        })?;

        let mut members: BTreeMap<uuid::Uuid, Vec<UserId>> = BTreeMap::new();
        for row in member_rows {
            members
                .entry(row.group_id)
                .or_default()
                .push(UserId::from_uuid(row.user_id));
        }

        let users = user_rows
            .into_iter()
            .map(|row| {
                Ok(TemplateUserGrant {
                    role: stored_role(row.role.as_str())?,
                    user: user_from_row(row.id, row.username, row.status.as_str())?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let mut groups = Vec::with_capacity(group_rows.len() + 1);
        if let Some(role) = everyone_role {
            groups.push(TemplateGroupGrant {
                group: Group::everyone(organization_id),
                role: stored_role(role.as_str())?,
            });
        }
        for row in group_rows {
            groups.push(TemplateGroupGrant {
                role: stored_role(row.role.as_str())?,
                group: Group::new(
                    GroupId::from_uuid(row.id),
                    OrganizationId::from_uuid(row.organization_id),
                    row.name,
                    members.remove(&row.id).unwrap_or_default(),
                )?,
            });
        }
        groups.sort_by(|left, right| left.group.name().cmp(right.group.name()));

        Ok(TemplateAcl { users, groups })
    }

    async fn list_grants_for_principals(
        &self,
        template_id: TemplateId,
        principals: &[AclPrincipal],
    ) -> AppResult<Vec<TemplateAclEntry>> {
        if principals.is_empty() {
            return Ok(Vec::new());
        }

        let mut user_ids = Vec::new();
        let mut group_ids = Vec::new();
        for principal in principals {
            match principal {
                AclPrincipal::User(user_id) => user_ids.push(user_id.as_uuid()),
                AclPrincipal::Group(group_id) => group_ids.push(group_id.as_uuid()),
            }
        }

        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT principal_kind, principal_id, role
            FROM template_acl_entries
            WHERE template_id = $1
              AND (
                (principal_kind = 'user' AND principal_id = ANY($2))
                OR (principal_kind = 'group' AND principal_id = ANY($3))
              )
            "#,
        )
        .bind(template_id.as_uuid())
        .bind(user_ids)
        .bind(group_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list grants of template '{template_id}': {error}"
            ))
        })?;

        rows.into_iter()
            .map(|row| {
                let principal = match row.principal_kind.as_str() {
                    "user" => AclPrincipal::User(UserId::from_uuid(row.principal_id)),
                    "group" => AclPrincipal::Group(GroupId::from_uuid(row.principal_id)),
                    other => {
                        return Err(AppError::Internal(format!(
                            "unknown stored principal kind '{other}'"
                        )));
                    }
                };

                Ok(TemplateAclEntry {
                    template_id,
                    principal,
                    role: stored_role(row.role.as_str())?,
                })
            })
            .collect()
    }
}
