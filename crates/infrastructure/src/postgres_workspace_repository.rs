use std::time::Duration;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use templar_application::WorkspaceRepository;
use templar_core::{AppError, AppResult, OrganizationId};
use templar_domain::schedule::validate_workspace_ttl;
use templar_domain::{TemplateId, UserId, Workspace, WorkspaceId};

use crate::duration_columns::{from_millis, to_millis};

/// PostgreSQL-backed workspace repository.
#[derive(Clone)]
pub struct PostgresWorkspaceRepository {
    pool: PgPool,
}

impl PostgresWorkspaceRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct WorkspaceRow {
    id: uuid::Uuid,
    organization_id: uuid::Uuid,
    template_id: uuid::Uuid,
    owner_id: uuid::Uuid,
    name: String,
    ttl_ms: Option<i64>,
}

fn workspace_from_row(row: WorkspaceRow) -> AppResult<Workspace> {
    Workspace::new(
        WorkspaceId::from_uuid(row.id),
        OrganizationId::from_uuid(row.organization_id),
        TemplateId::from_uuid(row.template_id),
        UserId::from_uuid(row.owner_id),
        row.name,
        row.ttl_ms.map(from_millis).transpose()?,
    )
}

async fn locked_max_ttl(
    transaction: &mut Transaction<'_, Postgres>,
    query: &str,
    id: uuid::Uuid,
) -> AppResult<Option<Duration>> {
    sqlx::query_scalar::<_, i64>(query)
        .bind(id)
        .fetch_optional(&mut **transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to lock template max TTL for '{id}': {error}"))
        })?
        .map(from_millis)
        .transpose()
}

#[async_trait]
impl WorkspaceRepository for PostgresWorkspaceRepository {
    async fn create_workspace(
        &self,
        workspace: Workspace,
        enforce_max_ttl: bool,
    ) -> AppResult<Workspace> {
        let ttl_ms = workspace.ttl().map(to_millis).transpose()?;

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start workspace insert transaction: {error}"
            ))
        })?;

        // Conflicts with the template row lock taken by schedule updates.
        let max_ttl = locked_max_ttl(
            &mut transaction,
            "SELECT max_ttl_ms FROM templates WHERE id = $1 FOR SHARE",
            workspace.template_id().as_uuid(),
        )
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "template '{}' does not exist",
                workspace.template_id()
            ))
        })?;
        if enforce_max_ttl {
            validate_workspace_ttl(max_ttl, workspace.ttl())?;
        }

        let result = sqlx::query(
            r#"
            INSERT INTO workspaces (id, organization_id, template_id, owner_id, name, ttl_ms)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(workspace.id().as_uuid())
        .bind(workspace.organization_id().as_uuid())
        .bind(workspace.template_id().as_uuid())
        .bind(workspace.owner_id().as_uuid())
        .bind(workspace.name())
        .bind(ttl_ms)
        .execute(&mut *transaction)
        .await;

        if let Err(error) = result {
            if let sqlx::Error::Database(database_error) = &error {
                match database_error.code().as_deref() {
                    Some("23505") => {
                        return Err(AppError::Conflict(format!(
                            "workspace '{}' already exists for user '{}'",
                            workspace.name(),
                            workspace.owner_id()
                        )));
                    }
                    Some("23503") => {
                        return Err(AppError::NotFound(format!(
                            "template '{}' does not exist",
                            workspace.template_id()
                        )));
                    }
                    _ => {}
                }
            }

            return Err(AppError::Internal(format!(
                "failed to insert workspace '{}': {error}",
                workspace.id()
            )));
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit workspace '{}': {error}",
                workspace.id()
            ))
        })?;

        Ok(workspace)
    }

    async fn find_workspace(&self, workspace_id: WorkspaceId) -> AppResult<Option<Workspace>> {
        let row = sqlx::query_as::<_, WorkspaceRow>(
            r#"
            SELECT id, organization_id, template_id, owner_id, name, ttl_ms
            FROM workspaces
            WHERE id = $1
            "#,
        )
        .bind(workspace_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find workspace '{workspace_id}': {error}"
            ))
        })?;

        row.map(workspace_from_row).transpose()
    }

    async fn update_workspace_ttl(
        &self,
        workspace_id: WorkspaceId,
        ttl: Option<Duration>,
        enforce_max_ttl: bool,
    ) -> AppResult<Workspace> {
        let ttl_ms = ttl.map(to_millis).transpose()?;

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start TTL update transaction for workspace '{workspace_id}': {error}"
            ))
        })?;

        let max_ttl = locked_max_ttl(
            &mut transaction,
            r#"
            SELECT templates.max_ttl_ms
            FROM workspaces
            JOIN templates ON templates.id = workspaces.template_id
            WHERE workspaces.id = $1
            FOR SHARE OF templates
            "#,
            workspace_id.as_uuid(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("workspace '{workspace_id}' does not exist")))?;
        if enforce_max_ttl {
            validate_workspace_ttl(max_ttl, ttl)?;
        }

        let row = sqlx::query_as::<_, WorkspaceRow>(
            r#"
            UPDATE workspaces
            SET ttl_ms = $2
            WHERE id = $1
            RETURNING id, organization_id, template_id, owner_id, name, ttl_ms
            "#,
        )
        .bind(workspace_id.as_uuid())
        .bind(ttl_ms)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to update TTL of workspace '{workspace_id}': {error}"
            ))
        })?
        .ok_or_else(|| AppError::NotFound(format!("workspace '{workspace_id}' does not exist")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit TTL update for workspace '{workspace_id}': {error}"
            ))
        })?;

        workspace_from_row(row)
    }
}
