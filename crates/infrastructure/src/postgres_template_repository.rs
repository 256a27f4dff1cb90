use std::time::Duration;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use templar_application::{TemplateListQuery, TemplateRepository, TemplateScheduleUpdate};
use templar_core::{AppError, AppResult, OrganizationId};
use templar_domain::{Template, TemplateAclEntry, TemplateId, UserId};
use tracing::debug;

use crate::duration_columns::{from_millis, to_millis};

mod access_filter;
mod acl;


/// PostgreSQL-backed repository for templates and their grants.
#[derive(Clone)]
pub struct PostgresTemplateRepository {
    pool: PgPool,
}

impl PostgresTemplateRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TemplateRow {
    id: uuid::Uuid,
    organization_id: uuid::Uuid,
    name: String,
    created_by: uuid::Uuid,
    default_ttl_ms: i64,
    max_ttl_ms: i64,
}

fn template_from_row(row: TemplateRow) -> AppResult<Template> {
    Template::new(
        TemplateId::from_uuid(row.id),
        OrganizationId::from_uuid(row.organization_id),
        row.name,
        UserId::from_uuid(row.created_by),
        from_millis(row.default_ttl_ms)?,
        from_millis(row.max_ttl_ms)?,
    )
}

#[async_trait]
impl TemplateRepository for PostgresTemplateRepository {
    async fn create_template(
        &self,
        template: Template,
        initial_grants: Vec<TemplateAclEntry>,
    ) -> AppResult<Template> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start template create transaction: {error}"
            ))
        })?;

        let result = sqlx::query(
            r#"
            INSERT INTO templates (
                id,
                organization_id,
                name,
                created_by,
                default_ttl_ms,
                max_ttl_ms
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(template.id().as_uuid())
        .bind(template.organization_id().as_uuid())
        .bind(template.name())
        .bind(template.created_by().as_uuid())
        .bind(to_millis(template.default_ttl())?)
        .bind(to_millis(template.max_ttl())?)
        .execute(&mut *transaction)
        .await;

        if let Err(error) = result {
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some("23505")
            {
                return Err(AppError::Conflict(format!(
                    "template '{}' already exists in organization '{}'",
                    template.name(),
                    template.organization_id()
                )));
            }

            return Err(AppError::Internal(format!(
                "failed to insert template '{}': {error}",
                template.id()
            )));
        }

        for entry in initial_grants {
            sqlx::query(
                r#"
                INSERT INTO template_acl_entries (template_id, principal_kind, principal_id, role)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (template_id, principal_kind, principal_id)
                DO UPDATE SET role = EXCLUDED.role, updated_at = now()
                "#,
            )
            .bind(template.id().as_uuid())
            .bind(entry.principal.kind())
            .bind(entry.principal.as_uuid())
            .bind(entry.role.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to insert initial grant for template '{}': {error}",
                    template.id()
                ))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit template create transaction: {error}"
            ))
        })?;

        Ok(template)
    }

    async fn find_template(&self, template_id: TemplateId) -> AppResult<Option<Template>> {
        let row = sqlx::query_as::<_, TemplateRow>(
            r#"
            SELECT id, organization_id, name, created_by, default_ttl_ms, max_ttl_ms
            FROM templates
            WHERE id = $1
            "#,
        )
        .bind(template_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find template '{template_id}': {error}"))
        })?;

        row.map(template_from_row).transpose()
    }

    async fn list_templates(&self, query: TemplateListQuery) -> AppResult<Vec<Template>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT templates.id, templates.organization_id, templates.name, templates.created_by, \
             templates.default_ttl_ms, templates.max_ttl_ms FROM templates WHERE ",
        );

        if let Some(organization_id) = query.organization_id {
            builder.push("templates.organization_id = ");
            builder.push_bind(organization_id.as_uuid());
            builder.push(" AND ");
        }

        access_filter::push_access_condition(&mut builder, &query.access);
        builder.push(" ORDER BY templates.name, templates.id");

        debug!(sql = builder.sql(), "listing templates");

        let rows = builder
            .build_query_as::<TemplateRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list templates: {error}")))?;

        rows.into_iter().map(template_from_row).collect()
    }

    async fn update_template_schedule(
        &self,
        template_id: TemplateId,
        default_ttl: Duration,
        max_ttl: Duration,
    ) -> AppResult<TemplateScheduleUpdate> {
        let default_ttl_ms = to_millis(default_ttl)?;
        let max_ttl_ms = to_millis(max_ttl)?;

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start schedule update transaction for template '{template_id}': {error}"
            ))
        })?;

        let row = sqlx::query_as::<_, TemplateRow>(
            r#"
            UPDATE templates
            SET default_ttl_ms = $2, max_ttl_ms = $3
            WHERE id = $1
            RETURNING id, organization_id, name, created_by, default_ttl_ms, max_ttl_ms
            "#,
        )
        .bind(template_id.as_uuid())
        .bind(default_ttl_ms)
        .bind(max_ttl_ms)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to update schedule of template '{template_id}': {error}"
            ))
        })?
        .ok_or_else(|| AppError::NotFound(format!("template '{template_id}' does not exist")))?;

        let template = template_from_row(row)?;

        let clamped = sqlx::query(
            r#"
            UPDATE workspaces
            SET ttl_ms = $2
            WHERE template_id = $1
              AND $2 > 0
              AND ttl_ms > $2
            "#,
        )
        .bind(template_id.as_uuid())
        .bind(max_ttl_ms)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to clamp workspace TTLs of template '{template_id}': {error}"
            ))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit schedule update for template '{template_id}': {error}"
            ))
        })?;

        Ok(TemplateScheduleUpdate {
            template,
            clamped_workspaces: clamped.rows_affected(),
        })
    }
}
