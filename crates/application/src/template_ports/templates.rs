use std::time::Duration;

use async_trait::async_trait;
use templar_core::AppResult;
use templar_domain::{Template, TemplateAclEntry, TemplateId};

use super::access_filter::TemplateListQuery;

/// Result of a template schedule update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateScheduleUpdate {
    /// Template with the new schedule.
    pub template: Template,
    /// Number of workspaces whose TTL was lowered to the new max TTL.
    pub clamped_workspaces: u64,
}

/// Repository port for template persistence.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Persists a template together with its initial grants in one unit.
    async fn create_template(
        &self,
        template: Template,
        initial_grants: Vec<TemplateAclEntry>,
    ) -> AppResult<Template>;

    /// Finds a template by identifier.
    async fn find_template(&self, template_id: TemplateId) -> AppResult<Option<Template>>;

    /// Lists templates matching the organization scope and access filter.
    async fn list_templates(&self, query: TemplateListQuery) -> AppResult<Vec<Template>>;

    /// Stores a new schedule and lowers workspace TTLs above the new max TTL.
    ///
    /// Both writes happen atomically: readers never observe the template
    /// update without the workspace clamping.
    async fn update_template_schedule(
        &self,
        template_id: TemplateId,
        default_ttl: Duration,
        max_ttl: Duration,
    ) -> AppResult<TemplateScheduleUpdate>;
}
