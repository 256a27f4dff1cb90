use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use templar_application::{TemplateListQuery, TemplateRepository, TemplateScheduleUpdate};
use templar_core::{AppError, AppResult};
use templar_domain::schedule::clamp_to_max_ttl;
use templar_domain::{Template, TemplateAclEntry, TemplateId};

use super::InMemoryTemplarStore;

#[async_trait]
impl TemplateRepository for InMemoryTemplarStore {
    async fn create_template(
        &self,
        template: Template,
        initial_grants: Vec<TemplateAclEntry>,
    ) -> AppResult<Template> {
        let mut state = self.state.write().await;

        let duplicate = state.templates.values().any(|existing| {
            existing.organization_id() == template.organization_id()
                && existing.name() == template.name()
        });
        if duplicate {
            return Err(AppError::Conflict(format!(
                "template '{}' already exists in organization '{}'",
                template.name(),
                template.organization_id()
            )));
        }

        let grants = initial_grants
            .into_iter()
            .filter(|entry| entry.template_id == template.id())
            .map(|entry| (entry.principal, entry.role))
            .collect::<BTreeMap<_, _>>();
        state.acl.insert(template.id(), grants);
        state.templates.insert(template.id(), template.clone());

        Ok(template)
    }

    async fn find_template(&self, template_id: TemplateId) -> AppResult<Option<Template>> {
        Ok(self.state.read().await.templates.get(&template_id).cloned())
    }

    async fn list_templates(&self, query: TemplateListQuery) -> AppResult<Vec<Template>> {
        let state = self.state.read().await;

        let mut templates = state
            .templates
            .values()
            .filter(|template| {
                query
                    .organization_id
                    .is_none_or(|organization_id| organization_id == template.organization_id())
            })
            .filter(|template| {
                let entries = state
                    .acl
                    .get(&template.id())
                    .map(|grants| {
                        grants
                            .iter()
                            .map(|(principal, role)| TemplateAclEntry {
                                template_id: template.id(),
                                principal: *principal,
                                role: *role,
                            })
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                query.access.matches(template.organization_id(), &entries)
            })
            .cloned()
            .collect::<Vec<_>>();

        templates.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(templates)
    }

    async fn update_template_schedule(
        &self,
        template_id: TemplateId,
        default_ttl: Duration,
        max_ttl: Duration,
    ) -> AppResult<TemplateScheduleUpdate> {
        let mut state = self.state.write().await;

        let template = state
            .templates
            .get(&template_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("template '{template_id}' does not exist")))?
            .with_schedule(default_ttl, max_ttl)?;

        let mut clamped_workspaces = 0;
        for workspace in state
            .workspaces
            .values_mut()
            .filter(|workspace| workspace.template_id() == template_id)
        {
            if let Some(clamped) = clamp_to_max_ttl(workspace.ttl(), max_ttl) {
                *workspace = workspace.clone().with_ttl(Some(clamped));
                clamped_workspaces += 1;
            }
        }

        state.templates.insert(template_id, template.clone());

        Ok(TemplateScheduleUpdate {
            template,
            clamped_workspaces,
        })
    }
}
