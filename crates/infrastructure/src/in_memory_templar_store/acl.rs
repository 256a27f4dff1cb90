use async_trait::async_trait;
use templar_application::{
    TemplateAcl, TemplateAclRepository, TemplateGroupGrant, TemplateUserGrant,
};
use templar_core::{AppError, AppResult};
use templar_domain::{
    AclPrincipal, Group, TemplateAclChange, TemplateAclEntry, TemplateId, TemplateRole,
};

use super::InMemoryTemplarStore;

#[async_trait]
impl TemplateAclRepository for InMemoryTemplarStore {
    async fn apply_acl_changes(
        &self,
        template_id: TemplateId,
        changes: Vec<TemplateAclChange>,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.templates.contains_key(&template_id) {
            return Err(AppError::NotFound(format!(
                "template '{template_id}' does not exist"
            )));
        }

        let grants = state.acl.entry(template_id).or_default();
        for change in changes {
            match change.role {
                TemplateRole::Deleted => {
                    grants.remove(&change.principal);
                }
                role => {
                    grants.insert(change.principal, role);
                }
            }
        }

        Ok(())
    }

    async fn get_template_acl(&self, template_id: TemplateId) -> AppResult<TemplateAcl> {
        let state = self.state.read().await;
        let organization_id = state
            .templates
            .get(&template_id)
            .map(|template| template.organization_id())
            .ok_or_else(|| AppError::NotFound(format!("template '{template_id}' does not exist")))?;

        let mut acl = TemplateAcl::default();
        let Some(grants) = state.acl.get(&template_id) else {
            return Ok(acl);
        };

        for (principal, role) in grants {
            match principal {
                AclPrincipal::User(user_id) => {
                    if let Some(user) = state.users.get(user_id).filter(|user| user.is_live()) {
                        acl.users.push(TemplateUserGrant {
                            user: user.clone(),
                            role: *role,
                        });
                    }
                }
                AclPrincipal::Group(group_id) if group_id.is_everyone_of(organization_id) => {
                    acl.groups.push(TemplateGroupGrant {
                        group: Group::everyone(organization_id),
                        role: *role,
                    });
                }
                AclPrincipal::Group(group_id) => {
                    if let Some(group) = state.groups.get(group_id).filter(|group| !group.is_deleted())
                    {
                        acl.groups.push(TemplateGroupGrant {
                            group: group.clone(),
                            role: *role,
                        });
                    }
                }
            }
        }

        acl.users
            .sort_by(|left, right| left.user.username().cmp(right.user.username()));
        acl.groups
            .sort_by(|left, right| left.group.name().cmp(right.group.name()));

        Ok(acl)
    }

    async fn list_grants_for_principals(
        &self,
        template_id: TemplateId,
        principals: &[AclPrincipal],
    ) -> AppResult<Vec<TemplateAclEntry>> {
        let state = self.state.read().await;
        Ok(state
            .acl
            .get(&template_id)
            .map(|grants| {
                principals
                    .iter()
                    .filter_map(|principal| {
                        grants.get(principal).map(|role| TemplateAclEntry {
                            template_id,
                            principal: *principal,
                            role: *role,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
