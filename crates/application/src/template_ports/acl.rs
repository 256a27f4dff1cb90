use async_trait::async_trait;
use templar_core::AppResult;
use templar_domain::{
    AclPrincipal, Group, TemplateAclChange, TemplateAclEntry, TemplateId, TemplateRole, User,
};

/// User grant with its resolved principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateUserGrant {
    /// Granted user.
    pub user: User,
    /// Granted role, never `Deleted`.
    pub role: TemplateRole,
}

/// Group grant with its resolved principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateGroupGrant {
    /// Granted group; the implicit group is reported with no members.
    pub group: Group,
    /// Granted role, never `Deleted`.
    pub role: TemplateRole,
}

/// Effective grant list of one template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateAcl {
    /// Grants held by live users.
    pub users: Vec<TemplateUserGrant>,
    /// Grants held by non-deleted groups.
    pub groups: Vec<TemplateGroupGrant>,
}

/// Repository port for template grants.
#[async_trait]
pub trait TemplateAclRepository: Send + Sync {
    /// Applies validated changes in order as one atomic unit.
    ///
    /// `Deleted` removes the principal's entry and is a no-op when absent;
    /// any other role upserts.
    async fn apply_acl_changes(
        &self,
        template_id: TemplateId,
        changes: Vec<TemplateAclChange>,
    ) -> AppResult<()>;

    /// Returns grants whose principals are still live.
    ///
    /// Entries of suspended or deleted users and of deleted groups are kept
    /// in storage but omitted here.
    async fn get_template_acl(&self, template_id: TemplateId) -> AppResult<TemplateAcl>;

    /// Returns stored entries held by any of the given principals.
    async fn list_grants_for_principals(
        &self,
        template_id: TemplateId,
        principals: &[AclPrincipal],
    ) -> AppResult<Vec<TemplateAclEntry>>;
}
