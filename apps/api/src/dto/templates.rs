use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use templar_application::{TemplateAcl, TemplateGroupGrant, TemplateUserGrant};
use templar_domain::Template;
use ts_rs::TS;

use super::common::duration_to_millis;

/// Incoming payload for template creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-template-request.ts"
)]
pub struct CreateTemplateRequest {
    pub organization_id: String,
    pub name: String,
    #[serde(default)]
    pub default_ttl_ms: i64,
    #[serde(default)]
    pub max_ttl_ms: i64,
}

/// API representation of a template.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/template-response.ts"
)]
pub struct TemplateResponse {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub created_by: String,
    pub default_ttl_ms: u64,
    pub max_ttl_ms: u64,
}

impl From<Template> for TemplateResponse {
    fn from(value: Template) -> Self {
        Self {
            id: value.id().to_string(),
            organization_id: value.organization_id().to_string(),
            name: value.name().to_owned(),
            created_by: value.created_by().to_string(),
            default_ttl_ms: duration_to_millis(value.default_ttl()),
            max_ttl_ms: duration_to_millis(value.max_ttl()),
        }
    }
}

/// Query parameters for template listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListTemplatesQuery {
    pub organization_id: Option<String>,
}

/// Query parameters for template access checks.
#[derive(Debug, Deserialize)]
pub struct CanAccessTemplateQuery {
    pub action: String,
}

/// Outcome of a template access check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/can-access-template-response.ts"
)]
pub struct CanAccessTemplateResponse {
    pub allowed: bool,
}

/// Incoming payload for template grant updates.
///
/// Keys are principal ids; an empty role removes the grant.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-template-acl-request.ts"
)]
pub struct UpdateTemplateAclRequest {
    #[serde(default)]
    pub user_perms: BTreeMap<String, String>,
    #[serde(default)]
    pub group_perms: BTreeMap<String, String>,
}

impl From<UpdateTemplateAclRequest> for templar_application::UpdateTemplateAclInput {
    fn from(value: UpdateTemplateAclRequest) -> Self {
        Self {
            user_perms: value.user_perms.into_iter().collect(),
            group_perms: value.group_perms.into_iter().collect(),
        }
    }
}

/// API representation of a user grant.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/template-acl-user-response.ts"
)]
pub struct TemplateAclUserResponse {
    pub id: String,
    pub username: String,
    pub role: String,
}

impl From<TemplateUserGrant> for TemplateAclUserResponse {
    fn from(value: TemplateUserGrant) -> Self {
        Self {
            id: value.user.id().to_string(),
            username: value.user.username().to_owned(),
            role: value.role.as_str().to_owned(),
        }
    }
}

/// API representation of a group grant.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/template-acl-group-response.ts"
)]
pub struct TemplateAclGroupResponse {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub members: Vec<String>,
    pub role: String,
}

impl From<TemplateGroupGrant> for TemplateAclGroupResponse {
    fn from(value: TemplateGroupGrant) -> Self {
        Self {
            id: value.group.id().to_string(),
            organization_id: value.group.organization_id().to_string(),
            name: value.group.name().to_owned(),
            members: value
                .group
                .members()
                .iter()
                .map(ToString::to_string)
                .collect(),
            role: value.role.as_str().to_owned(),
        }
    }
}

/// API representation of a template's effective grants.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/template-acl-response.ts"
)]
pub struct TemplateAclResponse {
    pub users: Vec<TemplateAclUserResponse>,
    pub groups: Vec<TemplateAclGroupResponse>,
}

impl From<TemplateAcl> for TemplateAclResponse {
    fn from(value: TemplateAcl) -> Self {
        Self {
            users: value.users.into_iter().map(Into::into).collect(),
            groups: value.groups.into_iter().map(Into::into).collect(),
        }
    }
}

/// Incoming payload for template schedule updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-template-schedule-request.ts"
)]
pub struct UpdateTemplateScheduleRequest {
    #[serde(default)]
    pub default_ttl_ms: i64,
    #[serde(default)]
    pub max_ttl_ms: i64,
}
