use serde::{Deserialize, Serialize};
use templar_domain::Workspace;
use ts_rs::TS;

use super::common::duration_to_millis;

/// Incoming payload for workspace creation.
///
/// An absent `ttl_ms` inherits the template default; zero disables autostop.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-workspace-request.ts"
)]
pub struct CreateWorkspaceRequest {
    pub template_id: String,
    pub name: String,
    #[serde(default)]
    pub ttl_ms: Option<i64>,
}

/// Incoming payload for workspace TTL updates; absent or zero disables autostop.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-workspace-ttl-request.ts"
)]
pub struct UpdateWorkspaceTtlRequest {
    #[serde(default)]
    pub ttl_ms: Option<i64>,
}

/// Incoming payload for previewing the TTL a new workspace would receive.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/resolve-workspace-ttl-request.ts"
)]
pub struct ResolveWorkspaceTtlRequest {
    #[serde(default)]
    pub ttl_ms: Option<i64>,
}

/// Resolved workspace TTL; `null` means no automatic stop.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/resolved-workspace-ttl-response.ts"
)]
pub struct ResolvedWorkspaceTtlResponse {
    pub ttl_ms: Option<u64>,
}

/// API representation of a workspace.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/workspace-response.ts"
)]
pub struct WorkspaceResponse {
    pub id: String,
    pub organization_id: String,
    pub template_id: String,
    pub owner_id: String,
    pub name: String,
    pub ttl_ms: Option<u64>,
}

impl From<Workspace> for WorkspaceResponse {
    fn from(value: Workspace) -> Self {
        Self {
            id: value.id().to_string(),
            organization_id: value.organization_id().to_string(),
            template_id: value.template_id().to_string(),
            owner_id: value.owner_id().to_string(),
            name: value.name().to_owned(),
            ttl_ms: value.ttl().map(duration_to_millis),
        }
    }
}

impl ResolvedWorkspaceTtlResponse {
    pub fn new(ttl: Option<std::time::Duration>) -> Self {
        Self {
            ttl_ms: ttl.map(duration_to_millis),
        }
    }
}
