use std::time::Duration;

use async_trait::async_trait;
use templar_core::AppResult;
use templar_domain::{Workspace, WorkspaceId};

/// Repository port for workspace persistence.
///
/// With `enforce_max_ttl` set, writes re-check the TTL against the owning
/// template's max TTL as stored at write time and fail with an
/// `InvalidField` on `ttl_ms` when it is exceeded. The check and the write
/// must not interleave with a template schedule update.
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    /// Persists a new workspace.
    async fn create_workspace(
        &self,
        workspace: Workspace,
        enforce_max_ttl: bool,
    ) -> AppResult<Workspace>;

    /// Finds a workspace by identifier.
    async fn find_workspace(&self, workspace_id: WorkspaceId) -> AppResult<Option<Workspace>>;

    /// Replaces the TTL of a workspace and returns the stored row.
    async fn update_workspace_ttl(
        &self,
        workspace_id: WorkspaceId,
        ttl: Option<Duration>,
        enforce_max_ttl: bool,
    ) -> AppResult<Workspace>;
}
