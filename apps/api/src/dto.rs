mod common;
mod templates;
mod workspaces;

pub use common::{HealthResponse, millis_to_duration, optional_millis_to_duration};
pub use templates::{
    CanAccessTemplateQuery, CanAccessTemplateResponse, CreateTemplateRequest,
    ListTemplatesQuery, TemplateAclGroupResponse, TemplateAclResponse, TemplateAclUserResponse,
    TemplateResponse, UpdateTemplateAclRequest, UpdateTemplateScheduleRequest,
};
pub use workspaces::{
    CreateWorkspaceRequest, ResolveWorkspaceTtlRequest, ResolvedWorkspaceTtlResponse,
    UpdateWorkspaceTtlRequest, WorkspaceResponse,
};
