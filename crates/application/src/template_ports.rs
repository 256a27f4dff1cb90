mod access_filter;
mod acl;
mod audit;
mod principals;
mod templates;
mod workspaces;

pub use access_filter::{TemplateAccessFilter, TemplateListQuery};
pub use acl::{TemplateAcl, TemplateAclRepository, TemplateGroupGrant, TemplateUserGrant};
pub use audit::{AuditEvent, AuditRepository};
pub use principals::PrincipalRepository;
pub use templates::{TemplateRepository, TemplateScheduleUpdate};
pub use workspaces::WorkspaceRepository;
