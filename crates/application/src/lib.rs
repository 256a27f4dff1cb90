//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_service;
mod schedule_service;
mod template_acl_service;
mod template_ports;
mod template_service;

#[cfg(test)]
mod test_fakes;

pub use authorization_service::{ActorContext, AuthorizationService};
pub use schedule_service::{CreateWorkspaceInput, ScheduleService, UpdateTemplateScheduleInput};
pub use template_acl_service::{TemplateAclService, UpdateTemplateAclInput};
pub use template_ports::{
    AuditEvent, AuditRepository, PrincipalRepository, TemplateAccessFilter, TemplateAcl,
    TemplateAclRepository, TemplateGroupGrant, TemplateListQuery, TemplateRepository,
    TemplateScheduleUpdate, TemplateUserGrant, WorkspaceRepository,
};
pub use template_service::{CreateTemplateInput, TemplateService};
