use templar_application::{ScheduleService, TemplateAclService, TemplateService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub template_service: TemplateService,
    pub template_acl_service: TemplateAclService,
    pub schedule_service: ScheduleService,
}
