use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use templar_application::{CreateTemplateInput, UpdateTemplateScheduleInput};
use templar_core::{AppError, AppResult, OrganizationId};
use templar_domain::schedule::{DEFAULT_TTL_FIELD, MAX_TTL_FIELD, TTL_FIELD};
use templar_domain::{Action, TemplateId, TtlRequest, UserId};

use crate::dto::{
    CanAccessTemplateQuery, CanAccessTemplateResponse, CreateTemplateRequest, ListTemplatesQuery,
    ResolveWorkspaceTtlRequest, ResolvedWorkspaceTtlResponse, TemplateAclResponse,
    TemplateResponse, UpdateTemplateAclRequest, UpdateTemplateScheduleRequest, millis_to_duration,
    optional_millis_to_duration,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod acl;
mod catalog;
mod schedule;

pub use acl::{template_acl_handler, update_template_acl_handler};
pub use catalog::{
    can_access_template_handler, create_template_handler, get_template_handler,
    list_templates_handler,
};
pub use schedule::{resolve_workspace_ttl_handler, update_template_schedule_handler};

fn parse_template_id(value: &str) -> AppResult<TemplateId> {
    TemplateId::from_str(value)
}

fn parse_organization_id(value: &str) -> AppResult<OrganizationId> {
    uuid::Uuid::parse_str(value.trim())
        .map(OrganizationId::from_uuid)
        .map_err(|error| {
            AppError::invalid_field("organization_id", format!("invalid organization id: {error}"))
        })
}
