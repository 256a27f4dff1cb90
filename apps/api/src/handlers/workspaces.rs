use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use templar_application::CreateWorkspaceInput;
use templar_domain::schedule::TTL_FIELD;
use templar_domain::{TemplateId, TtlRequest, UserId, WorkspaceId};

use crate::dto::{
    CreateWorkspaceRequest, UpdateWorkspaceTtlRequest, WorkspaceResponse,
    optional_millis_to_duration,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_workspace_handler(
    State(state): State<AppState>,
    Extension(actor_id): Extension<UserId>,
    Json(payload): Json<CreateWorkspaceRequest>,
) -> ApiResult<(StatusCode, Json<WorkspaceResponse>)> {
    let ttl = match optional_millis_to_duration(TTL_FIELD, payload.ttl_ms)? {
        Some(ttl) => TtlRequest::Set(ttl),
        None => TtlRequest::Inherit,
    };

    let workspace = state
        .schedule_service
        .create_workspace(
            actor_id,
            CreateWorkspaceInput {
                template_id: TemplateId::from_str(payload.template_id.as_str())?,
                name: payload.name,
                ttl,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(WorkspaceResponse::from(workspace))))
}

pub async fn get_workspace_handler(
    State(state): State<AppState>,
    Extension(actor_id): Extension<UserId>,
    Path(workspace_id): Path<String>,
) -> ApiResult<Json<WorkspaceResponse>> {
    let workspace = state
        .schedule_service
        .get_workspace(actor_id, WorkspaceId::from_str(workspace_id.as_str())?)
        .await?;

    Ok(Json(WorkspaceResponse::from(workspace)))
}

pub async fn update_workspace_ttl_handler(
    State(state): State<AppState>,
    Extension(actor_id): Extension<UserId>,
    Path(workspace_id): Path<String>,
    Json(payload): Json<UpdateWorkspaceTtlRequest>,
) -> ApiResult<Json<WorkspaceResponse>> {
    let workspace = state
        .schedule_service
        .update_workspace_ttl(
            actor_id,
            WorkspaceId::from_str(workspace_id.as_str())?,
            optional_millis_to_duration(TTL_FIELD, payload.ttl_ms)?,
        )
        .await?;

    Ok(Json(WorkspaceResponse::from(workspace)))
}
