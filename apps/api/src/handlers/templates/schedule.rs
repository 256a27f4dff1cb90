use super::*;

pub async fn update_template_schedule_handler(
    State(state): State<AppState>,
    Extension(actor_id): Extension<UserId>,
    Path(template_id): Path<String>,
    Json(payload): Json<UpdateTemplateScheduleRequest>,
) -> ApiResult<Json<TemplateResponse>> {
    let template = state
        .schedule_service
        .update_template_schedule(
            actor_id,
            parse_template_id(template_id.as_str())?,
            UpdateTemplateScheduleInput {
                default_ttl: millis_to_duration(DEFAULT_TTL_FIELD, payload.default_ttl_ms)?,
                max_ttl: millis_to_duration(MAX_TTL_FIELD, payload.max_ttl_ms)?,
            },
        )
        .await?;

    Ok(Json(TemplateResponse::from(template)))
}

/// Previews the TTL a new workspace of a readable template would receive.
pub async fn resolve_workspace_ttl_handler(
    State(state): State<AppState>,
    Extension(actor_id): Extension<UserId>,
    Path(template_id): Path<String>,
    Json(payload): Json<ResolveWorkspaceTtlRequest>,
) -> ApiResult<Json<ResolvedWorkspaceTtlResponse>> {
    let template_id = parse_template_id(template_id.as_str())?;
    state
        .template_service
        .get_template(actor_id, template_id)
        .await?;

    let requested = match optional_millis_to_duration(TTL_FIELD, payload.ttl_ms)? {
        Some(ttl) => TtlRequest::Set(ttl),
        None => TtlRequest::Inherit,
    };
    let ttl = state
        .schedule_service
        .validate_and_resolve_workspace_ttl(template_id, requested)
        .await?;

    Ok(Json(ResolvedWorkspaceTtlResponse::new(ttl)))
}
