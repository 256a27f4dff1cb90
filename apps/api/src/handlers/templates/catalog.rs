use super::*;

pub async fn create_template_handler(
    State(state): State<AppState>,
    Extension(actor_id): Extension<UserId>,
    Json(payload): Json<CreateTemplateRequest>,
) -> ApiResult<(StatusCode, Json<TemplateResponse>)> {
    let template = state
        .template_service
        .create_template(
            actor_id,
            CreateTemplateInput {
                organization_id: parse_organization_id(payload.organization_id.as_str())?,
                name: payload.name,
                default_ttl: millis_to_duration(DEFAULT_TTL_FIELD, payload.default_ttl_ms)?,
                max_ttl: millis_to_duration(MAX_TTL_FIELD, payload.max_ttl_ms)?,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(TemplateResponse::from(template))))
}

pub async fn get_template_handler(
    State(state): State<AppState>,
    Extension(actor_id): Extension<UserId>,
    Path(template_id): Path<String>,
) -> ApiResult<Json<TemplateResponse>> {
    let template = state
        .template_service
        .get_template(actor_id, parse_template_id(template_id.as_str())?)
        .await?;

    Ok(Json(TemplateResponse::from(template)))
}

pub async fn list_templates_handler(
    State(state): State<AppState>,
    Extension(actor_id): Extension<UserId>,
    Query(query): Query<ListTemplatesQuery>,
) -> ApiResult<Json<Vec<TemplateResponse>>> {
    let organization_id = query
        .organization_id
        .as_deref()
        .map(parse_organization_id)
        .transpose()?;

    let templates = state
        .template_service
        .list_accessible_templates(actor_id, organization_id)
        .await?
        .into_iter()
        .map(TemplateResponse::from)
        .collect();

    Ok(Json(templates))
}

pub async fn can_access_template_handler(
    State(state): State<AppState>,
    Extension(actor_id): Extension<UserId>,
    Path(template_id): Path<String>,
    Query(query): Query<CanAccessTemplateQuery>,
) -> ApiResult<Json<CanAccessTemplateResponse>> {
    let action = Action::from_str(query.action.as_str())?;
    let allowed = state
        .template_service
        .can_access_template(actor_id, action, parse_template_id(template_id.as_str())?)
        .await?;

    Ok(Json(CanAccessTemplateResponse { allowed }))
}
