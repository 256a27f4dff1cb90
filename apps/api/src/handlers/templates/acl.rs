use super::*;

pub async fn template_acl_handler(
    State(state): State<AppState>,
    Extension(actor_id): Extension<UserId>,
    Path(template_id): Path<String>,
) -> ApiResult<Json<TemplateAclResponse>> {
    let acl = state
        .template_acl_service
        .get_template_acl(actor_id, parse_template_id(template_id.as_str())?)
        .await?;

    Ok(Json(TemplateAclResponse::from(acl)))
}

pub async fn update_template_acl_handler(
    State(state): State<AppState>,
    Extension(actor_id): Extension<UserId>,
    Path(template_id): Path<String>,
    Json(payload): Json<UpdateTemplateAclRequest>,
) -> ApiResult<StatusCode> {
    state
        .template_acl_service
        .update_template_acl(
            actor_id,
            parse_template_id(template_id.as_str())?,
            payload.into(),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
