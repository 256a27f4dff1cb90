use std::str::FromStr;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use templar_core::AppError;
use templar_domain::UserId;

use crate::error::ApiResult;

/// Header carrying the authenticated user id, set by the fronting gateway.
pub const ACTOR_HEADER: &str = "x-actor-id";

pub async fn require_actor(mut request: Request, next: Next) -> ApiResult<Response> {
    let header = request
        .headers()
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let actor_id = UserId::from_str(header)
        .map_err(|_| AppError::Unauthorized(format!("invalid actor id '{header}'")))?;

    request.extensions_mut().insert(actor_id);
    Ok(next.run(request).await)
}
