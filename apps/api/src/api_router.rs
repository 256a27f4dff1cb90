use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};


pub fn build_router(app_state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/api/templates",
            get(handlers::templates::list_templates_handler)
                .post(handlers::templates::create_template_handler),
        )
        .route(
            "/api/templates/{template_id}",
            get(handlers::templates::get_template_handler),
        )
        .route(
            "/api/templates/{template_id}/access",
            get(handlers::templates::can_access_template_handler),
        )
        .route(
            "/api/templates/{template_id}/acl",
            get(handlers::templates::template_acl_handler)
                .patch(handlers::templates::update_template_acl_handler),
        )
        .route(
            "/api/templates/{template_id}/schedule",
            put(handlers::templates::update_template_schedule_handler),
        )
        .route(
            "/api/templates/{template_id}/workspace-ttl",
            post(handlers::templates::resolve_workspace_ttl_handler),
        )
        .route(
            "/api/workspaces",
            post(handlers::workspaces::create_workspace_handler),
        )
        .route(
            "/api/workspaces/{workspace_id}",
            get(handlers::workspaces::get_workspace_handler),
        )
        .route(
            "/api/workspaces/{workspace_id}/ttl",
            put(handlers::workspaces::update_workspace_ttl_handler),
        )
        .route_layer(from_fn(middleware::require_actor));

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
