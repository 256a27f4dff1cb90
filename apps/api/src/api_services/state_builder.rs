use std::sync::Arc;

use sqlx::PgPool;
use templar_application::{
    AuditRepository, AuthorizationService, PrincipalRepository, ScheduleService,
    TemplateAclRepository, TemplateAclService, TemplateRepository, TemplateService,
    WorkspaceRepository,
};
use templar_domain::FeatureSet;
use templar_infrastructure::{
    InMemoryTemplarStore, PostgresAuditRepository, PostgresPrincipalRepository,
    PostgresTemplateRepository, PostgresWorkspaceRepository,
};

use crate::state::AppState;

struct RepositorySet {
    principals: Arc<dyn PrincipalRepository>,
    templates: Arc<dyn TemplateRepository>,
    acl: Arc<dyn TemplateAclRepository>,
    workspaces: Arc<dyn WorkspaceRepository>,
    audit: Arc<dyn AuditRepository>,
}

pub fn build_postgres_state(pool: PgPool, features: FeatureSet) -> AppState {
    let templates = Arc::new(PostgresTemplateRepository::new(pool.clone()));

    build_app_state(
        RepositorySet {
            principals: Arc::new(PostgresPrincipalRepository::new(pool.clone())),
            templates: templates.clone(),
            acl: templates,
            workspaces: Arc::new(PostgresWorkspaceRepository::new(pool.clone())),
            audit: Arc::new(PostgresAuditRepository::new(pool)),
        },
        features,
    )
}

pub fn build_in_memory_state(store: Arc<InMemoryTemplarStore>, features: FeatureSet) -> AppState {
    build_app_state(
        RepositorySet {
            principals: store.clone(),
            templates: store.clone(),
            acl: store.clone(),
            workspaces: store.clone(),
            audit: store,
        },
        features,
    )
}

fn build_app_state(repositories: RepositorySet, features: FeatureSet) -> AppState {
    let authorization_service = AuthorizationService::new(
        repositories.principals.clone(),
        repositories.acl.clone(),
        features,
    );

    AppState {
        template_service: TemplateService::new(
            authorization_service.clone(),
            repositories.templates.clone(),
            repositories.audit.clone(),
        ),
        template_acl_service: TemplateAclService::new(
            authorization_service.clone(),
            repositories.principals,
            repositories.templates.clone(),
            repositories.acl,
            repositories.audit.clone(),
        ),
        schedule_service: ScheduleService::new(
            authorization_service,
            repositories.templates,
            repositories.workspaces,
            repositories.audit,
        ),
    }
}
