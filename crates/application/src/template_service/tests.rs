use std::sync::Arc;
use std::time::Duration;

use templar_core::{AppError, OrganizationId};
use templar_domain::{AclPrincipal, Action, FeatureSet, GroupId, Role, TemplateRole};

use crate::test_fakes::FakeStore;

use super::{CreateTemplateInput, TemplateService};

fn build_service(store: &Arc<FakeStore>, features: FeatureSet) -> TemplateService {
    TemplateService::new(store.authorization(features), store.clone(), store.clone())
}

fn create_input(organization_id: OrganizationId, name: &str) -> CreateTemplateInput {
    CreateTemplateInput {
        organization_id,
        name: name.to_owned(),
        default_ttl: Duration::ZERO,
        max_ttl: Duration::ZERO,
    }
}

#[tokio::test]
async fn create_template_grants_everyone_use() {
    let store = FakeStore::shared();
    let service = build_service(&store, FeatureSet::all());
    let organization_id = OrganizationId::new();
    let admin_id = store
        .add_user("admin", vec![Role::OrgAdmin(organization_id)])
        .await;

    let template = service
        .create_template(admin_id, create_input(organization_id, "docker"))
        .await;
    assert!(template.is_ok());
    let template = template.unwrap_or_else(|_| unreachable!());

    let entries = store.entries_for(template.id()).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].principal,
        AclPrincipal::Group(GroupId::everyone(organization_id))
    );
    assert_eq!(entries[0].role, TemplateRole::Use);
    assert_eq!(store.events.lock().await.len(), 1);
}

#[tokio::test]
async fn member_cannot_create_templates() {
    let store = FakeStore::shared();
    let service = build_service(&store, FeatureSet::all());
    let organization_id = OrganizationId::new();
    let member_id = store
        .add_user("member", vec![Role::OrgMember(organization_id)])
        .await;

    let result = service
        .create_template(member_id, create_input(organization_id, "docker"))
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let outsider = service
        .create_template(member_id, create_input(OrganizationId::new(), "docker"))
        .await;
    assert!(matches!(outsider, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn create_template_rejects_max_ttl_without_advanced_scheduling() {
    let store = FakeStore::shared();
    let service = build_service(
        &store,
        FeatureSet {
            template_rbac: true,
            advanced_scheduling: false,
        },
    );
    let owner_id = store.add_user("owner", vec![Role::Owner]).await;

    let mut input = create_input(OrganizationId::new(), "docker");
    input.max_ttl = Duration::from_secs(3600);
    let result = service.create_template(owner_id, input).await;

    assert_eq!(
        result.err().as_ref().and_then(AppError::field),
        Some("max_ttl_ms")
    );
}

#[tokio::test]
async fn get_template_hides_unreadable_templates() {
    let store = FakeStore::shared();
    let service = build_service(&store, FeatureSet::all());
    let organization_id = OrganizationId::new();
    let member_id = store
        .add_user("member", vec![Role::OrgMember(organization_id)])
        .await;
    let template = store
        .add_template(organization_id, Duration::ZERO, Duration::ZERO)
        .await;

    let result = service.get_template(member_id, template.id()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    store
        .grant(template.id(), AclPrincipal::User(member_id), TemplateRole::Use)
        .await;
    let result = service.get_template(member_id, template.id()).await;
    assert_eq!(result.ok().map(|found| found.id()), Some(template.id()));
}

#[tokio::test]
async fn can_access_template_reports_decision() {
    let store = FakeStore::shared();
    let service = build_service(&store, FeatureSet::all());
    let organization_id = OrganizationId::new();
    let member_id = store
        .add_user("member", vec![Role::OrgMember(organization_id)])
        .await;
    let template = store
        .add_template(organization_id, Duration::ZERO, Duration::ZERO)
        .await;
    store
        .grant(template.id(), AclPrincipal::User(member_id), TemplateRole::Admin)
        .await;

    let push = service
        .can_access_template(member_id, Action::CreateVersion, template.id())
        .await;
    assert_eq!(push.ok(), Some(true));
}

#[tokio::test]
async fn listing_unreadable_organization_is_not_found() {
    let store = FakeStore::shared();
    let service = build_service(&store, FeatureSet::all());
    let member_id = store
        .add_user("member", vec![Role::OrgMember(OrganizationId::new())])
        .await;

    let result = service
        .list_accessible_templates(member_id, Some(OrganizationId::new()))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn listing_returns_only_granted_templates() {
    let store = FakeStore::shared();
    let service = build_service(&store, FeatureSet::all());
    let organization_id = OrganizationId::new();
    let member_id = store
        .add_user("member", vec![Role::OrgMember(organization_id)])
        .await;
    let granted = store
        .add_template(organization_id, Duration::ZERO, Duration::ZERO)
        .await;
    let _hidden = store
        .add_template(organization_id, Duration::ZERO, Duration::ZERO)
        .await;
    store
        .grant(
            granted.id(),
            AclPrincipal::Group(GroupId::everyone(organization_id)),
            TemplateRole::Use,
        )
        .await;

    let listed = service
        .list_accessible_templates(member_id, Some(organization_id))
        .await
        .unwrap_or_else(|error| panic!("template listing failed: {error}"));

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), granted.id());
}
