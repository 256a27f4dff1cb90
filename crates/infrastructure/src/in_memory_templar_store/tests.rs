use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use templar_application::{
    AuthorizationService, CreateTemplateInput, CreateWorkspaceInput, ScheduleService,
    TemplateAclService, TemplateRepository, TemplateService, UpdateTemplateAclInput,
    UpdateTemplateScheduleInput, WorkspaceRepository,
};
use templar_core::{AppError, AppResult, OrganizationId};
use templar_domain::{
    Action, FeatureSet, Group, GroupId, Role, Template, TemplateId, TemplateRole, TtlRequest,
    User, UserId, UserStatus, Workspace, WorkspaceId,
};

use super::InMemoryTemplarStore;

const HOUR: Duration = Duration::from_secs(60 * 60);

struct Harness {
    store: Arc<InMemoryTemplarStore>,
    templates: TemplateService,
    acl: TemplateAclService,
    schedule: ScheduleService,
    owner_id: UserId,
    organization_id: OrganizationId,
}

impl Harness {
    async fn new() -> Self {
        let store = Arc::new(InMemoryTemplarStore::new());
        let authorization =
            AuthorizationService::new(store.clone(), store.clone(), FeatureSet::all());
        let templates =
            TemplateService::new(authorization.clone(), store.clone(), store.clone());
        let acl = TemplateAclService::new(
            authorization.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        );
        let schedule =
            ScheduleService::new(authorization, store.clone(), store.clone(), store.clone());

        let organization_id = OrganizationId::new();
        let mut harness = Self {
            store,
            templates,
            acl,
            schedule,
            owner_id: UserId::new(),
            organization_id,
        };
        harness.owner_id = harness
            .user("owner", &[Role::Owner, Role::OrgMember(organization_id)])
            .await;
        harness
    }

    async fn user(&self, username: &str, roles: &[Role]) -> UserId {
        let user_id = UserId::new();
        let user = User::new(user_id, format!("{username}-{user_id}"), UserStatus::Active)
            .unwrap_or_else(|_| unreachable!());
        assert!(self.store.save_user(user).await.is_ok());
        for role in roles {
            assert!(self.store.assign_role(user_id, *role).await.is_ok());
        }
        user_id
    }

    async fn member(&self, organization_id: OrganizationId) -> UserId {
        self.user("member", &[Role::OrgMember(organization_id)]).await
    }

    async fn group(&self, organization_id: OrganizationId, members: &[UserId]) -> GroupId {
        let group = Group::new(
            GroupId::new(),
            organization_id,
            "SingleUser",
            members.iter().copied(),
        )
        .unwrap_or_else(|_| unreachable!());
        let group_id = group.id();
        assert!(self.store.save_group(group).await.is_ok());
        group_id
    }

    async fn template_as(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
        default_ttl: Duration,
        max_ttl: Duration,
    ) -> Template {
        self.templates
            .create_template(
                actor_id,
                CreateTemplateInput {
                    organization_id,
                    name: format!("template-{}", UserId::new()),
                    default_ttl,
                    max_ttl,
                },
            )
            .await
            .unwrap_or_else(|error| panic!("failed to create template: {error}"))
    }

    async fn template(&self) -> Template {
        self.template_as(
            self.owner_id,
            self.organization_id,
            Duration::ZERO,
            Duration::ZERO,
        )
        .await
    }

    async fn update_acl(
        &self,
        actor_id: UserId,
        template: &Template,
        user_perms: &[(String, &str)],
        group_perms: &[(String, &str)],
    ) -> Result<(), AppError> {
        let owned = |pairs: &[(String, &str)]| {
            pairs
                .iter()
                .map(|(id, role)| (id.clone(), (*role).to_owned()))
                .collect::<Vec<_>>()
        };
        self.acl
            .update_template_acl(
                actor_id,
                template.id(),
                UpdateTemplateAclInput {
                    user_perms: owned(user_perms),
                    group_perms: owned(group_perms),
                },
            )
            .await
    }
}

#[tokio::test]
async fn template_acl_reports_user_roles() {
    let harness = Harness::new().await;
    let template = harness.template().await;
    let user_a = harness.member(harness.organization_id).await;
    let user_b = harness.member(harness.organization_id).await;

    let result = harness
        .update_acl(
            harness.owner_id,
            &template,
            &[(user_a.to_string(), "use"), (user_b.to_string(), "admin")],
            &[],
        )
        .await;
    assert!(result.is_ok());

    let acl = harness
        .acl
        .get_template_acl(harness.owner_id, template.id())
        .await
        .unwrap_or_else(|error| panic!("acl read failed: {error}"));
    assert_eq!(acl.users.len(), 2);
    assert!(
        acl.users
            .iter()
            .any(|grant| grant.user.id() == user_a && grant.role == TemplateRole::Use)
    );
    assert!(
        acl.users
            .iter()
            .any(|grant| grant.user.id() == user_b && grant.role == TemplateRole::Admin)
    );
}

#[tokio::test]
async fn everyone_group_is_reported_without_members() {
    let harness = Harness::new().await;
    let template = harness.template().await;
    let _member = harness.member(harness.organization_id).await;

    let acl = harness
        .acl
        .get_template_acl(harness.owner_id, template.id())
        .await
        .unwrap_or_else(|error| panic!("acl read failed: {error}"));

    assert_eq!(acl.groups.len(), 1);
    let everyone = &acl.groups[0];
    assert_eq!(everyone.group.id(), GroupId::everyone(harness.organization_id));
    assert!(everyone.group.is_everyone());
    assert!(everyone.group.members().is_empty());
    assert_eq!(everyone.role, TemplateRole::Use);
}

#[tokio::test]
async fn removing_everyone_grant_leaves_no_groups() {
    let harness = Harness::new().await;
    let template = harness.template().await;

    let result = harness
        .update_acl(
            harness.owner_id,
            &template,
            &[],
            &[(harness.organization_id.to_string(), "")],
        )
        .await;
    assert!(result.is_ok());

    let acl = harness
        .acl
        .get_template_acl(harness.owner_id, template.id())
        .await
        .unwrap_or_else(|error| panic!("acl read failed: {error}"));
    assert!(acl.groups.is_empty());
    assert!(acl.users.is_empty());
}

#[tokio::test]
async fn everyone_grant_round_trip_toggles_member_access() {
    let harness = Harness::new().await;
    let template = harness.template().await;
    let member = harness.member(harness.organization_id).await;
    let everyone = harness.organization_id.to_string();

    assert!(harness.templates.get_template(member, template.id()).await.is_ok());

    let removed = harness
        .update_acl(harness.owner_id, &template, &[], &[(everyone.clone(), "")])
        .await;
    assert!(removed.is_ok());
    assert!(matches!(
        harness.templates.get_template(member, template.id()).await,
        Err(AppError::NotFound(_))
    ));

    let restored = harness
        .update_acl(harness.owner_id, &template, &[], &[(everyone, "use")])
        .await;
    assert!(restored.is_ok());
    assert!(harness.templates.get_template(member, template.id()).await.is_ok());
}

#[tokio::test]
async fn deleted_and_suspended_users_are_filtered_from_reads() {
    for status in [UserStatus::Deleted, UserStatus::Suspended] {
        let harness = Harness::new().await;
        let template = harness.template().await;
        let member = harness.member(harness.organization_id).await;

        let result = harness
            .update_acl(harness.owner_id, &template, &[(member.to_string(), "use")], &[])
            .await;
        assert!(result.is_ok());

        assert!(harness.store.set_user_status(member, status).await.is_ok());
        let acl = harness
            .acl
            .get_template_acl(harness.owner_id, template.id())
            .await
            .unwrap_or_else(|error| panic!("acl read failed: {error}"));
        assert!(acl.users.is_empty());
    }
}

#[tokio::test]
async fn deleted_groups_are_filtered_from_reads() {
    let harness = Harness::new().await;
    let template = harness.template().await;
    let group_id = harness.group(harness.organization_id, &[]).await;

    let result = harness
        .update_acl(
            harness.owner_id,
            &template,
            &[],
            &[(group_id.to_string(), "use")],
        )
        .await;
    assert!(result.is_ok());

    assert!(harness.store.delete_group(group_id).await.is_ok());
    let acl = harness
        .acl
        .get_template_acl(harness.owner_id, template.id())
        .await
        .unwrap_or_else(|error| panic!("acl read failed: {error}"));
    assert_eq!(acl.groups.len(), 1);
    assert!(acl.groups[0].group.is_everyone());
}

#[tokio::test]
async fn admin_grant_is_required_to_push_versions() {
    let harness = Harness::new().await;
    let template = harness.template().await;
    let member = harness.member(harness.organization_id).await;

    assert!(
        harness
            .update_acl(harness.owner_id, &template, &[(member.to_string(), "use")], &[])
            .await
            .is_ok()
    );
    let can_push = harness
        .templates
        .can_access_template(member, Action::CreateVersion, template.id())
        .await;
    assert_eq!(can_push.ok(), Some(false));

    assert!(
        harness
            .update_acl(harness.owner_id, &template, &[(member.to_string(), "admin")], &[])
            .await
            .is_ok()
    );
    let can_push = harness
        .templates
        .can_access_template(member, Action::CreateVersion, template.id())
        .await;
    assert_eq!(can_push.ok(), Some(true));
}

#[tokio::test]
async fn acl_update_appends_audit_event() {
    let harness = Harness::new().await;
    let template = harness.template().await;
    let member = harness.member(harness.organization_id).await;
    let before = harness.store.audit_events().await.len();

    assert!(
        harness
            .update_acl(harness.owner_id, &template, &[(member.to_string(), "use")], &[])
            .await
            .is_ok()
    );

    let events = harness.store.audit_events().await;
    assert_eq!(events.len(), before + 1);
    let event = events.last().unwrap_or_else(|| unreachable!());
    assert_eq!(event.action.as_str(), "template.acl.updated");
    assert_eq!(event.resource_id, template.id().to_string());
}

#[tokio::test]
async fn deleting_a_user_grant_removes_access() {
    let harness = Harness::new().await;
    let template = harness.template().await;
    let member = harness.member(harness.organization_id).await;
    assert!(
        harness
            .update_acl(
                harness.owner_id,
                &template,
                &[(member.to_string(), "use")],
                &[(harness.organization_id.to_string(), "deleted")],
            )
            .await
            .is_ok()
    );
    assert!(harness.templates.get_template(member, template.id()).await.is_ok());

    assert!(
        harness
            .update_acl(harness.owner_id, &template, &[(member.to_string(), "")], &[])
            .await
            .is_ok()
    );
    let result = harness.templates.get_template(member, template.id()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn invalid_acl_updates_are_rejected() {
    let harness = Harness::new().await;
    let template = harness.template().await;
    let member = harness.member(harness.organization_id).await;

    let invalid_uuid = harness
        .update_acl(harness.owner_id, &template, &[("hi".to_owned(), "use")], &[])
        .await;
    assert_eq!(
        invalid_uuid.err().as_ref().and_then(AppError::field),
        Some("user_perms")
    );

    let unknown_user = harness
        .update_acl(
            harness.owner_id,
            &template,
            &[(UserId::new().to_string(), "use")],
            &[],
        )
        .await;
    assert!(unknown_user.is_err());

    let invalid_role = harness
        .update_acl(
            harness.owner_id,
            &template,
            &[(member.to_string(), "updater")],
            &[],
        )
        .await;
    assert!(invalid_role.is_err());
}

#[tokio::test]
async fn regular_user_cannot_update_perms() {
    let harness = Harness::new().await;
    let template = harness.template().await;
    let member = harness.member(harness.organization_id).await;
    assert!(
        harness
            .update_acl(harness.owner_id, &template, &[(member.to_string(), "use")], &[])
            .await
            .is_ok()
    );

    let other = harness.member(harness.organization_id).await;
    let result = harness
        .update_acl(member, &template, &[(other.to_string(), "use")], &[])
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn regular_user_with_admin_can_update_perms() {
    let harness = Harness::new().await;
    let template = harness.template().await;
    let member = harness.member(harness.organization_id).await;
    let other = harness.member(harness.organization_id).await;
    assert!(
        harness
            .update_acl(harness.owner_id, &template, &[(member.to_string(), "admin")], &[])
            .await
            .is_ok()
    );

    let result = harness
        .update_acl(member, &template, &[(other.to_string(), "use")], &[])
        .await;
    assert!(result.is_ok());

    let acl = harness
        .acl
        .get_template_acl(member, template.id())
        .await
        .unwrap_or_else(|error| panic!("acl read failed: {error}"));
    assert_eq!(acl.users.len(), 2);
}

#[tokio::test]
async fn custom_group_grant_gives_access() {
    let harness = Harness::new().await;
    let template = harness.template().await;
    let member = harness.member(harness.organization_id).await;
    let group_id = harness.group(harness.organization_id, &[member]).await;

    assert!(
        harness
            .update_acl(
                harness.owner_id,
                &template,
                &[],
                &[
                    (harness.organization_id.to_string(), "deleted"),
                    (group_id.to_string(), "use"),
                ],
            )
            .await
            .is_ok()
    );

    assert!(harness.templates.get_template(member, template.id()).await.is_ok());
}

#[tokio::test]
async fn no_grant_means_not_found() {
    let harness = Harness::new().await;
    let template = harness.template().await;
    let member = harness.member(harness.organization_id).await;

    assert!(
        harness
            .update_acl(
                harness.owner_id,
                &template,
                &[],
                &[(harness.organization_id.to_string(), "deleted")],
            )
            .await
            .is_ok()
    );

    let result = harness.templates.get_template(member, template.id()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    assert!(
        harness
            .update_acl(
                harness.owner_id,
                &template,
                &[],
                &[(harness.organization_id.to_string(), "use")],
            )
            .await
            .is_ok()
    );
    assert!(harness.templates.get_template(member, template.id()).await.is_ok());
}

struct OrgSetup {
    organization_id: OrganizationId,
    admin: UserId,
    member_in_group: UserId,
    member_no_group: UserId,
    default_template: Template,
    all_read: Template,
    user_acl: Template,
    group_acl: Template,
}

async fn make_org(harness: &Harness) -> OrgSetup {
    let organization_id = OrganizationId::new();
    let admin = harness
        .user("org-admin", &[Role::OrgAdmin(organization_id)])
        .await;
    let member_in_group = harness.member(organization_id).await;
    let member_no_group = harness.member(organization_id).await;
    let group_id = harness.group(organization_id, &[member_in_group]).await;
    let everyone = organization_id.to_string();

    let mut templates = Vec::new();
    let acls: [(Vec<(String, &str)>, Vec<(String, &str)>); 4] = [
        (Vec::new(), vec![(everyone.clone(), "deleted")]),
        (Vec::new(), vec![(everyone.clone(), "use")]),
        (
            vec![(member_no_group.to_string(), "use")],
            vec![(everyone.clone(), "deleted")],
        ),
        (
            Vec::new(),
            vec![(group_id.to_string(), "use"), (everyone.clone(), "deleted")],
        ),
    ];
    for (user_perms, group_perms) in acls {
        let template = harness
            .template_as(admin, organization_id, Duration::ZERO, Duration::ZERO)
            .await;
        let result = harness
            .update_acl(admin, &template, &user_perms, &group_perms)
            .await;
        assert!(result.is_ok(), "failed to update template acl");
        templates.push(template);
    }

    let mut templates = templates.into_iter();
    let mut next = || templates.next().unwrap_or_else(|| unreachable!());
    OrgSetup {
        organization_id,
        admin,
        member_in_group,
        member_no_group,
        default_template: next(),
        all_read: next(),
        user_acl: next(),
        group_acl: next(),
    }
}

async fn assert_listing(
    harness: &Harness,
    actor_id: UserId,
    organization_id: OrganizationId,
    expected: &[&Template],
) {
    let result = harness
        .templates
        .list_accessible_templates(actor_id, Some(organization_id))
        .await;

    if expected.is_empty()
        && let Err(error) = &result
    {
        assert!(matches!(error, AppError::NotFound(_)));
        return;
    }

    let mut found = result
        .unwrap_or_else(|error| panic!("failed to list templates: {error}"))
        .into_iter()
        .map(|template| template.id())
        .collect::<Vec<_>>();
    let mut expected = expected
        .iter()
        .map(|template| template.id())
        .collect::<Vec<_>>();
    found.sort_by_key(|id| id.as_uuid());
    expected.sort_by_key(|id| id.as_uuid());
    assert_eq!(found, expected);
}

#[tokio::test]
async fn template_listing_matrix_across_organizations() {
    let harness = Harness::new().await;
    let template_admin = harness.user("template-admin", &[Role::TemplateAdmin]).await;
    let orgs = [make_org(&harness).await, make_org(&harness).await];

    for (index, org) in orgs.iter().enumerate() {
        let all = [
            &org.default_template,
            &org.all_read,
            &org.user_acl,
            &org.group_acl,
        ];
        let other = &orgs[(index + 1) % orgs.len()];

        assert_listing(&harness, harness.owner_id, org.organization_id, &all).await;
        assert_listing(&harness, template_admin, org.organization_id, &all).await;

        assert_listing(&harness, org.admin, org.organization_id, &all).await;
        assert_listing(&harness, org.admin, other.organization_id, &[]).await;

        assert_listing(
            &harness,
            org.member_no_group,
            org.organization_id,
            &[&org.all_read, &org.user_acl],
        )
        .await;
        assert_listing(&harness, org.member_no_group, other.organization_id, &[]).await;

        assert_listing(
            &harness,
            org.member_in_group,
            org.organization_id,
            &[&org.all_read, &org.group_acl],
        )
        .await;
        assert_listing(&harness, org.member_in_group, other.organization_id, &[]).await;
    }
}

#[tokio::test]
async fn listing_without_organization_spans_every_readable_organization() {
    let harness = Harness::new().await;
    let orgs = [make_org(&harness).await, make_org(&harness).await];

    let everything = harness
        .templates
        .list_accessible_templates(harness.owner_id, None)
        .await
        .unwrap_or_else(|error| panic!("template listing failed: {error}"));
    assert_eq!(everything.len(), 8);

    let member_view = harness
        .templates
        .list_accessible_templates(orgs[0].member_no_group, None)
        .await
        .unwrap_or_else(|error| panic!("template listing failed: {error}"));
    assert_eq!(member_view.len(), 2);
    assert!(
        member_view
            .iter()
            .all(|template| template.organization_id() == orgs[0].organization_id)
    );
}

#[tokio::test]
async fn lowering_max_ttl_propagates_to_long_workspaces() {
    let harness = Harness::new().await;
    let template = harness.template().await;

    let create = |ttl| {
        harness.schedule.create_workspace(
            harness.owner_id,
            CreateWorkspaceInput {
                template_id: template.id(),
                name: format!("ws-{}", UserId::new()),
                ttl,
            },
        )
    };
    let long = create(TtlRequest::Set(48 * HOUR))
        .await
        .unwrap_or_else(|error| panic!("failed to create workspace: {error}"));
    let short = create(TtlRequest::Set(HOUR))
        .await
        .unwrap_or_else(|error| panic!("failed to create workspace: {error}"));
    let unset = create(TtlRequest::Disabled)
        .await
        .unwrap_or_else(|error| panic!("failed to create workspace: {error}"));

    let updated = harness
        .schedule
        .update_template_schedule(
            harness.owner_id,
            template.id(),
            UpdateTemplateScheduleInput {
                default_ttl: Duration::ZERO,
                max_ttl: 24 * HOUR,
            },
        )
        .await;
    assert_eq!(updated.ok().map(|template| template.max_ttl()), Some(24 * HOUR));

    let store = &harness.store;
    let ttl_of = |workspace_id| async move {
        store
            .find_workspace(workspace_id)
            .await
            .unwrap_or_else(|error| panic!("failed to read workspace: {error}"))
            .unwrap_or_else(|| panic!("workspace '{workspace_id}' is missing"))
            .ttl()
    };
    assert_eq!(ttl_of(long.id()).await, Some(24 * HOUR));
    assert_eq!(ttl_of(short.id()).await, Some(HOUR));
    assert_eq!(ttl_of(unset.id()).await, None);
}

#[tokio::test]
async fn workspace_ttl_cannot_exceed_template_max() {
    let harness = Harness::new().await;
    let template = harness
        .template_as(harness.owner_id, harness.organization_id, HOUR, 2 * HOUR)
        .await;

    let workspace = harness
        .schedule
        .create_workspace(
            harness.owner_id,
            CreateWorkspaceInput {
                template_id: template.id(),
                name: "dev".to_owned(),
                ttl: TtlRequest::Inherit,
            },
        )
        .await
        .unwrap_or_else(|error| panic!("failed to create workspace: {error}"));
    assert_eq!(workspace.ttl(), Some(HOUR));

    let too_long = 2 * HOUR + Duration::from_millis(1);
    let update = harness
        .schedule
        .update_workspace_ttl(harness.owner_id, workspace.id(), Some(too_long))
        .await;
    let error = update.err();
    assert_eq!(error.as_ref().and_then(AppError::field), Some("ttl_ms"));
    assert!(
        error
            .map(|error| error.to_string())
            .unwrap_or_default()
            .contains("less than or equal to the template's maximum TTL")
    );

    let create = harness
        .schedule
        .create_workspace(
            harness.owner_id,
            CreateWorkspaceInput {
                template_id: template.id(),
                name: "dev-2".to_owned(),
                ttl: TtlRequest::Set(too_long),
            },
        )
        .await;
    assert_eq!(create.err().as_ref().and_then(AppError::field), Some("ttl_ms"));
}

#[tokio::test]
async fn disabling_auto_off_under_max_ttl_is_accepted() {
    let harness = Harness::new().await;
    let template = harness
        .template_as(harness.owner_id, harness.organization_id, HOUR, 24 * HOUR)
        .await;
    let workspace = harness
        .schedule
        .create_workspace(
            harness.owner_id,
            CreateWorkspaceInput {
                template_id: template.id(),
                name: "dev".to_owned(),
                ttl: TtlRequest::Inherit,
            },
        )
        .await
        .unwrap_or_else(|error| panic!("failed to create workspace: {error}"));

    let result = harness
        .schedule
        .update_workspace_ttl(harness.owner_id, workspace.id(), None)
        .await;
    assert!(result.is_ok());

    let reread = harness
        .schedule
        .get_workspace(harness.owner_id, workspace.id())
        .await
        .unwrap_or_else(|error| panic!("failed to read workspace: {error}"));
    assert_eq!(reread.ttl(), workspace.ttl());
}

/// Commits a tighter template schedule right before every workspace write.
struct TighteningWorkspaces {
    store: Arc<InMemoryTemplarStore>,
    template_id: TemplateId,
    max_ttl: Duration,
}

impl TighteningWorkspaces {
    async fn tighten(&self) {
        let update = self
            .store
            .update_template_schedule(self.template_id, Duration::ZERO, self.max_ttl)
            .await;
        assert!(update.is_ok());
    }
}

#[async_trait]
impl WorkspaceRepository for TighteningWorkspaces {
    async fn create_workspace(
        &self,
        workspace: Workspace,
        enforce_max_ttl: bool,
    ) -> AppResult<Workspace> {
        self.tighten().await;
        self.store.create_workspace(workspace, enforce_max_ttl).await
    }

    async fn find_workspace(&self, workspace_id: WorkspaceId) -> AppResult<Option<Workspace>> {
        self.store.find_workspace(workspace_id).await
    }

    async fn update_workspace_ttl(
        &self,
        workspace_id: WorkspaceId,
        ttl: Option<Duration>,
        enforce_max_ttl: bool,
    ) -> AppResult<Workspace> {
        self.tighten().await;
        self.store
            .update_workspace_ttl(workspace_id, ttl, enforce_max_ttl)
            .await
    }
}

#[tokio::test]
async fn schedule_update_between_check_and_write_still_bounds_ttl() {
    let harness = Harness::new().await;
    let template = harness.template().await;
    let workspace = harness
        .schedule
        .create_workspace(
            harness.owner_id,
            CreateWorkspaceInput {
                template_id: template.id(),
                name: "dev".to_owned(),
                ttl: TtlRequest::Set(HOUR),
            },
        )
        .await
        .unwrap_or_else(|error| panic!("failed to create workspace: {error}"));

    let tightening = ScheduleService::new(
        AuthorizationService::new(
            harness.store.clone(),
            harness.store.clone(),
            FeatureSet::all(),
        ),
        harness.store.clone(),
        Arc::new(TighteningWorkspaces {
            store: harness.store.clone(),
            template_id: template.id(),
            max_ttl: 2 * HOUR,
        }),
        harness.store.clone(),
    );

    let update = tightening
        .update_workspace_ttl(harness.owner_id, workspace.id(), Some(48 * HOUR))
        .await;
    assert_eq!(update.err().as_ref().and_then(AppError::field), Some("ttl_ms"));

    let stored = harness
        .store
        .find_workspace(workspace.id())
        .await
        .unwrap_or_else(|error| panic!("failed to read workspace: {error}"))
        .map(|workspace| workspace.ttl());
    assert_eq!(stored, Some(Some(HOUR)));

    let relaxed = harness
        .store
        .update_template_schedule(template.id(), Duration::ZERO, Duration::ZERO)
        .await;
    assert!(relaxed.is_ok());
    let create = tightening
        .create_workspace(
            harness.owner_id,
            CreateWorkspaceInput {
                template_id: template.id(),
                name: "dev-2".to_owned(),
                ttl: TtlRequest::Set(48 * HOUR),
            },
        )
        .await;
    assert_eq!(create.err().as_ref().and_then(AppError::field), Some("ttl_ms"));

    let within = tightening
        .update_workspace_ttl(harness.owner_id, workspace.id(), Some(Duration::from_secs(90 * 60)))
        .await;
    assert_eq!(
        within.ok().and_then(|workspace| workspace.ttl()),
        Some(Duration::from_secs(90 * 60))
    );
}
