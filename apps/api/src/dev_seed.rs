use templar_core::{AppResult, OrganizationId};
use templar_domain::{Group, GroupId, Role, User, UserId, UserStatus};
use templar_infrastructure::InMemoryTemplarStore;
use tracing::info;
use uuid::Uuid;

const DEV_SEED_ORGANIZATION_ID: Uuid = Uuid::from_u128(0x1111_1111_1111_1111_1111_1111_1111_1111);
const DEV_SEED_ADMIN_USER_ID: Uuid = Uuid::from_u128(0xa2c8_ea5f_4f39_4724_97f5_932f_97f5_4f76);
const DEV_SEED_MEMBER_USER_ID: Uuid = Uuid::from_u128(0x96d1_1e90_7403_4654_9727_cb10_43f8_bd31);
const DEV_SEED_GROUP_ID: Uuid = Uuid::from_u128(0x5b0e_2c7d_0f4a_4b8e_9c61_7d2a_3e4f_5a6b);

/// Seeds an in-memory store with one organization, an admin, a member and a group.
pub async fn seed_in_memory(store: &InMemoryTemplarStore) -> AppResult<()> {
    let organization_id = OrganizationId::from_uuid(DEV_SEED_ORGANIZATION_ID);
    let admin_id = UserId::from_uuid(DEV_SEED_ADMIN_USER_ID);
    let member_id = UserId::from_uuid(DEV_SEED_MEMBER_USER_ID);

    store
        .save_user(User::new(admin_id, "admin", UserStatus::Active)?)
        .await?;
    store.assign_role(admin_id, Role::Owner).await?;
    store
        .assign_role(admin_id, Role::OrgAdmin(organization_id))
        .await?;

    store
        .save_user(User::new(member_id, "member", UserStatus::Active)?)
        .await?;
    store
        .assign_role(member_id, Role::OrgMember(organization_id))
        .await?;

    store
        .save_group(Group::new(
            GroupId::from_uuid(DEV_SEED_GROUP_ID),
            organization_id,
            "developers",
            [member_id],
        )?)
        .await?;

    info!(
        organization_id = %organization_id,
        admin_id = %admin_id,
        member_id = %member_id,
        "seeded in-memory store"
    );

    Ok(())
}
