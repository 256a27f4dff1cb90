use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use templar_core::{AppResult, NonEmptyString, OrganizationId};

use crate::{GroupId, UserId};

/// Display name reported for every organization's implicit group.
pub const EVERYONE_GROUP_NAME: &str = "Everyone";

/// Organization-scoped group principal.
///
/// The implicit "everyone" group is never stored with members; its
/// membership is derived from organization membership at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    organization_id: OrganizationId,
    name: String,
    members: BTreeSet<UserId>,
    deleted: bool,
}

impl Group {
    /// Creates a validated explicit group.
    pub fn new(
        id: GroupId,
        organization_id: OrganizationId,
        name: impl Into<String>,
        members: impl IntoIterator<Item = UserId>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            organization_id,
            name: NonEmptyString::new(name)?.into(),
            members: members.into_iter().collect(),
            deleted: false,
        })
    }

    /// Synthesizes the implicit "everyone" group of an organization.
    ///
    /// The member list is always empty: membership is not exposed through reads.
    #[must_use]
    pub fn everyone(organization_id: OrganizationId) -> Self {
        Self {
            id: GroupId::everyone(organization_id),
            organization_id,
            name: EVERYONE_GROUP_NAME.to_owned(),
            members: BTreeSet::new(),
            deleted: false,
        }
    }

    /// Returns the group identifier.
    #[must_use]
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the group display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns explicit members.
    #[must_use]
    pub fn members(&self) -> &BTreeSet<UserId> {
        &self.members
    }

    /// Returns whether this is the organization's implicit group.
    #[must_use]
    pub fn is_everyone(&self) -> bool {
        self.id.is_everyone_of(self.organization_id)
    }

    /// Returns whether the group was soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Adds a user to the explicit member set.
    pub fn add_member(&mut self, user_id: UserId) {
        self.members.insert(user_id);
    }

    /// Returns a tombstoned copy.
    #[must_use]
    pub fn into_deleted(mut self) -> Self {
        self.deleted = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everyone_group_has_no_reported_members() {
        let organization_id = OrganizationId::new();
        let group = Group::everyone(organization_id);

        assert!(group.is_everyone());
        assert!(group.members().is_empty());
        assert_eq!(group.name(), EVERYONE_GROUP_NAME);
    }

    #[test]
    fn explicit_group_keeps_members() {
        let user_id = UserId::new();
        let group = Group::new(GroupId::new(), OrganizationId::new(), "ops", [user_id])
            .unwrap_or_else(|_| unreachable!());

        assert!(!group.is_everyone());
        assert!(group.members().contains(&user_id));
        assert!(group.into_deleted().is_deleted());
    }
}
