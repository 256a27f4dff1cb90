use templar_core::OrganizationId;
use templar_domain::{AclPrincipal, GroupId, TemplateAclEntry, UserId};

/// Declarative template visibility predicate.
///
/// Built once per listing from the actor's roles, memberships and grants so
/// storage adapters can evaluate it in a single query instead of checking
/// templates one by one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateAccessFilter {
    /// Every template matches.
    All,
    /// No template matches.
    Nothing,
    /// Templates owned by one of these organizations match.
    InOrganizations(Vec<OrganizationId>),
    /// Templates with a `use` or `admin` entry for one of these principals match.
    GrantedTo {
        /// Granted users.
        users: Vec<UserId>,
        /// Granted groups, including implicit organization groups.
        groups: Vec<GroupId>,
    },
    /// Every child must match.
    And(Vec<TemplateAccessFilter>),
    /// Any child may match.
    Or(Vec<TemplateAccessFilter>),
}

impl TemplateAccessFilter {
    /// Builds an `Or` node, folding trivial children.
    #[must_use]
    pub fn any_of(nodes: Vec<Self>) -> Self {
        let mut children = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Self::All => return Self::All,
                Self::Nothing => {}
                other => children.push(other),
            }
        }

        match children.len() {
            0 => Self::Nothing,
            1 => children.pop().unwrap_or(Self::Nothing),
            _ => Self::Or(children),
        }
    }

    /// Builds an `And` node, folding trivial children.
    #[must_use]
    pub fn all_of(nodes: Vec<Self>) -> Self {
        let mut children = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Self::Nothing => return Self::Nothing,
                Self::All => {}
                other => children.push(other),
            }
        }

        match children.len() {
            0 => Self::All,
            1 => children.pop().unwrap_or(Self::All),
            _ => Self::And(children),
        }
    }

    /// Evaluates the predicate for one template and its stored entries.
    #[must_use]
    pub fn matches(&self, organization_id: OrganizationId, entries: &[TemplateAclEntry]) -> bool {
        match self {
            Self::All => true,
            Self::Nothing => false,
            Self::InOrganizations(organizations) => organizations.contains(&organization_id),
            Self::GrantedTo { users, groups } => entries.iter().any(|entry| match entry.principal {
                AclPrincipal::User(user_id) => users.contains(&user_id),
                AclPrincipal::Group(group_id) => groups.contains(&group_id),
            }),
            Self::And(nodes) => nodes
                .iter()
                .all(|node| node.matches(organization_id, entries)),
            Self::Or(nodes) => nodes
                .iter()
                .any(|node| node.matches(organization_id, entries)),
        }
    }
}

/// Query inputs for template listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateListQuery {
    /// Optional organization prefilter; `None` lists across organizations.
    pub organization_id: Option<OrganizationId>,
    /// Visibility predicate for the requesting actor.
    pub access: TemplateAccessFilter,
}
