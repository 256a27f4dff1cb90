//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod feature;
mod group;
mod ids;
pub mod schedule;
mod security;
mod template;
mod template_acl;
mod user;
mod workspace;

pub use feature::FeatureSet;
pub use group::{EVERYONE_GROUP_NAME, Group};
pub use ids::{GroupId, TemplateId, UserId, WorkspaceId};
pub use schedule::{TtlRequest, TtlUpdatePlan};
pub use security::{Action, AuditAction, ResourceClass, Role};
pub use template::Template;
pub use template_acl::{AclPrincipal, TemplateAclChange, TemplateAclEntry, TemplateRole};
pub use user::{User, UserStatus};
pub use workspace::Workspace;
