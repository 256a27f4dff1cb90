//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod duration_columns;
mod in_memory_templar_store;
mod postgres_audit_repository;
mod postgres_principal_repository;
mod postgres_template_repository;
mod postgres_workspace_repository;

pub use in_memory_templar_store::InMemoryTemplarStore;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_principal_repository::PostgresPrincipalRepository;
pub use postgres_template_repository::PostgresTemplateRepository;
pub use postgres_workspace_repository::PostgresWorkspaceRepository;
