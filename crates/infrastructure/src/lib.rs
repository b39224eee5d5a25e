//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_rbac_repository;
mod postgres_audit_repository;
mod postgres_authorization_repository;
mod postgres_permission_repository;
mod postgres_role_repository;
mod postgres_support;
mod postgres_user_access_repository;
mod postgres_user_directory;

#[cfg(test)]
mod postgres_test_support;

pub use in_memory_rbac_repository::{InMemoryRbacRepository, RecordedAuditEvent};
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_permission_repository::PostgresPermissionRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_user_access_repository::PostgresUserAccessRepository;
pub use postgres_user_directory::PostgresUserDirectory;
