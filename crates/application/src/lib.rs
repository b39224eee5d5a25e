//! Application services and ports.

#![forbid(unsafe_code)]

mod access_gate;
mod audit_ports;
mod authorization_service;
mod permission_service;
mod provisioning_service;
mod rbac_ports;
mod role_service;
mod user_access_service;
mod user_service;

#[cfg(test)]
mod test_support;

pub use access_gate::{AccessDecision, AccessGate};
pub use audit_ports::{AuditEvent, AuditRepository};
pub use authorization_service::{AuthorizationService, EffectivePermissions, UserContext};
pub use permission_service::{PermissionDetail, PermissionQuery, PermissionService};
pub use provisioning_service::{ProvisioningReport, ProvisioningService};
pub use rbac_ports::{
    AuthorizationRepository, NewRole, NewUser, PermissionHolders, PermissionRepository,
    RoleChanges, RoleDefinition, RoleQuery, RoleRepository, RoleSummary, UserAccessRepository,
    UserAccount, UserChanges, UserDirectory, UserQuery,
};
pub use role_service::{CreateRoleInput, RoleDetail, RoleService, UpdateRoleInput};
pub use user_access_service::{UserAccessService, UserPermissionBreakdown};
pub use user_service::{CreateUserInput, UpdateUserInput, UserDetail, UserService};
