mod records;
mod repositories;

pub use records::{
    NewRole, NewUser, PermissionHolders, RoleChanges, RoleDefinition, RoleQuery, RoleSummary,
    UserAccount, UserChanges, UserQuery,
};
pub use repositories::{
    AuthorizationRepository, PermissionRepository, RoleRepository, UserAccessRepository,
    UserDirectory,
};
