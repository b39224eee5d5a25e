mod common;
mod permissions;
mod roles;
mod users;

pub use common::{HealthResponse, UserAccountResponse, UserIdentityResponse};
pub use permissions::{
    BulkAssignPermissionsRequest, BulkAssignPermissionsResponse, PermissionCategoryResponse,
    PermissionDetailResponse, PermissionResponse, UserPermissionRequest,
};
pub use roles::{
    CreateRoleRequest, GrantRolePermissionRequest, RoleDetailResponse, RoleResponse,
    RoleSummaryResponse, RoleUserRequest, UpdateRoleRequest,
};
pub use users::{
    CreateUserRequest, SyncUserRolesRequest, UpdateUserRequest, UserDetailResponse,
    UserPermissionsResponse,
};
