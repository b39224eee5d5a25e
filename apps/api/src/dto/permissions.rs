use assetkeep_application::PermissionDetail;
use assetkeep_domain::Permission;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::UserAccountResponse;

/// API representation of a registry permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub category: String,
}

impl From<Permission> for PermissionResponse {
    fn from(value: Permission) -> Self {
        Self {
            name: value.as_str().to_owned(),
            display_name: value.display_name().to_owned(),
            description: value.description().to_owned(),
            category: value.category().to_owned(),
        }
    }
}

/// Permissions sharing one category.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-category-response.ts"
)]
pub struct PermissionCategoryResponse {
    pub category: String,
    pub permissions: Vec<PermissionResponse>,
}

/// API representation of one permission with the roles and users holding it.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-detail-response.ts"
)]
pub struct PermissionDetailResponse {
    pub permission: PermissionResponse,
    pub roles: Vec<String>,
    pub users: Vec<UserAccountResponse>,
}

impl From<PermissionDetail> for PermissionDetailResponse {
    fn from(value: PermissionDetail) -> Self {
        Self {
            permission: PermissionResponse::from(value.permission),
            roles: value
                .holders
                .roles
                .into_iter()
                .map(|role| role.as_str().to_owned())
                .collect(),
            users: value
                .holders
                .users
                .into_iter()
                .map(UserAccountResponse::from)
                .collect(),
        }
    }
}

/// Incoming payload naming the user a direct permission is granted to or revoked from.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-permission-request.ts"
)]
pub struct UserPermissionRequest {
    pub user_id: String,
}

/// Incoming payload for granting several direct permissions at once.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bulk-assign-permissions-request.ts"
)]
pub struct BulkAssignPermissionsRequest {
    pub user_id: String,
    pub permissions: Vec<String>,
}

/// Result of a bulk direct grant.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bulk-assign-permissions-response.ts"
)]
pub struct BulkAssignPermissionsResponse {
    pub user_id: String,
    pub granted: Vec<String>,
}
