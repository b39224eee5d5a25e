use assetkeep_application::{
    CreateRoleInput, RoleDefinition, RoleDetail, RoleSummary, UpdateRoleInput,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::UserAccountResponse;

/// Incoming payload for role creation.
///
/// When `categories` is non-empty the role receives every permission of those
/// categories in addition to the explicit `permissions`.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl CreateRoleRequest {
    pub fn into_parts(self) -> (CreateRoleInput, Vec<String>) {
        (
            CreateRoleInput {
                name: self.name,
                display_name: self.display_name,
                description: self.description,
                is_system: self.is_system,
                permissions: self.permissions,
            },
            self.categories,
        )
    }
}

/// Incoming payload for partial role updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

impl UpdateRoleRequest {
    pub fn into_input(self) -> UpdateRoleInput {
        UpdateRoleInput {
            name: self.name,
            display_name: self.display_name,
            description: self.description,
            permissions: self.permissions,
        }
    }
}

/// Incoming payload naming the user a role is assigned to or removed from.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-user-request.ts"
)]
pub struct RoleUserRequest {
    pub user_id: String,
}

/// Incoming payload for attaching a permission to a role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/grant-role-permission-request.ts"
)]
pub struct GrantRolePermissionRequest {
    pub permission: String,
}

/// API representation of a role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub is_system: bool,
    pub permissions: Vec<String>,
}

impl From<RoleDefinition> for RoleResponse {
    fn from(value: RoleDefinition) -> Self {
        Self {
            role_id: value.role_id,
            name: value.name.as_str().to_owned(),
            display_name: value.display_name,
            description: value.description,
            is_system: value.is_system,
            permissions: value
                .permissions
                .into_iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        }
    }
}

/// API representation of a role in listings.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-summary-response.ts"
)]
pub struct RoleSummaryResponse {
    pub role_id: String,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub is_system: bool,
    pub permissions: Vec<String>,
    pub user_count: u64,
}

impl From<RoleSummary> for RoleSummaryResponse {
    fn from(value: RoleSummary) -> Self {
        let role = RoleResponse::from(value.role);
        Self {
            role_id: role.role_id,
            name: role.name,
            display_name: role.display_name,
            description: role.description,
            is_system: role.is_system,
            permissions: role.permissions,
            user_count: value.user_count,
        }
    }
}

/// API representation of one role with its holders.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-detail-response.ts"
)]
pub struct RoleDetailResponse {
    pub role: RoleResponse,
    pub users: Vec<UserAccountResponse>,
}

impl From<RoleDetail> for RoleDetailResponse {
    fn from(value: RoleDetail) -> Self {
        Self {
            role: RoleResponse::from(value.role),
            users: value
                .holders
                .into_iter()
                .map(UserAccountResponse::from)
                .collect(),
        }
    }
}
