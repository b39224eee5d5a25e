use assetkeep_application::{CreateUserInput, UpdateUserInput, UserDetail, UserPermissionBreakdown};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::UserAccountResponse;

/// Incoming payload for user creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-user-request.ts"
)]
pub struct CreateUserRequest {
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl CreateUserRequest {
    pub fn into_input(self) -> CreateUserInput {
        CreateUserInput {
            display_name: self.display_name,
            email: self.email,
            status: self.status,
            roles: self.roles,
        }
    }
}

/// Incoming payload for partial user updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-request.ts"
)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl UpdateUserRequest {
    pub fn into_input(self) -> UpdateUserInput {
        UpdateUserInput {
            display_name: self.display_name,
            email: self.email,
            status: self.status,
        }
    }
}

/// One user with roles and direct grants.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-detail-response.ts"
)]
pub struct UserDetailResponse {
    pub user: UserAccountResponse,
    pub roles: Vec<String>,
    pub direct_permissions: Vec<String>,
}

impl From<UserDetail> for UserDetailResponse {
    fn from(value: UserDetail) -> Self {
        Self {
            user: UserAccountResponse::from(value.account),
            roles: value
                .roles
                .into_iter()
                .map(|role| role.as_str().to_owned())
                .collect(),
            direct_permissions: value
                .direct_permissions
                .into_iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        }
    }
}

/// Incoming payload replacing a user's full role set.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sync-user-roles-request.ts"
)]
pub struct SyncUserRolesRequest {
    pub roles: Vec<String>,
}

/// Breakdown of a user's effective permissions.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-permissions-response.ts"
)]
pub struct UserPermissionsResponse {
    pub user_id: String,
    pub roles: Vec<String>,
    pub direct: Vec<String>,
    pub role_derived: Vec<String>,
    pub all: Vec<String>,
}

impl From<UserPermissionBreakdown> for UserPermissionsResponse {
    fn from(value: UserPermissionBreakdown) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            roles: value
                .roles
                .into_iter()
                .map(|role| role.as_str().to_owned())
                .collect(),
            direct: value
                .direct
                .into_iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
            role_derived: value
                .role_derived
                .into_iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
            all: value
                .all
                .into_iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        }
    }
}
