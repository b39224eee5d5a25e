use assetkeep_application::{UserAccount, UserContext};
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API representation of a user account.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-account-response.ts"
)]
pub struct UserAccountResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub status: String,
}

impl From<UserAccount> for UserAccountResponse {
    fn from(value: UserAccount) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            display_name: value.display_name,
            email: value.email,
            status: value.status.as_str().to_owned(),
        }
    }
}

/// Authenticated identity with its effective access.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl UserIdentityResponse {
    pub fn from_context(
        context: &UserContext,
        roles: Vec<String>,
        permissions: Vec<String>,
    ) -> Self {
        let account = context.account();
        Self {
            user_id: account.user_id.to_string(),
            display_name: account.display_name.clone(),
            email: account.email.clone(),
            roles,
            permissions,
        }
    }
}
