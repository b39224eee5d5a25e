use std::sync::Arc;

use assetkeep_application::{
    AuthorizationService, PermissionService, RoleService, UserAccessService, UserDirectory,
    UserService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub role_service: RoleService,
    pub user_access_service: UserAccessService,
    pub user_service: UserService,
    pub permission_service: PermissionService,
    pub user_directory: Arc<dyn UserDirectory>,
    pub frontend_url: String,
    pub bootstrap_token: String,
}
