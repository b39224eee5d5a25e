use std::sync::Arc;

use assetkeep_application::{
    AccessGate, AuditRepository, AuthorizationRepository, AuthorizationService,
    PermissionRepository, PermissionService, ProvisioningService, RoleRepository, RoleService,
    UserAccessRepository, UserAccessService, UserDirectory, UserService,
};
use assetkeep_infrastructure::{
    PostgresAuditRepository, PostgresAuthorizationRepository, PostgresPermissionRepository,
    PostgresRoleRepository, PostgresUserAccessRepository, PostgresUserDirectory,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

/// Port implementations the API services are composed from.
#[derive(Clone)]
pub struct RepositorySet {
    pub authorization_repository: Arc<dyn AuthorizationRepository>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub role_repository: Arc<dyn RoleRepository>,
    pub user_access_repository: Arc<dyn UserAccessRepository>,
    pub permission_repository: Arc<dyn PermissionRepository>,
    pub audit_repository: Arc<dyn AuditRepository>,
}

impl RepositorySet {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            authorization_repository: Arc::new(PostgresAuthorizationRepository::new(pool.clone())),
            user_directory: Arc::new(PostgresUserDirectory::new(pool.clone())),
            role_repository: Arc::new(PostgresRoleRepository::new(pool.clone())),
            user_access_repository: Arc::new(PostgresUserAccessRepository::new(pool.clone())),
            permission_repository: Arc::new(PostgresPermissionRepository::new(pool.clone())),
            audit_repository: Arc::new(PostgresAuditRepository::new(pool.clone())),
        }
    }
}

pub fn build_app_state(pool: &PgPool, config: &ApiConfig) -> AppState {
    assemble_app_state(
        RepositorySet::postgres(pool),
        config.frontend_url.clone(),
        config.bootstrap_token.clone(),
    )
}

pub fn build_provisioning_service(pool: &PgPool) -> ProvisioningService {
    let repositories = RepositorySet::postgres(pool);
    ProvisioningService::new(
        repositories.permission_repository,
        repositories.role_repository,
        repositories.user_access_repository,
    )
}

pub fn assemble_app_state(
    repositories: RepositorySet,
    frontend_url: String,
    bootstrap_token: String,
) -> AppState {
    let authorization_service = AuthorizationService::new(
        repositories.authorization_repository.clone(),
        repositories.user_directory.clone(),
    );
    let gate = AccessGate::new(authorization_service.clone());

    AppState {
        role_service: RoleService::new(
            gate.clone(),
            repositories.role_repository.clone(),
            repositories.audit_repository.clone(),
        ),
        user_access_service: UserAccessService::new(
            gate.clone(),
            repositories.user_access_repository.clone(),
            repositories.authorization_repository.clone(),
            repositories.user_directory.clone(),
            repositories.audit_repository.clone(),
        ),
        user_service: UserService::new(
            gate.clone(),
            repositories.user_directory.clone(),
            repositories.role_repository.clone(),
            repositories.user_access_repository.clone(),
            repositories.authorization_repository.clone(),
            repositories.audit_repository.clone(),
        ),
        permission_service: PermissionService::new(
            gate,
            repositories.permission_repository.clone(),
        ),
        authorization_service,
        user_directory: repositories.user_directory,
        frontend_url,
        bootstrap_token,
    }
}
