use std::sync::Arc;

use assetkeep_core::{AppResult, NonEmptyString};
use assetkeep_domain::{Permission, SystemRole, UserId};
use tracing::info;

use crate::{NewRole, PermissionRepository, RoleRepository, UserAccessRepository};

/// Counts of catalog rows written by one provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisioningReport {
    /// Registry permissions upserted.
    pub permissions: usize,
    /// System roles upserted.
    pub system_roles: usize,
}

/// Seeds the permission catalog and the system roles.
#[derive(Clone)]
pub struct ProvisioningService {
    permission_repository: Arc<dyn PermissionRepository>,
    role_repository: Arc<dyn RoleRepository>,
    user_access_repository: Arc<dyn UserAccessRepository>,
}

impl ProvisioningService {
    /// Creates a new provisioning service.
    #[must_use]
    pub fn new(
        permission_repository: Arc<dyn PermissionRepository>,
        role_repository: Arc<dyn RoleRepository>,
        user_access_repository: Arc<dyn UserAccessRepository>,
    ) -> Self {
        Self {
            permission_repository,
            role_repository,
            user_access_repository,
        }
    }

    /// Upserts every registry permission and every system role bundle.
    ///
    /// Safe to run repeatedly.
    pub async fn provision(&self) -> AppResult<ProvisioningReport> {
        let permissions = Permission::all();
        self.permission_repository
            .sync_registry(permissions)
            .await?;

        for system_role in SystemRole::all() {
            let role = self
                .role_repository
                .upsert_system_role(NewRole {
                    name: system_role.role_name()?,
                    display_name: NonEmptyString::new(system_role.display_name())?,
                    description: Some(system_role.description().to_owned()),
                    is_system: true,
                    permissions: system_role.permissions().into_iter().collect(),
                })
                .await?;

            info!(
                role = role.name.as_str(),
                permissions = role.permissions.len(),
                "provisioned system role"
            );
        }

        Ok(ProvisioningReport {
            permissions: permissions.len(),
            system_roles: SystemRole::all().len(),
        })
    }

    /// Grants the super administrator role to an existing user.
    pub async fn bootstrap_super_administrator(&self, user_id: UserId) -> AppResult<()> {
        let role_name = SystemRole::SuperAdministrator.role_name()?;
        self.user_access_repository
            .assign_role(user_id, &role_name)
            .await?;

        info!(user_id = %user_id, "granted super administrator role");
        Ok(())
    }
}
