use std::collections::BTreeSet;
use std::sync::Arc;

use assetkeep_core::{AppError, AppResult};
use assetkeep_domain::{AuditAction, Permission, RoleName, UserId};

use crate::{
    AccessGate, AuditEvent, AuditRepository, AuthorizationRepository, EffectivePermissions,
    UserAccessRepository, UserContext, UserDirectory,
};

/// Per-source breakdown of a user's permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPermissionBreakdown {
    /// Target user.
    pub user_id: UserId,
    /// Roles held by the user.
    pub roles: BTreeSet<RoleName>,
    /// Permissions granted directly.
    pub direct: BTreeSet<Permission>,
    /// Permissions inherited through roles.
    pub role_derived: BTreeSet<Permission>,
    /// Union of direct and role-derived permissions.
    pub all: BTreeSet<Permission>,
}

/// Application service for user-to-role and user-to-permission administration.
///
/// User and permission identifiers arrive in transport form and are parsed only
/// after the access check passes.
#[derive(Clone)]
pub struct UserAccessService {
    gate: AccessGate,
    repository: Arc<dyn UserAccessRepository>,
    authorization_repository: Arc<dyn AuthorizationRepository>,
    user_directory: Arc<dyn UserDirectory>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl UserAccessService {
    /// Creates a new user access service.
    #[must_use]
    pub fn new(
        gate: AccessGate,
        repository: Arc<dyn UserAccessRepository>,
        authorization_repository: Arc<dyn AuthorizationRepository>,
        user_directory: Arc<dyn UserDirectory>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            gate,
            repository,
            authorization_repository,
            user_directory,
            audit_repository,
        }
    }

    /// Assigns a role to a user.
    pub async fn assign_role(
        &self,
        actor: Option<&UserContext>,
        user_id: &str,
        role_name: &str,
    ) -> AppResult<()> {
        let actor = self.gate.require(actor, Permission::RolesAssign).await?;

        let user_id = UserId::parse(user_id)?;
        let role_name = RoleName::new(role_name)?;
        self.repository.assign_role(user_id, &role_name).await?;
        actor.invalidate_if_user(user_id).await;

        self.append_user_event(
            actor,
            AuditAction::UserRoleAssigned,
            user_id,
            format!("assigned role '{role_name}' to user '{user_id}'"),
        )
        .await
    }

    /// Removes a role from a user.
    pub async fn remove_role(
        &self,
        actor: Option<&UserContext>,
        user_id: &str,
        role_name: &str,
    ) -> AppResult<()> {
        let actor = self.gate.require(actor, Permission::RolesRevoke).await?;

        let user_id = UserId::parse(user_id)?;
        let role_name = RoleName::new(role_name)?;
        self.repository.remove_role(user_id, &role_name).await?;
        actor.invalidate_if_user(user_id).await;

        self.append_user_event(
            actor,
            AuditAction::UserRoleRemoved,
            user_id,
            format!("removed role '{role_name}' from user '{user_id}'"),
        )
        .await
    }

    /// Replaces every role held by a user.
    pub async fn sync_roles(
        &self,
        actor: Option<&UserContext>,
        user_id: &str,
        role_names: &[String],
    ) -> AppResult<()> {
        self.gate.require(actor, Permission::RolesAssign).await?;
        let actor = self.gate.require(actor, Permission::RolesRevoke).await?;

        let user_id = UserId::parse(user_id)?;
        let role_names = role_names
            .iter()
            .map(|value| RoleName::new(value.as_str()))
            .collect::<AppResult<BTreeSet<_>>>()?
            .into_iter()
            .collect::<Vec<_>>();

        self.repository.replace_roles(user_id, &role_names).await?;
        actor.invalidate_if_user(user_id).await;

        let listed = role_names
            .iter()
            .map(RoleName::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        self.append_user_event(
            actor,
            AuditAction::UserRoleAssigned,
            user_id,
            format!("set roles of user '{user_id}' to [{listed}]"),
        )
        .await
    }

    /// Grants a permission directly to a user.
    pub async fn grant_permission(
        &self,
        actor: Option<&UserContext>,
        user_id: &str,
        permission: &str,
    ) -> AppResult<()> {
        let actor = self.gate.require(actor, Permission::PermissionsAssign).await?;

        let user_id = UserId::parse(user_id)?;
        let permission = Permission::from_transport(permission)?;
        self.repository
            .grant_permissions(user_id, &[permission])
            .await?;
        actor.invalidate_if_user(user_id).await;

        self.append_user_event(
            actor,
            AuditAction::UserPermissionGranted,
            user_id,
            format!("granted '{permission}' to user '{user_id}'"),
        )
        .await
    }

    /// Grants a batch of permission identifiers to a user.
    ///
    /// Every identifier is checked against the registry before anything is
    /// written; one unknown identifier rejects the whole batch.
    pub async fn bulk_grant(
        &self,
        actor: Option<&UserContext>,
        user_id: &str,
        identifiers: &[String],
    ) -> AppResult<Vec<Permission>> {
        let actor = self.gate.require(actor, Permission::PermissionsAssign).await?;

        let user_id = UserId::parse(user_id)?;
        let mut permissions = BTreeSet::new();
        let mut unknown = Vec::new();
        for identifier in identifiers {
            match Permission::from_transport(identifier) {
                Ok(permission) => {
                    permissions.insert(permission);
                }
                Err(_) => unknown.push(identifier.trim().to_owned()),
            }
        }

        if !unknown.is_empty() {
            return Err(AppError::Validation(format!(
                "unknown permissions: {}",
                unknown.join(", ")
            )));
        }

        let permissions = permissions.into_iter().collect::<Vec<_>>();
        self.repository
            .grant_permissions(user_id, &permissions)
            .await?;
        actor.invalidate_if_user(user_id).await;

        self.append_user_event(
            actor,
            AuditAction::UserPermissionGranted,
            user_id,
            format!(
                "granted {} permissions to user '{user_id}'",
                permissions.len()
            ),
        )
        .await?;

        Ok(permissions)
    }

    /// Revokes a direct permission from a user.
    pub async fn revoke_permission(
        &self,
        actor: Option<&UserContext>,
        user_id: &str,
        permission: &str,
    ) -> AppResult<()> {
        let actor = self.gate.require(actor, Permission::PermissionsRevoke).await?;

        let user_id = UserId::parse(user_id)?;
        let permission = Permission::from_transport(permission)?;
        self.repository
            .revoke_permission(user_id, permission)
            .await?;
        actor.invalidate_if_user(user_id).await;

        self.append_user_event(
            actor,
            AuditAction::UserPermissionRevoked,
            user_id,
            format!("revoked '{permission}' from user '{user_id}'"),
        )
        .await
    }

    /// Returns the direct, role-derived and combined permissions of a user.
    pub async fn user_permissions(
        &self,
        actor: Option<&UserContext>,
        user_id: &str,
    ) -> AppResult<UserPermissionBreakdown> {
        self.gate.require(actor, Permission::PermissionsViewAny).await?;

        let user_id = UserId::parse(user_id)?;
        if self.user_directory.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }

        let direct = self
            .authorization_repository
            .list_direct_permissions(user_id)
            .await?;
        let roles = self
            .authorization_repository
            .list_roles_for_user(user_id)
            .await?;
        let effective = EffectivePermissions::resolve(direct, roles);

        Ok(UserPermissionBreakdown {
            user_id,
            roles: effective.roles().clone(),
            direct: effective.direct().clone(),
            role_derived: effective.role_derived().clone(),
            all: effective.all().clone(),
        })
    }

    async fn append_user_event(
        &self,
        actor: &UserContext,
        action: AuditAction,
        user_id: UserId,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id(),
                action,
                resource_type: "rbac_user".to_owned(),
                resource_id: user_id.to_string(),
                detail: Some(detail),
            })
            .await
    }
}
