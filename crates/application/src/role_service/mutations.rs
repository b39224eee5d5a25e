use super::*;

use crate::{NewRole, RoleChanges};

impl RoleService {
    /// Creates a role and emits an audit event.
    pub async fn create_role(
        &self,
        actor: Option<&UserContext>,
        input: CreateRoleInput,
    ) -> AppResult<RoleDefinition> {
        let actor = self.gate.require(actor, Permission::RolesCreate).await?;

        if input.is_system {
            self.require_super_administrator(
                actor,
                "only a super administrator may create system roles",
            )
            .await?;
        }

        let role = self
            .repository
            .create_role(NewRole {
                name: RoleName::new(input.name)?,
                display_name: validate_display_name(input.display_name)?,
                description: validate_description(input.description)?,
                is_system: input.is_system,
                permissions: permission_set(&input.permissions)?,
            })
            .await?;

        self.append_role_event(
            actor,
            AuditAction::RoleCreated,
            &role.name,
            format!(
                "created role '{}' with {} permissions",
                role.name,
                role.permissions.len()
            ),
        )
        .await?;

        Ok(role)
    }

    /// Creates a role granting every permission in the given categories.
    pub async fn create_role_from_categories(
        &self,
        actor: Option<&UserContext>,
        mut input: CreateRoleInput,
        categories: &[String],
    ) -> AppResult<RoleDefinition> {
        self.gate.require(actor, Permission::RolesCreate).await?;

        let known = Permission::categories();
        let mut requested = Vec::with_capacity(categories.len());
        for category in categories {
            let category = category.trim();
            match known.iter().copied().find(|value| *value == category) {
                Some(value) => requested.push(value),
                None => {
                    return Err(AppError::Validation(format!(
                        "unknown permission category '{category}'"
                    )));
                }
            }
        }

        input.permissions.extend(
            Permission::in_categories(&requested)
                .into_iter()
                .map(|permission| permission.as_str().to_owned()),
        );

        self.create_role(actor, input).await
    }

    /// Renames, relabels or replaces the grants of a role.
    pub async fn update_role(
        &self,
        actor: Option<&UserContext>,
        role_name: &str,
        input: UpdateRoleInput,
    ) -> AppResult<RoleDefinition> {
        let actor = self.gate.require(actor, Permission::RolesUpdate).await?;

        let role_name = RoleName::new(role_name)?;
        let current = self.load_role(&role_name).await?;
        self.guard_system_role(actor, &current).await?;

        if current.name.is_super_administrator()
            && input
                .name
                .as_deref()
                .is_some_and(|name| name.trim() != current.name.as_str())
        {
            return Err(AppError::Conflict(format!(
                "role '{role_name}' cannot be renamed"
            )));
        }

        let changes = RoleChanges {
            name: input.name.map(RoleName::new).transpose()?,
            display_name: input.display_name.map(validate_display_name).transpose()?,
            description: validate_description(input.description)?,
            permissions: input
                .permissions
                .as_deref()
                .map(permission_set)
                .transpose()?,
        };

        let role = self.repository.update_role(&role_name, changes).await?;
        actor.invalidate_permissions().await;

        let detail = if role.name == role_name {
            format!("updated role '{role_name}'")
        } else {
            format!("renamed role '{role_name}' to '{}'", role.name)
        };
        self.append_role_event(actor, AuditAction::RoleUpdated, &role.name, detail)
            .await?;

        Ok(role)
    }

    /// Deletes a non-system role nobody holds.
    pub async fn delete_role(&self, actor: Option<&UserContext>, role_name: &str) -> AppResult<()> {
        let actor = self.gate.require(actor, Permission::RolesDelete).await?;

        let role_name = RoleName::new(role_name)?;
        let role = self.load_role(&role_name).await?;
        if role.is_system {
            return Err(AppError::Conflict(format!(
                "system role '{role_name}' cannot be deleted"
            )));
        }

        self.repository.delete_role(&role_name).await?;

        self.append_role_event(
            actor,
            AuditAction::RoleDeleted,
            &role_name,
            format!("deleted role '{role_name}'"),
        )
        .await
    }

    /// Deletes any role nobody holds, system roles included.
    ///
    /// Reserved for super administrators.
    pub async fn force_delete_role(
        &self,
        actor: Option<&UserContext>,
        role_name: &str,
    ) -> AppResult<()> {
        let actor = self.gate.require(actor, Permission::RolesDelete).await?;
        self.require_super_administrator(actor, "only a super administrator may force delete roles")
            .await?;

        let role_name = RoleName::new(role_name)?;
        let role = self.load_role(&role_name).await?;
        if role.name.is_super_administrator() {
            return Err(AppError::Conflict(format!(
                "role '{role_name}' cannot be deleted"
            )));
        }

        self.repository.delete_role(&role_name).await?;

        self.append_role_event(
            actor,
            AuditAction::RoleDeleted,
            &role_name,
            format!("force deleted role '{role_name}' (system: {})", role.is_system),
        )
        .await
    }

    /// Attaches a permission to a role.
    pub async fn grant_permission(
        &self,
        actor: Option<&UserContext>,
        role_name: &str,
        permission: &str,
    ) -> AppResult<()> {
        let actor = self.gate.require(actor, Permission::PermissionsAssign).await?;

        let role_name = RoleName::new(role_name)?;
        let permission = Permission::from_transport(permission)?;
        let role = self.load_role(&role_name).await?;
        self.guard_system_role(actor, &role).await?;

        self.repository
            .grant_role_permission(&role_name, permission)
            .await?;
        actor.invalidate_permissions().await;

        self.append_role_event(
            actor,
            AuditAction::RolePermissionGranted,
            &role_name,
            format!("granted '{permission}' to role '{role_name}'"),
        )
        .await
    }

    /// Detaches a permission from a role.
    pub async fn revoke_permission(
        &self,
        actor: Option<&UserContext>,
        role_name: &str,
        permission: &str,
    ) -> AppResult<()> {
        let actor = self.gate.require(actor, Permission::PermissionsRevoke).await?;

        let role_name = RoleName::new(role_name)?;
        let permission = Permission::from_transport(permission)?;
        let role = self.load_role(&role_name).await?;
        self.guard_system_role(actor, &role).await?;

        self.repository
            .revoke_role_permission(&role_name, permission)
            .await?;
        actor.invalidate_permissions().await;

        self.append_role_event(
            actor,
            AuditAction::RolePermissionRevoked,
            &role_name,
            format!("revoked '{permission}' from role '{role_name}'"),
        )
        .await
    }
}
