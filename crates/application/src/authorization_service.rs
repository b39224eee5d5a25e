use std::collections::BTreeSet;
use std::sync::Arc;

use assetkeep_core::{AppError, AppResult};
use assetkeep_domain::{Permission, RoleName, UserId};

use crate::{AuthorizationRepository, RoleDefinition, UserDirectory};

mod context;

pub use context::UserContext;

/// Resolved permission sets for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePermissions {
    direct: BTreeSet<Permission>,
    role_derived: BTreeSet<Permission>,
    all: BTreeSet<Permission>,
    roles: BTreeSet<RoleName>,
}

impl EffectivePermissions {
    /// Unions direct grants with the grants of every held role.
    #[must_use]
    pub fn resolve(direct: Vec<Permission>, roles: Vec<RoleDefinition>) -> Self {
        let direct: BTreeSet<Permission> = direct.into_iter().collect();
        let mut role_derived = BTreeSet::new();
        let mut role_names = BTreeSet::new();

        for role in roles {
            role_derived.extend(role.permissions);
            role_names.insert(role.name);
        }

        let all = direct.union(&role_derived).copied().collect();

        Self {
            direct,
            role_derived,
            all,
            roles: role_names,
        }
    }

    /// Returns whether the permission is part of the effective set.
    #[must_use]
    pub fn contains(&self, permission: Permission) -> bool {
        self.all.contains(&permission)
    }

    /// Returns permissions granted directly to the user.
    #[must_use]
    pub fn direct(&self) -> &BTreeSet<Permission> {
        &self.direct
    }

    /// Returns permissions inherited through held roles.
    #[must_use]
    pub fn role_derived(&self) -> &BTreeSet<Permission> {
        &self.role_derived
    }

    /// Returns the deduplicated union of direct and role-derived grants.
    #[must_use]
    pub fn all(&self) -> &BTreeSet<Permission> {
        &self.all
    }

    /// Returns the names of roles held by the user.
    #[must_use]
    pub fn roles(&self) -> &BTreeSet<RoleName> {
        &self.roles
    }
}

/// Application service answering permission and role checks for users.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
    user_directory: Arc<dyn UserDirectory>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AuthorizationRepository>,
        user_directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            repository,
            user_directory,
        }
    }

    /// Loads a fresh request-scoped context for an existing user.
    pub async fn user_context(&self, user_id: UserId) -> AppResult<UserContext> {
        let account = self
            .user_directory
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        Ok(UserContext::new(account))
    }

    /// Returns the effective permission set, computing it once per context.
    pub async fn effective_permissions(
        &self,
        user: &UserContext,
    ) -> AppResult<Arc<EffectivePermissions>> {
        let mut memo = user.memo().lock().await;
        if let Some(effective) = memo.as_ref() {
            return Ok(Arc::clone(effective));
        }

        let user_id = user.user_id();
        let direct = self.repository.list_direct_permissions(user_id).await?;
        let roles = self.repository.list_roles_for_user(user_id).await?;
        let effective = Arc::new(EffectivePermissions::resolve(direct, roles));

        *memo = Some(Arc::clone(&effective));
        Ok(effective)
    }

    /// Returns whether the user currently has the permission.
    pub async fn has_permission(
        &self,
        user: &UserContext,
        permission: Permission,
    ) -> AppResult<bool> {
        Ok(self.effective_permissions(user).await?.contains(permission))
    }

    /// Returns whether the user has at least one of the permissions.
    pub async fn has_any_permission(
        &self,
        user: &UserContext,
        permissions: &[Permission],
    ) -> AppResult<bool> {
        for permission in permissions {
            if self.has_permission(user, *permission).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Returns whether the user has every one of the permissions.
    pub async fn has_all_permissions(
        &self,
        user: &UserContext,
        permissions: &[Permission],
    ) -> AppResult<bool> {
        for permission in permissions {
            if !self.has_permission(user, *permission).await? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Returns whether the user holds the named role.
    pub async fn has_role(&self, user: &UserContext, role_name: &RoleName) -> AppResult<bool> {
        Ok(self
            .effective_permissions(user)
            .await?
            .roles()
            .contains(role_name))
    }

    /// Returns whether the user holds the super administrator role.
    pub async fn is_super_administrator(&self, user: &UserContext) -> AppResult<bool> {
        Ok(self
            .effective_permissions(user)
            .await?
            .roles()
            .iter()
            .any(RoleName::is_super_administrator))
    }
}
