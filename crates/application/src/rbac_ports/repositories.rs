use async_trait::async_trait;

use assetkeep_core::AppResult;
use assetkeep_domain::{Permission, RoleName, UserId};

use super::records::{
    NewRole, NewUser, PermissionHolders, RoleChanges, RoleDefinition, RoleQuery, RoleSummary,
    UserAccount, UserChanges, UserQuery,
};

/// Repository port for the edge lookups behind permission resolution.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists permissions granted directly to a user.
    async fn list_direct_permissions(&self, user_id: UserId) -> AppResult<Vec<Permission>>;

    /// Lists roles held by a user, each with its own grants.
    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleDefinition>>;
}

/// Directory port for user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by identifier.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>>;

    /// Lists users matching the query, ordered by display name.
    async fn list_users(&self, query: &UserQuery) -> AppResult<Vec<UserAccount>>;

    /// Registers a user. Fails with `Conflict` when the identifier or email is taken.
    async fn create_user(&self, input: NewUser) -> AppResult<UserAccount>;

    /// Applies a partial update. Fails with `Conflict` when the email is taken.
    async fn update_user(&self, user_id: UserId, changes: UserChanges) -> AppResult<UserAccount>;
}

/// Repository port for role definitions and role grants.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists roles matching the query with holder counts, ordered by name.
    async fn list_roles(&self, query: &RoleQuery) -> AppResult<Vec<RoleSummary>>;

    /// Finds one role with its grants.
    async fn find_role(&self, role_name: &RoleName) -> AppResult<Option<RoleDefinition>>;

    /// Lists users currently holding a role.
    async fn list_role_holders(&self, role_name: &RoleName) -> AppResult<Vec<UserAccount>>;

    /// Creates a role and attaches grants in one transaction.
    async fn create_role(&self, input: NewRole) -> AppResult<RoleDefinition>;

    /// Applies a partial update to a role in one transaction.
    async fn update_role(
        &self,
        role_name: &RoleName,
        changes: RoleChanges,
    ) -> AppResult<RoleDefinition>;

    /// Deletes a role. Fails with `Conflict` while any user holds it.
    async fn delete_role(&self, role_name: &RoleName) -> AppResult<()>;

    /// Attaches a permission to a role. Re-granting is a no-op.
    async fn grant_role_permission(
        &self,
        role_name: &RoleName,
        permission: Permission,
    ) -> AppResult<()>;

    /// Detaches a permission from a role. Missing grants are ignored.
    async fn revoke_role_permission(
        &self,
        role_name: &RoleName,
        permission: Permission,
    ) -> AppResult<()>;

    /// Creates or refreshes a system role, replacing its grants.
    async fn upsert_system_role(&self, input: NewRole) -> AppResult<RoleDefinition>;
}

/// Repository port for user-to-role and user-to-permission edges.
#[async_trait]
pub trait UserAccessRepository: Send + Sync {
    /// Assigns a role to a user. Re-assigning is a no-op.
    async fn assign_role(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()>;

    /// Removes a role from a user. Missing assignments are ignored.
    async fn remove_role(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()>;

    /// Replaces every role held by a user in one transaction.
    async fn replace_roles(&self, user_id: UserId, role_names: &[RoleName]) -> AppResult<()>;

    /// Grants permissions directly to a user in one transaction.
    async fn grant_permissions(&self, user_id: UserId, permissions: &[Permission])
    -> AppResult<()>;

    /// Revokes a direct permission from a user. Missing grants are ignored.
    async fn revoke_permission(&self, user_id: UserId, permission: Permission) -> AppResult<()>;
}

/// Repository port for the persisted permission catalog.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Lists roles and users that carry a permission.
    async fn list_permission_holders(&self, permission: Permission)
    -> AppResult<PermissionHolders>;

    /// Upserts catalog rows for the given permissions.
    async fn sync_registry(&self, permissions: &[Permission]) -> AppResult<()>;
}
