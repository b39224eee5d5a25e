/// Stable audit actions emitted by access-control use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when a role is renamed, relabeled or its grants replaced.
    RoleUpdated,
    /// Emitted when a role is deleted.
    RoleDeleted,
    /// Emitted when a permission is attached to a role.
    RolePermissionGranted,
    /// Emitted when a permission is detached from a role.
    RolePermissionRevoked,
    /// Emitted when a user account is created.
    UserCreated,
    /// Emitted when a user account is updated.
    UserUpdated,
    /// Emitted when a role is assigned to a user.
    UserRoleAssigned,
    /// Emitted when a role is removed from a user.
    UserRoleRemoved,
    /// Emitted when a permission is granted directly to a user.
    UserPermissionGranted,
    /// Emitted when a direct permission is revoked from a user.
    UserPermissionRevoked,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleCreated => "rbac.role.created",
            Self::RoleUpdated => "rbac.role.updated",
            Self::RoleDeleted => "rbac.role.deleted",
            Self::RolePermissionGranted => "rbac.role.permission_granted",
            Self::RolePermissionRevoked => "rbac.role.permission_revoked",
            Self::UserCreated => "rbac.user.created",
            Self::UserUpdated => "rbac.user.updated",
            Self::UserRoleAssigned => "rbac.user.role_assigned",
            Self::UserRoleRemoved => "rbac.user.role_removed",
            Self::UserPermissionGranted => "rbac.user.permission_granted",
            Self::UserPermissionRevoked => "rbac.user.permission_revoked",
        }
    }
}
