use std::collections::BTreeSet;

use assetkeep_core::NonEmptyString;
use assetkeep_domain::{Permission, RoleName, UserId, UserStatus};

/// User projection returned by the user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Stable user identifier.
    pub user_id: UserId,
    /// Human-readable user name.
    pub display_name: String,
    /// Optional contact email.
    pub email: Option<String>,
    /// Account status.
    pub status: UserStatus,
}

/// Input payload for registering a user in the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Identifier to register the user under.
    pub user_id: UserId,
    /// Human-readable user name.
    pub display_name: NonEmptyString,
    /// Optional contact email.
    pub email: Option<String>,
    /// Initial account status.
    pub status: UserStatus,
}

/// Validated partial update for a user account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    /// New display name.
    pub display_name: Option<NonEmptyString>,
    /// New contact email.
    pub email: Option<String>,
    /// New account status.
    pub status: Option<UserStatus>,
}

/// Filters for user listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    /// Case-insensitive match against display name and email.
    pub search: Option<String>,
    /// Exact account status.
    pub status: Option<UserStatus>,
}

impl UserQuery {
    /// Returns the normalized search needle, if any.
    #[must_use]
    pub fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase)
    }

    /// Returns whether an account satisfies this query.
    #[must_use]
    pub fn matches(&self, account: &UserAccount) -> bool {
        if self.status.is_some_and(|status| status != account.status) {
            return false;
        }

        match self.needle() {
            Some(needle) => {
                account.display_name.to_lowercase().contains(&needle)
                    || account
                        .email
                        .as_deref()
                        .is_some_and(|email| email.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

/// Role definition returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Stable role identifier.
    pub role_id: String,
    /// Unique role name.
    pub name: RoleName,
    /// Human-readable role label.
    pub display_name: String,
    /// Optional role description.
    pub description: Option<String>,
    /// Indicates a system-managed role.
    pub is_system: bool,
    /// Role grants.
    pub permissions: BTreeSet<Permission>,
}

impl RoleDefinition {
    /// Returns whether the role itself carries the permission.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Role listing row with its holder count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSummary {
    /// Role definition.
    pub role: RoleDefinition,
    /// Number of users holding the role.
    pub user_count: u64,
}

/// Filters for role listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleQuery {
    /// Case-insensitive match against role name and display name.
    pub search: Option<String>,
}

impl RoleQuery {
    /// Returns the normalized search needle, if any.
    #[must_use]
    pub fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase)
    }

    /// Returns whether a role satisfies this query.
    #[must_use]
    pub fn matches(&self, role: &RoleDefinition) -> bool {
        match self.needle() {
            Some(needle) => {
                role.name.as_str().to_lowercase().contains(&needle)
                    || role.display_name.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

/// Validated role payload handed to repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    /// Unique role name.
    pub name: RoleName,
    /// Human-readable role label.
    pub display_name: NonEmptyString,
    /// Optional role description.
    pub description: Option<String>,
    /// Indicates a system-managed role.
    pub is_system: bool,
    /// Initial role grants.
    pub permissions: BTreeSet<Permission>,
}

/// Validated partial update for an existing role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleChanges {
    /// New role name.
    pub name: Option<RoleName>,
    /// New role label.
    pub display_name: Option<NonEmptyString>,
    /// New role description.
    pub description: Option<String>,
    /// Replacement grant set.
    pub permissions: Option<BTreeSet<Permission>>,
}

/// Roles and users that carry one permission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionHolders {
    /// Roles granting the permission.
    pub roles: Vec<RoleName>,
    /// Users holding a direct grant of the permission.
    pub users: Vec<UserAccount>,
}
