use std::collections::BTreeMap;
use std::sync::Arc;

use assetkeep_core::{AppError, AppResult};
use assetkeep_domain::Permission;

use crate::{AccessGate, PermissionHolders, PermissionRepository, UserContext};

/// Filters for permission listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionQuery {
    /// Case-insensitive match against identifier and display name.
    pub search: Option<String>,
    /// Exact category filter.
    pub category: Option<String>,
}

impl PermissionQuery {
    fn matches(&self, permission: Permission) -> bool {
        let category_matches = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .is_none_or(|category| permission.category() == category);

        let search_matches = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase)
            .is_none_or(|needle| {
                permission.as_str().contains(&needle)
                    || permission.display_name().to_lowercase().contains(&needle)
            });

        category_matches && search_matches
    }
}

/// Permission with the roles and users that carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDetail {
    /// Registry entry.
    pub permission: Permission,
    /// Holders of the permission.
    pub holders: PermissionHolders,
}

/// Application service for read access to the permission registry.
#[derive(Clone)]
pub struct PermissionService {
    gate: AccessGate,
    repository: Arc<dyn PermissionRepository>,
}

impl PermissionService {
    /// Creates a new permission service.
    #[must_use]
    pub fn new(gate: AccessGate, repository: Arc<dyn PermissionRepository>) -> Self {
        Self { gate, repository }
    }

    /// Lists registry permissions ordered by category then identifier.
    pub async fn list_permissions(
        &self,
        actor: Option<&UserContext>,
        query: PermissionQuery,
    ) -> AppResult<Vec<Permission>> {
        self.gate.require(actor, Permission::PermissionsViewAny).await?;

        let mut permissions = Permission::all()
            .iter()
            .copied()
            .filter(|permission| query.matches(*permission))
            .collect::<Vec<_>>();
        permissions.sort_by_key(|permission| (permission.category(), permission.as_str()));

        Ok(permissions)
    }

    /// Returns one permission with the roles and users holding it.
    pub async fn get_permission(
        &self,
        actor: Option<&UserContext>,
        identifier: &str,
    ) -> AppResult<PermissionDetail> {
        self.gate.require(actor, Permission::PermissionsView).await?;

        let permission = Permission::from_transport(identifier)
            .map_err(|_| AppError::NotFound(format!("permission '{identifier}' does not exist")))?;
        let holders = self.repository.list_permission_holders(permission).await?;

        Ok(PermissionDetail {
            permission,
            holders,
        })
    }

    /// Groups registry permissions by category.
    pub async fn permissions_by_category(
        &self,
        actor: Option<&UserContext>,
    ) -> AppResult<BTreeMap<&'static str, Vec<Permission>>> {
        self.gate.require(actor, Permission::PermissionsViewAny).await?;

        let mut grouped: BTreeMap<&'static str, Vec<Permission>> = BTreeMap::new();
        for permission in Permission::all() {
            grouped
                .entry(permission.category())
                .or_default()
                .push(*permission);
        }

        Ok(grouped)
    }

    /// Lists the distinct permission categories.
    pub async fn categories(&self, actor: Option<&UserContext>) -> AppResult<Vec<&'static str>> {
        self.gate.require(actor, Permission::PermissionsViewAny).await?;

        let mut categories = Permission::categories();
        categories.sort_unstable();
        Ok(categories)
    }
}
