use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use assetkeep_application::{
    AuditEvent, AuditRepository, AuthorizationRepository, NewRole, NewUser, PermissionHolders,
    PermissionRepository, RoleChanges, RoleDefinition, RoleQuery, RoleRepository, RoleSummary,
    UserAccessRepository, UserAccount, UserChanges, UserDirectory, UserQuery,
};
use assetkeep_core::{AppError, AppResult};
use assetkeep_domain::{Permission, RoleName, UserId};

/// Audit event kept by the in-memory repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAuditEvent {
    /// Persisted event payload.
    pub event: AuditEvent,
    /// Time the event was appended.
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct RbacState {
    catalog: BTreeSet<Permission>,
    users: BTreeMap<UserId, UserAccount>,
    roles: BTreeMap<RoleName, RoleDefinition>,
    role_grants_at: BTreeMap<(RoleName, Permission), DateTime<Utc>>,
    user_roles: BTreeMap<(UserId, RoleName), DateTime<Utc>>,
    user_permissions: BTreeMap<(UserId, Permission), DateTime<Utc>>,
    audit_events: Vec<RecordedAuditEvent>,
}

impl RbacState {
    fn require_user(&self, user_id: UserId) -> AppResult<()> {
        if self.users.contains_key(&user_id) {
            return Ok(());
        }
        Err(AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    fn require_free_email(&self, email: &str, owner: Option<UserId>) -> AppResult<()> {
        let taken = self.users.values().any(|account| {
            Some(account.user_id) != owner && account.email.as_deref() == Some(email)
        });
        if taken {
            return Err(AppError::Conflict(format!("email '{email}' is already in use")));
        }
        Ok(())
    }

    fn role_mut(&mut self, role_name: &RoleName) -> AppResult<&mut RoleDefinition> {
        self.roles
            .get_mut(role_name)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' does not exist")))
    }

    fn require_role(&self, role_name: &RoleName) -> AppResult<()> {
        if self.roles.contains_key(role_name) {
            return Ok(());
        }
        Err(AppError::NotFound(format!("role '{role_name}' does not exist")))
    }

    fn holder_count(&self, role_name: &RoleName) -> u64 {
        self.user_roles
            .keys()
            .filter(|(_, held)| held == role_name)
            .count() as u64
    }

    fn set_role_grants(&mut self, role_name: &RoleName, permissions: &BTreeSet<Permission>) {
        let now = Utc::now();
        self.role_grants_at.retain(|(held, _), _| held != role_name);
        for permission in permissions {
            self.role_grants_at
                .insert((role_name.clone(), *permission), now);
        }
    }
}

/// In-memory implementation of every access-control port.
///
/// Each operation takes one write or read lock over the whole state, so
/// multi-row mutations are atomic with respect to each other.
#[derive(Debug, Default)]
pub struct InMemoryRbacRepository {
    state: RwLock<RbacState>,
}

impl InMemoryRbacRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns appended audit events in insertion order.
    pub async fn audit_events(&self) -> Vec<RecordedAuditEvent> {
        self.state.read().await.audit_events.clone()
    }

    /// Returns the permissions written by catalog synchronization.
    pub async fn catalog(&self) -> BTreeSet<Permission> {
        self.state.read().await.catalog.clone()
    }

    /// Returns when a role-to-permission edge was created.
    pub async fn role_permission_granted_at(
        &self,
        role_name: &RoleName,
        permission: Permission,
    ) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .await
            .role_grants_at
            .get(&(role_name.clone(), permission))
            .copied()
    }

    /// Returns when a user-to-role edge was created.
    pub async fn role_assigned_at(
        &self,
        user_id: UserId,
        role_name: &RoleName,
    ) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .await
            .user_roles
            .get(&(user_id, role_name.clone()))
            .copied()
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryRbacRepository {
    async fn list_direct_permissions(&self, user_id: UserId) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        Ok(state
            .user_permissions
            .keys()
            .filter(|(holder, _)| *holder == user_id)
            .map(|(_, permission)| *permission)
            .collect())
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleDefinition>> {
        let state = self.state.read().await;
        Ok(state
            .user_roles
            .keys()
            .filter(|(holder, _)| *holder == user_id)
            .filter_map(|(_, role_name)| state.roles.get(role_name).cloned())
            .collect())
    }
}

#[async_trait]
impl UserDirectory for InMemoryRbacRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn list_users(&self, query: &UserQuery) -> AppResult<Vec<UserAccount>> {
        let state = self.state.read().await;
        let mut users = state
            .users
            .values()
            .filter(|account| query.matches(account))
            .cloned()
            .collect::<Vec<_>>();
        users.sort_by(|left, right| {
            left.display_name
                .to_lowercase()
                .cmp(&right.display_name.to_lowercase())
        });
        Ok(users)
    }

    async fn create_user(&self, input: NewUser) -> AppResult<UserAccount> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&input.user_id) {
            return Err(AppError::Conflict(format!(
                "user '{}' already exists",
                input.user_id
            )));
        }
        if let Some(email) = input.email.as_deref() {
            state.require_free_email(email, None)?;
        }

        let account = UserAccount {
            user_id: input.user_id,
            display_name: input.display_name.into(),
            email: input.email,
            status: input.status,
        };
        state.users.insert(account.user_id, account.clone());
        Ok(account)
    }

    async fn update_user(&self, user_id: UserId, changes: UserChanges) -> AppResult<UserAccount> {
        let mut state = self.state.write().await;
        state.require_user(user_id)?;
        if let Some(email) = changes.email.as_deref() {
            state.require_free_email(email, Some(user_id))?;
        }

        let account = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;
        if let Some(display_name) = changes.display_name {
            account.display_name = display_name.into();
        }
        if let Some(email) = changes.email {
            account.email = Some(email);
        }
        if let Some(status) = changes.status {
            account.status = status;
        }
        Ok(account.clone())
    }
}

#[async_trait]
impl RoleRepository for InMemoryRbacRepository {
    async fn list_roles(&self, query: &RoleQuery) -> AppResult<Vec<RoleSummary>> {
        let state = self.state.read().await;
        Ok(state
            .roles
            .values()
            .filter(|role| query.matches(role))
            .map(|role| RoleSummary {
                role: role.clone(),
                user_count: state.holder_count(&role.name),
            })
            .collect())
    }

    async fn find_role(&self, role_name: &RoleName) -> AppResult<Option<RoleDefinition>> {
        Ok(self.state.read().await.roles.get(role_name).cloned())
    }

    async fn list_role_holders(&self, role_name: &RoleName) -> AppResult<Vec<UserAccount>> {
        let state = self.state.read().await;
        let mut holders = state
            .user_roles
            .keys()
            .filter(|(_, held)| held == role_name)
            .filter_map(|(user_id, _)| state.users.get(user_id).cloned())
            .collect::<Vec<_>>();
        holders.sort_by(|left, right| left.display_name.cmp(&right.display_name));
        Ok(holders)
    }

    async fn create_role(&self, input: NewRole) -> AppResult<RoleDefinition> {
        let mut state = self.state.write().await;
        if state.roles.contains_key(&input.name) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                input.name
            )));
        }

        let role = RoleDefinition {
            role_id: Uuid::new_v4().to_string(),
            name: input.name,
            display_name: input.display_name.into(),
            description: input.description,
            is_system: input.is_system,
            permissions: input.permissions,
        };
        state.set_role_grants(&role.name, &role.permissions);
        state.roles.insert(role.name.clone(), role.clone());
        Ok(role)
    }

    async fn update_role(
        &self,
        role_name: &RoleName,
        changes: RoleChanges,
    ) -> AppResult<RoleDefinition> {
        let mut state = self.state.write().await;
        let mut role = state.role_mut(role_name)?.clone();

        if let Some(name) = changes.name {
            if name != *role_name && state.roles.contains_key(&name) {
                return Err(AppError::Conflict(format!("role '{name}' already exists")));
            }
            role.name = name;
        }
        if let Some(display_name) = changes.display_name {
            role.display_name = display_name.into();
        }
        if let Some(description) = changes.description {
            role.description = Some(description);
        }
        if let Some(permissions) = changes.permissions {
            role.permissions = permissions;
        }

        state.roles.remove(role_name);
        state.role_grants_at.retain(|(held, _), _| held != role_name);
        state.set_role_grants(&role.name, &role.permissions);

        if role.name != *role_name {
            let moved = state
                .user_roles
                .iter()
                .filter(|((_, held), _)| held == role_name)
                .map(|((user_id, _), created_at)| (*user_id, *created_at))
                .collect::<Vec<_>>();
            for (user_id, created_at) in moved {
                state.user_roles.remove(&(user_id, role_name.clone()));
                state
                    .user_roles
                    .insert((user_id, role.name.clone()), created_at);
            }
        }

        state.roles.insert(role.name.clone(), role.clone());
        Ok(role)
    }

    async fn delete_role(&self, role_name: &RoleName) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_role(role_name)?;

        let holders = state.holder_count(role_name);
        if holders > 0 {
            return Err(AppError::Conflict(format!(
                "role '{role_name}' is still assigned to {holders} users"
            )));
        }

        state.roles.remove(role_name);
        state.role_grants_at.retain(|(held, _), _| held != role_name);
        Ok(())
    }

    async fn grant_role_permission(
        &self,
        role_name: &RoleName,
        permission: Permission,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.role_mut(role_name)?.permissions.insert(permission) {
            state
                .role_grants_at
                .insert((role_name.clone(), permission), Utc::now());
        }
        Ok(())
    }

    async fn revoke_role_permission(
        &self,
        role_name: &RoleName,
        permission: Permission,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.role_mut(role_name)?.permissions.remove(&permission);
        state
            .role_grants_at
            .remove(&(role_name.clone(), permission));
        Ok(())
    }

    async fn upsert_system_role(&self, input: NewRole) -> AppResult<RoleDefinition> {
        let mut state = self.state.write().await;
        let role_id = state
            .roles
            .get(&input.name)
            .map(|existing| existing.role_id.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let role = RoleDefinition {
            role_id,
            name: input.name,
            display_name: input.display_name.into(),
            description: input.description,
            is_system: true,
            permissions: input.permissions,
        };
        state.set_role_grants(&role.name, &role.permissions);
        state.roles.insert(role.name.clone(), role.clone());
        Ok(role)
    }
}

#[async_trait]
impl UserAccessRepository for InMemoryRbacRepository {
    async fn assign_role(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_user(user_id)?;
        state.require_role(role_name)?;
        state
            .user_roles
            .entry((user_id, role_name.clone()))
            .or_insert_with(Utc::now);
        Ok(())
    }

    async fn remove_role(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_user(user_id)?;
        state.require_role(role_name)?;
        state.user_roles.remove(&(user_id, role_name.clone()));
        Ok(())
    }

    async fn replace_roles(&self, user_id: UserId, role_names: &[RoleName]) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_user(user_id)?;
        for role_name in role_names {
            state.require_role(role_name)?;
        }

        let previous = std::mem::take(&mut state.user_roles);
        let (mine, others): (BTreeMap<_, _>, BTreeMap<_, _>) = previous
            .into_iter()
            .partition(|((holder, _), _)| *holder == user_id);
        state.user_roles = others;

        for role_name in role_names {
            let key = (user_id, role_name.clone());
            let created_at = mine.get(&key).copied().unwrap_or_else(Utc::now);
            state.user_roles.insert(key, created_at);
        }
        Ok(())
    }

    async fn grant_permissions(
        &self,
        user_id: UserId,
        permissions: &[Permission],
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_user(user_id)?;
        for permission in permissions {
            state
                .user_permissions
                .entry((user_id, *permission))
                .or_insert_with(Utc::now);
        }
        Ok(())
    }

    async fn revoke_permission(&self, user_id: UserId, permission: Permission) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_user(user_id)?;
        state.user_permissions.remove(&(user_id, permission));
        Ok(())
    }
}

#[async_trait]
impl PermissionRepository for InMemoryRbacRepository {
    async fn list_permission_holders(
        &self,
        permission: Permission,
    ) -> AppResult<PermissionHolders> {
        let state = self.state.read().await;
        Ok(PermissionHolders {
            roles: state
                .roles
                .values()
                .filter(|role| role.has_permission(permission))
                .map(|role| role.name.clone())
                .collect(),
            users: state
                .user_permissions
                .keys()
                .filter(|(_, granted)| *granted == permission)
                .filter_map(|(user_id, _)| state.users.get(user_id).cloned())
                .collect(),
        })
    }

    async fn sync_registry(&self, permissions: &[Permission]) -> AppResult<()> {
        self.state
            .write()
            .await
            .catalog
            .extend(permissions.iter().copied());
        Ok(())
    }
}

#[async_trait]
impl AuditRepository for InMemoryRbacRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.write().await.audit_events.push(RecordedAuditEvent {
            event,
            recorded_at: Utc::now(),
        });
        Ok(())
    }
}
