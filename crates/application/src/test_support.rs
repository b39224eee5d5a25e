use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use assetkeep_core::{AppError, AppResult, NonEmptyString};
use assetkeep_domain::{Permission, RoleName, UserId, UserStatus};
use tokio::sync::Mutex;

use crate::{
    AccessGate, AuditEvent, AuditRepository, AuthorizationRepository, AuthorizationService,
    NewRole, NewUser, PermissionHolders, PermissionRepository, PermissionService,
    ProvisioningService, RoleChanges, RoleDefinition, RoleQuery, RoleRepository, RoleService,
    RoleSummary, UserAccessRepository, UserAccessService, UserAccount, UserChanges, UserContext,
    UserDirectory, UserQuery, UserService,
};

#[derive(Default)]
pub(crate) struct FakeAuditRepository {
    pub(crate) events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

#[derive(Default)]
struct FakeState {
    users: BTreeMap<UserId, UserAccount>,
    roles: BTreeMap<RoleName, RoleDefinition>,
    user_roles: BTreeSet<(UserId, RoleName)>,
    user_permissions: BTreeSet<(UserId, Permission)>,
    catalog: BTreeSet<Permission>,
}

impl FakeState {
    fn require_user(&self, user_id: UserId) -> AppResult<()> {
        if self.users.contains_key(&user_id) {
            return Ok(());
        }
        Err(AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    fn require_role(&self, role_name: &RoleName) -> AppResult<()> {
        if self.roles.contains_key(role_name) {
            return Ok(());
        }
        Err(AppError::NotFound(format!("role '{role_name}' does not exist")))
    }
}

/// In-process store backing every port for service tests.
#[derive(Default)]
pub(crate) struct FakeRbacStore {
    state: Mutex<FakeState>,
    failing: AtomicBool,
}

impl FakeRbacStore {
    pub(crate) fn fail_reads(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check_reads(&self) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Internal("edge lookup unavailable".to_owned()));
        }
        Ok(())
    }

    pub(crate) async fn add_user(&self, display_name: &str) -> UserId {
        let user_id = UserId::new();
        self.state.lock().await.users.insert(
            user_id,
            UserAccount {
                user_id,
                display_name: display_name.to_owned(),
                email: None,
                status: UserStatus::Active,
            },
        );
        user_id
    }

    pub(crate) async fn add_role(
        &self,
        name: &str,
        permissions: &[Permission],
        is_system: bool,
    ) -> RoleName {
        let name = RoleName::new(name).unwrap_or_else(|_| unreachable!());
        self.state.lock().await.roles.insert(
            name.clone(),
            RoleDefinition {
                role_id: format!("role-{name}"),
                name: name.clone(),
                display_name: name.to_string(),
                description: None,
                is_system,
                permissions: permissions.iter().copied().collect(),
            },
        );
        name
    }

    pub(crate) async fn assign(&self, user_id: UserId, role_name: &RoleName) {
        self.state
            .lock()
            .await
            .user_roles
            .insert((user_id, role_name.clone()));
    }

    pub(crate) async fn grant_direct(&self, user_id: UserId, permissions: &[Permission]) {
        let mut state = self.state.lock().await;
        for permission in permissions {
            state.user_permissions.insert((user_id, *permission));
        }
    }

    pub(crate) async fn role(&self, name: &str) -> Option<RoleDefinition> {
        let name = RoleName::new(name).ok()?;
        self.state.lock().await.roles.get(&name).cloned()
    }

    pub(crate) async fn role_count(&self) -> usize {
        self.state.lock().await.roles.len()
    }

    pub(crate) async fn direct_grant_count(&self, user_id: UserId) -> usize {
        self.state
            .lock()
            .await
            .user_permissions
            .iter()
            .filter(|(holder, _)| *holder == user_id)
            .count()
    }
}

#[async_trait]
impl AuthorizationRepository for FakeRbacStore {
    async fn list_direct_permissions(&self, user_id: UserId) -> AppResult<Vec<Permission>> {
        self.check_reads()?;
        Ok(self
            .state
            .lock()
            .await
            .user_permissions
            .iter()
            .filter(|(holder, _)| *holder == user_id)
            .map(|(_, permission)| *permission)
            .collect())
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleDefinition>> {
        self.check_reads()?;
        let state = self.state.lock().await;
        Ok(state
            .user_roles
            .iter()
            .filter(|(holder, _)| *holder == user_id)
            .filter_map(|(_, role_name)| state.roles.get(role_name).cloned())
            .collect())
    }
}

#[async_trait]
impl UserDirectory for FakeRbacStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }

    async fn list_users(&self, query: &UserQuery) -> AppResult<Vec<UserAccount>> {
        let state = self.state.lock().await;
        let mut users = state
            .users
            .values()
            .filter(|account| query.matches(account))
            .cloned()
            .collect::<Vec<_>>();
        users.sort_by(|left, right| left.display_name.cmp(&right.display_name));
        Ok(users)
    }

    async fn create_user(&self, input: NewUser) -> AppResult<UserAccount> {
        let mut state = self.state.lock().await;
        let email_taken = input.email.as_ref().is_some_and(|email| {
            state
                .users
                .values()
                .any(|account| account.email.as_ref() == Some(email))
        });
        if state.users.contains_key(&input.user_id) || email_taken {
            return Err(AppError::Conflict(format!(
                "user '{}' already exists",
                input.user_id
            )));
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
        let mut state = self.state.lock().await;
        state.require_user(user_id)?;
        if let Some(email) = changes.email.as_ref() {
            let taken = state.users.values().any(|account| {
                account.user_id != user_id && account.email.as_ref() == Some(email)
            });
            if taken {
                return Err(AppError::Conflict(format!("email '{email}' is already in use")));
            }
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
impl RoleRepository for FakeRbacStore {
    async fn list_roles(&self, query: &RoleQuery) -> AppResult<Vec<RoleSummary>> {
        let state = self.state.lock().await;
        Ok(state
            .roles
            .values()
            .filter(|role| query.matches(role))
            .map(|role| RoleSummary {
                role: role.clone(),
                user_count: state
                    .user_roles
                    .iter()
                    .filter(|(_, held)| *held == role.name)
                    .count() as u64,
            })
            .collect())
    }

    async fn find_role(&self, role_name: &RoleName) -> AppResult<Option<RoleDefinition>> {
        Ok(self.state.lock().await.roles.get(role_name).cloned())
    }

    async fn list_role_holders(&self, role_name: &RoleName) -> AppResult<Vec<UserAccount>> {
        let state = self.state.lock().await;
        Ok(state
            .user_roles
            .iter()
            .filter(|(_, held)| held == role_name)
            .filter_map(|(user_id, _)| state.users.get(user_id).cloned())
            .collect())
    }

    async fn create_role(&self, input: NewRole) -> AppResult<RoleDefinition> {
        let mut state = self.state.lock().await;
        if state.roles.contains_key(&input.name) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                input.name
            )));
        }

        let role = RoleDefinition {
            role_id: format!("role-{}", input.name),
            name: input.name,
            display_name: input.display_name.into(),
            description: input.description,
            is_system: input.is_system,
            permissions: input.permissions,
        };
        state.roles.insert(role.name.clone(), role.clone());
        Ok(role)
    }

    async fn update_role(
        &self,
        role_name: &RoleName,
        changes: RoleChanges,
    ) -> AppResult<RoleDefinition> {
        let mut state = self.state.lock().await;
        let mut role = state
            .roles
            .get(role_name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' does not exist")))?;

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
        state.roles.insert(role.name.clone(), role.clone());
        if role.name != *role_name {
            let moved = state
                .user_roles
                .iter()
                .filter(|(_, held)| held == role_name)
                .map(|(user_id, _)| *user_id)
                .collect::<Vec<_>>();
            for user_id in moved {
                state.user_roles.remove(&(user_id, role_name.clone()));
                state.user_roles.insert((user_id, role.name.clone()));
            }
        }

        Ok(role)
    }

    async fn delete_role(&self, role_name: &RoleName) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.require_role(role_name)?;
        if state.user_roles.iter().any(|(_, held)| held == role_name) {
            return Err(AppError::Conflict(format!(
                "role '{role_name}' is still assigned to users"
            )));
        }

        state.roles.remove(role_name);
        Ok(())
    }

    async fn grant_role_permission(
        &self,
        role_name: &RoleName,
        permission: Permission,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let role = state
            .roles
            .get_mut(role_name)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' does not exist")))?;
        role.permissions.insert(permission);
        Ok(())
    }

    async fn revoke_role_permission(
        &self,
        role_name: &RoleName,
        permission: Permission,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let role = state
            .roles
            .get_mut(role_name)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' does not exist")))?;
        role.permissions.remove(&permission);
        Ok(())
    }

    async fn upsert_system_role(&self, input: NewRole) -> AppResult<RoleDefinition> {
        let mut state = self.state.lock().await;
        let role = RoleDefinition {
            role_id: format!("role-{}", input.name),
            name: input.name,
            display_name: input.display_name.into(),
            description: input.description,
            is_system: true,
            permissions: input.permissions,
        };
        state.roles.insert(role.name.clone(), role.clone());
        Ok(role)
    }
}

#[async_trait]
impl UserAccessRepository for FakeRbacStore {
    async fn assign_role(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.require_user(user_id)?;
        state.require_role(role_name)?;
        state.user_roles.insert((user_id, role_name.clone()));
        Ok(())
    }

    async fn remove_role(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.require_user(user_id)?;
        state.require_role(role_name)?;
        state.user_roles.remove(&(user_id, role_name.clone()));
        Ok(())
    }

    async fn replace_roles(&self, user_id: UserId, role_names: &[RoleName]) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.require_user(user_id)?;
        for role_name in role_names {
            state.require_role(role_name)?;
        }

        state.user_roles.retain(|(holder, _)| *holder != user_id);
        for role_name in role_names {
            state.user_roles.insert((user_id, role_name.clone()));
        }
        Ok(())
    }

    async fn grant_permissions(
        &self,
        user_id: UserId,
        permissions: &[Permission],
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.require_user(user_id)?;
        for permission in permissions {
            state.user_permissions.insert((user_id, *permission));
        }
        Ok(())
    }

    async fn revoke_permission(&self, user_id: UserId, permission: Permission) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.require_user(user_id)?;
        state.user_permissions.remove(&(user_id, permission));
        Ok(())
    }
}

#[async_trait]
impl PermissionRepository for FakeRbacStore {
    async fn list_permission_holders(
        &self,
        permission: Permission,
    ) -> AppResult<PermissionHolders> {
        let state = self.state.lock().await;
        Ok(PermissionHolders {
            roles: state
                .roles
                .values()
                .filter(|role| role.has_permission(permission))
                .map(|role| role.name.clone())
                .collect(),
            users: state
                .user_permissions
                .iter()
                .filter(|(_, granted)| *granted == permission)
                .filter_map(|(user_id, _)| state.users.get(user_id).cloned())
                .collect(),
        })
    }

    async fn sync_registry(&self, permissions: &[Permission]) -> AppResult<()> {
        self.state
            .lock()
            .await
            .catalog
            .extend(permissions.iter().copied());
        Ok(())
    }
}

/// Wires every service against one fake store.
pub(crate) struct Harness {
    pub(crate) store: Arc<FakeRbacStore>,
    pub(crate) audit: Arc<FakeAuditRepository>,
    pub(crate) authorization_service: AuthorizationService,
    pub(crate) gate: AccessGate,
    pub(crate) role_service: RoleService,
    pub(crate) user_access_service: UserAccessService,
    pub(crate) user_service: UserService,
    pub(crate) permission_service: PermissionService,
    pub(crate) provisioning_service: ProvisioningService,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let store = Arc::new(FakeRbacStore::default());
        let audit = Arc::new(FakeAuditRepository::default());
        let authorization_service = AuthorizationService::new(store.clone(), store.clone());
        let gate = AccessGate::new(authorization_service.clone());

        Self {
            role_service: RoleService::new(gate.clone(), store.clone(), audit.clone()),
            user_access_service: UserAccessService::new(
                gate.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                audit.clone(),
            ),
            user_service: UserService::new(
                gate.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                audit.clone(),
            ),
            permission_service: PermissionService::new(gate.clone(), store.clone()),
            provisioning_service: ProvisioningService::new(
                store.clone(),
                store.clone(),
                store.clone(),
            ),
            authorization_service,
            gate,
            store,
            audit,
        }
    }

    pub(crate) async fn context(&self, user_id: UserId) -> UserContext {
        self.authorization_service
            .user_context(user_id)
            .await
            .unwrap_or_else(|error| panic!("failed to load user context: {error}"))
    }

    /// Creates a user holding the given direct permissions.
    pub(crate) async fn actor_with(&self, permissions: &[Permission]) -> UserContext {
        let user_id = self.store.add_user("Actor").await;
        self.store.grant_direct(user_id, permissions).await;
        self.context(user_id).await
    }

    /// Creates a user holding the super administrator role.
    pub(crate) async fn super_administrator(&self) -> UserContext {
        let role = self
            .store
            .add_role("super_administrator", Permission::all(), true)
            .await;
        let user_id = self.store.add_user("Root").await;
        self.store.assign(user_id, &role).await;
        self.context(user_id).await
    }
}

pub(crate) fn display_name(value: &str) -> NonEmptyString {
    NonEmptyString::new(value).unwrap_or_else(|_| unreachable!())
}
