use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use assetkeep_core::{AppError, AppResult, NonEmptyString};
use assetkeep_domain::{
    AuditAction, Permission, RoleName, USER_DISPLAY_NAME_MAX_LENGTH, UserId, UserStatus,
    normalize_email,
};

use crate::{
    AccessGate, AuditEvent, AuditRepository, AuthorizationRepository, NewUser, RoleRepository,
    UserAccessRepository, UserAccount, UserChanges, UserContext, UserDirectory, UserQuery,
};

const USER_RESOURCE_TYPE: &str = "user";

/// Input payload for creating user accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateUserInput {
    /// Human-readable user name.
    pub display_name: String,
    /// Optional contact email.
    pub email: Option<String>,
    /// Initial status; defaults to `active`.
    pub status: Option<String>,
    /// Roles to assign right away.
    pub roles: Vec<String>,
}

/// Input payload for partially updating a user account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserInput {
    /// New display name.
    pub display_name: Option<String>,
    /// New contact email.
    pub email: Option<String>,
    /// New account status.
    pub status: Option<String>,
}

/// User account with its roles and direct grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetail {
    /// Account projection.
    pub account: UserAccount,
    /// Roles held by the user.
    pub roles: BTreeSet<RoleName>,
    /// Permissions granted directly.
    pub direct_permissions: BTreeSet<Permission>,
}

/// Application service for user account administration.
#[derive(Clone)]
pub struct UserService {
    gate: AccessGate,
    user_directory: Arc<dyn UserDirectory>,
    role_repository: Arc<dyn RoleRepository>,
    access_repository: Arc<dyn UserAccessRepository>,
    authorization_repository: Arc<dyn AuthorizationRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        gate: AccessGate,
        user_directory: Arc<dyn UserDirectory>,
        role_repository: Arc<dyn RoleRepository>,
        access_repository: Arc<dyn UserAccessRepository>,
        authorization_repository: Arc<dyn AuthorizationRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            gate,
            user_directory,
            role_repository,
            access_repository,
            authorization_repository,
            audit_repository,
        }
    }

    /// Lists users, optionally filtered by a search needle and a status.
    pub async fn list_users(
        &self,
        actor: Option<&UserContext>,
        search: Option<String>,
        status: Option<&str>,
    ) -> AppResult<Vec<UserAccount>> {
        self.gate.require(actor, Permission::UsersViewAny).await?;

        let query = UserQuery {
            search,
            status: status.map(UserStatus::from_str).transpose()?,
        };
        self.user_directory.list_users(&query).await
    }

    /// Returns one user with roles and direct grants.
    pub async fn get_user(
        &self,
        actor: Option<&UserContext>,
        user_id: &str,
    ) -> AppResult<UserDetail> {
        self.gate.require(actor, Permission::UsersView).await?;

        let user_id = UserId::parse(user_id)?;
        let account = self.load_user(user_id).await?;
        let roles = self
            .authorization_repository
            .list_roles_for_user(user_id)
            .await?
            .into_iter()
            .map(|role| role.name)
            .collect();
        let direct_permissions = self
            .authorization_repository
            .list_direct_permissions(user_id)
            .await?
            .into_iter()
            .collect();

        Ok(UserDetail {
            account,
            roles,
            direct_permissions,
        })
    }

    /// Creates a user account and assigns the requested roles.
    ///
    /// Assigning roles at creation additionally requires `roles.assign`.
    pub async fn create_user(
        &self,
        actor: Option<&UserContext>,
        input: CreateUserInput,
    ) -> AppResult<UserAccount> {
        let actor = self.gate.require(actor, Permission::UsersCreate).await?;
        if !input.roles.is_empty() {
            self.gate.require(Some(actor), Permission::RolesAssign).await?;
        }

        let display_name = validate_display_name(input.display_name)?;
        let email = input.email.as_deref().map(normalize_email).transpose()?;
        let status = input
            .status
            .as_deref()
            .map(UserStatus::from_str)
            .transpose()?
            .unwrap_or(UserStatus::Active);

        let role_names = input
            .roles
            .iter()
            .map(|value| RoleName::new(value.as_str()))
            .collect::<AppResult<BTreeSet<_>>>()?
            .into_iter()
            .collect::<Vec<_>>();
        for role_name in &role_names {
            if self.role_repository.find_role(role_name).await?.is_none() {
                return Err(AppError::NotFound(format!(
                    "role '{role_name}' does not exist"
                )));
            }
        }

        let account = self
            .user_directory
            .create_user(NewUser {
                user_id: UserId::new(),
                display_name,
                email,
                status,
            })
            .await?;

        if !role_names.is_empty() {
            self.access_repository
                .replace_roles(account.user_id, &role_names)
                .await?;
        }

        self.append_user_event(
            actor,
            AuditAction::UserCreated,
            account.user_id,
            format!(
                "created user '{}' with {} roles",
                account.user_id,
                role_names.len()
            ),
        )
        .await?;

        Ok(account)
    }

    /// Updates the display name, email or status of a user.
    pub async fn update_user(
        &self,
        actor: Option<&UserContext>,
        user_id: &str,
        input: UpdateUserInput,
    ) -> AppResult<UserAccount> {
        let actor = self.gate.require(actor, Permission::UsersUpdate).await?;

        let user_id = UserId::parse(user_id)?;
        let changes = UserChanges {
            display_name: input.display_name.map(validate_display_name).transpose()?,
            email: input.email.as_deref().map(normalize_email).transpose()?,
            status: input
                .status
                .as_deref()
                .map(UserStatus::from_str)
                .transpose()?,
        };

        if user_id == actor.user_id() && changes.status.is_some_and(|status| !status.is_active()) {
            return Err(AppError::Validation(
                "users cannot deactivate their own account".to_owned(),
            ));
        }

        let previous = self.load_user(user_id).await?;
        let account = self.user_directory.update_user(user_id, changes).await?;

        let detail = if previous.status == account.status {
            format!("updated user '{user_id}'")
        } else {
            format!(
                "updated user '{user_id}', status {} -> {}",
                previous.status.as_str(),
                account.status.as_str()
            )
        };
        self.append_user_event(actor, AuditAction::UserUpdated, user_id, detail)
            .await?;

        Ok(account)
    }

    async fn load_user(&self, user_id: UserId) -> AppResult<UserAccount> {
        self.user_directory
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
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
                resource_type: USER_RESOURCE_TYPE.to_owned(),
                resource_id: user_id.to_string(),
                detail: Some(detail),
            })
            .await
    }
}

fn validate_display_name(value: String) -> AppResult<NonEmptyString> {
    NonEmptyString::bounded(value, "display_name", USER_DISPLAY_NAME_MAX_LENGTH)
}

#[cfg(test)]
mod tests;
