use std::collections::BTreeSet;
use std::sync::Arc;

use assetkeep_core::{AppError, AppResult, NonEmptyString};
use assetkeep_domain::{
    AuditAction, Permission, ROLE_DESCRIPTION_MAX_LENGTH, ROLE_DISPLAY_NAME_MAX_LENGTH, RoleName,
};

use crate::{
    AccessGate, AuditEvent, AuditRepository, RoleDefinition, RoleRepository, UserAccount,
    UserContext,
};

mod mutations;
mod queries;

const ROLE_RESOURCE_TYPE: &str = "rbac_role";

/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: String,
    /// Human-readable role label.
    pub display_name: String,
    /// Optional role description.
    pub description: Option<String>,
    /// Marks the role as system-managed.
    pub is_system: bool,
    /// Permission identifiers to attach to the role.
    pub permissions: Vec<String>,
}

/// Input payload for partially updating a role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New role name.
    pub name: Option<String>,
    /// New role label.
    pub display_name: Option<String>,
    /// New role description.
    pub description: Option<String>,
    /// Replacement permission identifiers.
    pub permissions: Option<Vec<String>>,
}

/// Role with the users currently holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDetail {
    /// Role definition.
    pub role: RoleDefinition,
    /// Users holding the role.
    pub holders: Vec<UserAccount>,
}

/// Application service for role administration.
#[derive(Clone)]
pub struct RoleService {
    gate: AccessGate,
    repository: Arc<dyn RoleRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RoleService {
    /// Creates a new role service.
    #[must_use]
    pub fn new(
        gate: AccessGate,
        repository: Arc<dyn RoleRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            gate,
            repository,
            audit_repository,
        }
    }

    async fn load_role(&self, role_name: &RoleName) -> AppResult<RoleDefinition> {
        self.repository
            .find_role(role_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' does not exist")))
    }

    async fn require_super_administrator(
        &self,
        actor: &UserContext,
        message: &str,
    ) -> AppResult<()> {
        if self.gate.is_super_administrator(actor).await? {
            return Ok(());
        }

        Err(AppError::Unauthorized(message.to_owned()))
    }

    async fn guard_system_role(&self, actor: &UserContext, role: &RoleDefinition) -> AppResult<()> {
        if !role.is_system {
            return Ok(());
        }

        self.require_super_administrator(
            actor,
            &format!("system role '{}' can only be modified by a super administrator", role.name),
        )
        .await
    }

    async fn append_role_event(
        &self,
        actor: &UserContext,
        action: AuditAction,
        role_name: &RoleName,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.user_id(),
                action,
                resource_type: ROLE_RESOURCE_TYPE.to_owned(),
                resource_id: role_name.to_string(),
                detail: Some(detail),
            })
            .await
    }
}

fn validate_display_name(value: String) -> AppResult<NonEmptyString> {
    NonEmptyString::bounded(value, "display_name", ROLE_DISPLAY_NAME_MAX_LENGTH)
}

fn validate_description(value: Option<String>) -> AppResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let value = value.trim().to_owned();
    if value.is_empty() {
        return Ok(None);
    }

    if value.chars().count() > ROLE_DESCRIPTION_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "description must not exceed {ROLE_DESCRIPTION_MAX_LENGTH} characters"
        )));
    }

    Ok(Some(value))
}

fn permission_set(identifiers: &[String]) -> AppResult<BTreeSet<Permission>> {
    identifiers
        .iter()
        .map(|identifier| Permission::from_transport(identifier))
        .collect()
}
