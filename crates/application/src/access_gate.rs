use assetkeep_core::{AppError, AppResult};
use assetkeep_domain::Permission;
use tracing::{debug, error};

use crate::{AuthorizationService, UserContext};

/// Outcome of one access gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The actor may enter the protected operation.
    Allow,
    /// The actor must be rejected.
    Deny,
}

/// Enforcement point evaluated before every protected operation.
#[derive(Clone)]
pub struct AccessGate {
    authorization_service: AuthorizationService,
}

impl AccessGate {
    /// Creates a gate backed by the authorization engine.
    #[must_use]
    pub fn new(authorization_service: AuthorizationService) -> Self {
        Self {
            authorization_service,
        }
    }

    /// Decides whether the actor holds the permission. Lookup failures deny.
    pub async fn check(
        &self,
        actor: Option<&UserContext>,
        permission: Permission,
    ) -> AccessDecision {
        let Some(actor) = actor else {
            debug!(permission = permission.as_str(), "access denied without actor");
            return AccessDecision::Deny;
        };

        match self
            .authorization_service
            .has_permission(actor, permission)
            .await
        {
            Ok(true) => AccessDecision::Allow,
            Ok(false) => {
                debug!(
                    user_id = %actor.user_id(),
                    permission = permission.as_str(),
                    "access denied"
                );
                AccessDecision::Deny
            }
            Err(lookup_error) => {
                error!(
                    user_id = %actor.user_id(),
                    permission = permission.as_str(),
                    error = %lookup_error,
                    "permission lookup failed, denying access"
                );
                AccessDecision::Deny
            }
        }
    }

    /// Returns the actor when allowed, `Unauthorized` otherwise.
    pub async fn require<'a>(
        &self,
        actor: Option<&'a UserContext>,
        permission: Permission,
    ) -> AppResult<&'a UserContext> {
        match (self.check(actor, permission).await, actor) {
            (AccessDecision::Allow, Some(actor)) => Ok(actor),
            _ => Err(AppError::Unauthorized(format!(
                "missing permission '{}'",
                permission.as_str()
            ))),
        }
    }

    /// Returns whether the actor holds the super administrator role.
    ///
    /// Used by role mutations after the permission check passed.
    pub async fn is_super_administrator(&self, actor: &UserContext) -> AppResult<bool> {
        self.authorization_service.is_super_administrator(actor).await
    }
}

#[cfg(test)]
mod tests {
    use assetkeep_core::AppError;
    use assetkeep_domain::Permission;

    use crate::test_support::Harness;

    use super::AccessDecision;

    #[tokio::test]
    async fn missing_actor_is_denied() {
        let harness = Harness::new();

        let decision = harness.gate.check(None, Permission::RolesView).await;
        assert_eq!(decision, AccessDecision::Deny);

        let result = harness.gate.require(None, Permission::RolesView).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn actor_with_grant_is_allowed() {
        let harness = Harness::new();
        let actor = harness.actor_with(&[Permission::RolesView]).await;

        let decision = harness.gate.check(Some(&actor), Permission::RolesView).await;
        assert_eq!(decision, AccessDecision::Allow);

        let denied = harness.gate.require(Some(&actor), Permission::RolesDelete).await;
        assert!(matches!(denied, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn lookup_failure_fails_closed() {
        let harness = Harness::new();
        let actor = harness.actor_with(&[Permission::RolesView]).await;
        harness.store.fail_reads();

        let decision = harness.gate.check(Some(&actor), Permission::RolesView).await;
        assert_eq!(decision, AccessDecision::Deny);
    }
}
