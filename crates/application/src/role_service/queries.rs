use super::*;

use crate::{RoleQuery, RoleSummary};

impl RoleService {
    /// Lists roles with their holder counts.
    pub async fn list_roles(
        &self,
        actor: Option<&UserContext>,
        query: RoleQuery,
    ) -> AppResult<Vec<RoleSummary>> {
        self.gate.require(actor, Permission::RolesViewAny).await?;
        self.repository.list_roles(&query).await
    }

    /// Returns one role with its grants and holders.
    pub async fn get_role(
        &self,
        actor: Option<&UserContext>,
        role_name: &str,
    ) -> AppResult<RoleDetail> {
        self.gate.require(actor, Permission::RolesView).await?;

        let role_name = RoleName::new(role_name)?;
        let role = self.load_role(&role_name).await?;
        let holders = self.repository.list_role_holders(&role_name).await?;

        Ok(RoleDetail { role, holders })
    }
}
