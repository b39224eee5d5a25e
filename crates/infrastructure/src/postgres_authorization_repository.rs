use async_trait::async_trait;

use assetkeep_application::{AuthorizationRepository, RoleDefinition};
use assetkeep_core::{AppError, AppResult};
use assetkeep_domain::{Permission, UserId};

use sqlx::{FromRow, PgPool};

use crate::postgres_support::{RoleRow, aggregate_roles, decode_permission};

/// PostgreSQL-backed repository for user permission lookups.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    permission: String,
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn list_direct_permissions(&self, user_id: UserId) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permission
            FROM user_permissions
            WHERE user_id = $1
            ORDER BY permission
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load direct permissions: {error}"))
        })?;

        rows.into_iter()
            .map(|row| decode_permission(row.permission.as_str()))
            .collect()
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleDefinition>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.name AS role_name,
                roles.display_name,
                roles.description,
                roles.is_system,
                grants.permission
            FROM user_roles
            INNER JOIN roles
                ON roles.id = user_roles.role_id
            LEFT JOIN role_permissions AS grants
                ON grants.role_id = roles.id
            WHERE user_roles.user_id = $1
            ORDER BY roles.name, grants.permission
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load user roles: {error}")))?;

        Ok(aggregate_roles(rows)?.into_values().collect())
    }
}
