use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use assetkeep_application::{PermissionHolders, PermissionRepository};
use assetkeep_core::{AppError, AppResult};
use assetkeep_domain::{Permission, RoleName};

use crate::postgres_support::{UserRow, begin, commit};

/// PostgreSQL-backed repository for the permission catalog.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleNameRow {
    name: String,
}

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn list_permission_holders(
        &self,
        permission: Permission,
    ) -> AppResult<PermissionHolders> {
        let role_rows = sqlx::query_as::<_, RoleNameRow>(
            r#"
            SELECT roles.name
            FROM role_permissions AS grants
            INNER JOIN roles
                ON roles.id = grants.role_id
            WHERE grants.permission = $1
            ORDER BY roles.name
            "#,
        )
        .bind(permission.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list roles for permission: {error}"))
        })?;

        let user_rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT users.id, users.display_name, users.email, users.status
            FROM user_permissions AS grants
            INNER JOIN users
                ON users.id = grants.user_id
            WHERE grants.permission = $1
            ORDER BY users.display_name, users.id
            "#,
        )
        .bind(permission.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list users for permission: {error}"))
        })?;

        let roles = role_rows
            .into_iter()
            .map(|row| {
                RoleName::new(row.name.as_str()).map_err(|error| {
                    AppError::Internal(format!("invalid stored role name '{}': {error}", row.name))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;
        let users = user_rows
            .into_iter()
            .map(UserRow::into_account)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PermissionHolders { roles, users })
    }

    async fn sync_registry(&self, permissions: &[Permission]) -> AppResult<()> {
        let mut transaction = begin(&self.pool).await?;

        for permission in permissions {
            sqlx::query(
                r#"
                INSERT INTO permissions (name, display_name, description, category)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (name) DO UPDATE
                SET display_name = EXCLUDED.display_name,
                    description = EXCLUDED.description,
                    category = EXCLUDED.category,
                    updated_at = now()
                "#,
            )
            .bind(permission.as_str())
            .bind(permission.display_name())
            .bind(permission.description())
            .bind(permission.category())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to upsert permission '{permission}': {error}"
                ))
            })?;
        }

        commit(transaction).await?;
        debug!(count = permissions.len(), "synchronized permission catalog");
        Ok(())
    }
}
