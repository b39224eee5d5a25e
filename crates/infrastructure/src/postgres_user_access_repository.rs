use async_trait::async_trait;
use sqlx::PgPool;

use assetkeep_application::UserAccessRepository;
use assetkeep_core::{AppError, AppResult};
use assetkeep_domain::{Permission, RoleName, UserId};

use crate::postgres_support::{begin, commit, ensure_user_exists, map_edge_error, resolve_role_id};

/// PostgreSQL-backed repository for user role and user permission edges.
#[derive(Clone)]
pub struct PostgresUserAccessRepository {
    pool: PgPool,
}

impl PostgresUserAccessRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserAccessRepository for PostgresUserAccessRepository {
    async fn assign_role(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        let mut transaction = begin(&self.pool).await?;
        ensure_user_exists(&mut transaction, user_id).await?;
        let role_id = resolve_role_id(&mut transaction, role_name).await?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            map_edge_error(
                error,
                "assign role",
                &format!("user '{user_id}' or role '{role_name}'"),
            )
        })?;

        commit(transaction).await
    }

    async fn remove_role(&self, user_id: UserId, role_name: &RoleName) -> AppResult<()> {
        let mut transaction = begin(&self.pool).await?;
        ensure_user_exists(&mut transaction, user_id).await?;
        let role_id = resolve_role_id(&mut transaction, role_name).await?;

        sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = $1 AND role_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove role: {error}")))?;

        commit(transaction).await
    }

    async fn replace_roles(&self, user_id: UserId, role_names: &[RoleName]) -> AppResult<()> {
        let mut transaction = begin(&self.pool).await?;
        ensure_user_exists(&mut transaction, user_id).await?;

        let mut role_ids = Vec::with_capacity(role_names.len());
        for role_name in role_names {
            role_ids.push(resolve_role_id(&mut transaction, role_name).await?);
        }

        sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear user roles: {error}")))?;

        for role_id in role_ids {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, role_id) DO NOTHING
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(role_id)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                map_edge_error(error, "assign role", &format!("user '{user_id}' or a role"))
            })?;
        }

        commit(transaction).await
    }

    async fn grant_permissions(
        &self,
        user_id: UserId,
        permissions: &[Permission],
    ) -> AppResult<()> {
        let mut transaction = begin(&self.pool).await?;
        ensure_user_exists(&mut transaction, user_id).await?;

        for permission in permissions {
            sqlx::query(
                r#"
                INSERT INTO user_permissions (user_id, permission)
                VALUES ($1, $2)
                ON CONFLICT (user_id, permission) DO NOTHING
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(permission.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                map_edge_error(
                    error,
                    "grant permission",
                    &format!("user '{user_id}' or permission '{permission}'"),
                )
            })?;
        }

        commit(transaction).await
    }

    async fn revoke_permission(&self, user_id: UserId, permission: Permission) -> AppResult<()> {
        let mut transaction = begin(&self.pool).await?;
        ensure_user_exists(&mut transaction, user_id).await?;

        sqlx::query(
            r#"
            DELETE FROM user_permissions
            WHERE user_id = $1 AND permission = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(permission.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke permission: {error}")))?;

        commit(transaction).await
    }
}
