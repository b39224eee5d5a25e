use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use assetkeep_application::{
    NewRole, RoleChanges, RoleDefinition, RoleQuery, RoleRepository, RoleSummary, UserAccount,
};
use assetkeep_core::{AppError, AppResult};
use assetkeep_domain::{Permission, RoleName};

use crate::postgres_support::{
    RoleRow, UserRow, aggregate_roles, begin, commit, contains_pattern,
    is_foreign_key_violation, is_unique_violation, map_edge_error, resolve_role_id,
};

mod mutations;

/// PostgreSQL-backed repository for role definitions and role grants.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleCountRow {
    role_name: String,
    user_count: i64,
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self, query: &RoleQuery) -> AppResult<Vec<RoleSummary>> {
        let pattern = query.needle().as_deref().map(contains_pattern);

        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.name AS role_name,
                roles.display_name,
                roles.description,
                roles.is_system,
                grants.permission
            FROM roles
            LEFT JOIN role_permissions AS grants
                ON grants.role_id = roles.id
            WHERE $1::TEXT IS NULL
                OR roles.name ILIKE $1 ESCAPE '\'
                OR roles.display_name ILIKE $1 ESCAPE '\'
            ORDER BY roles.name, grants.permission
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        let counts = sqlx::query_as::<_, RoleCountRow>(
            r#"
            SELECT roles.name AS role_name, COUNT(user_roles.user_id) AS user_count
            FROM roles
            LEFT JOIN user_roles
                ON user_roles.role_id = roles.id
            GROUP BY roles.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count role holders: {error}")))?;

        Ok(aggregate_roles(rows)?
            .into_values()
            .map(|role| {
                let user_count = counts
                    .iter()
                    .find(|count| count.role_name == role.name.as_str())
                    .map(|count| u64::try_from(count.user_count).unwrap_or_default())
                    .unwrap_or_default();
                RoleSummary { role, user_count }
            })
            .collect())
    }

    async fn find_role(&self, role_name: &RoleName) -> AppResult<Option<RoleDefinition>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.name AS role_name,
                roles.display_name,
                roles.description,
                roles.is_system,
                grants.permission
            FROM roles
            LEFT JOIN role_permissions AS grants
                ON grants.role_id = roles.id
            WHERE roles.name = $1
            ORDER BY grants.permission
            "#,
        )
        .bind(role_name.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?;

        Ok(aggregate_roles(rows)?.into_values().next())
    }

    async fn list_role_holders(&self, role_name: &RoleName) -> AppResult<Vec<UserAccount>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT users.id, users.display_name, users.email, users.status
            FROM user_roles
            INNER JOIN roles
                ON roles.id = user_roles.role_id
            INNER JOIN users
                ON users.id = user_roles.user_id
            WHERE roles.name = $1
            ORDER BY users.display_name, users.id
            "#,
        )
        .bind(role_name.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role holders: {error}")))?;

        rows.into_iter().map(UserRow::into_account).collect()
    }

    async fn create_role(&self, input: NewRole) -> AppResult<RoleDefinition> {
        self.create_role_impl(input).await
    }

    async fn update_role(
        &self,
        role_name: &RoleName,
        changes: RoleChanges,
    ) -> AppResult<RoleDefinition> {
        self.update_role_impl(role_name, changes).await
    }

    async fn delete_role(&self, role_name: &RoleName) -> AppResult<()> {
        self.delete_role_impl(role_name).await
    }

    async fn grant_role_permission(
        &self,
        role_name: &RoleName,
        permission: Permission,
    ) -> AppResult<()> {
        let mut transaction = begin(&self.pool).await?;
        let role_id = resolve_role_id(&mut transaction, role_name).await?;

        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission)
            VALUES ($1, $2)
            ON CONFLICT (role_id, permission) DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(permission.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            map_edge_error(
                error,
                "grant role permission",
                &format!("role '{role_name}' or permission '{permission}'"),
            )
        })?;

        commit(transaction).await
    }

    async fn revoke_role_permission(
        &self,
        role_name: &RoleName,
        permission: Permission,
    ) -> AppResult<()> {
        let mut transaction = begin(&self.pool).await?;
        let role_id = resolve_role_id(&mut transaction, role_name).await?;

        sqlx::query(
            r#"
            DELETE FROM role_permissions
            WHERE role_id = $1 AND permission = $2
            "#,
        )
        .bind(role_id)
        .bind(permission.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to revoke role permission: {error}"))
        })?;

        commit(transaction).await
    }

    async fn upsert_system_role(&self, input: NewRole) -> AppResult<RoleDefinition> {
        self.upsert_system_role_impl(input).await
    }
}

fn map_role_write_error(error: sqlx::Error, role_name: &RoleName) -> AppError {
    if is_unique_violation(&error) {
        return AppError::Conflict(format!("role '{role_name}' already exists"));
    }

    AppError::Internal(format!("failed to write role '{role_name}': {error}"))
}

fn map_role_delete_error(error: sqlx::Error, role_name: &RoleName) -> AppError {
    if is_foreign_key_violation(&error) {
        return AppError::Conflict(format!("role '{role_name}' is still assigned to users"));
    }

    AppError::Internal(format!("failed to delete role '{role_name}': {error}"))
}
