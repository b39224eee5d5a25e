use std::collections::BTreeSet;

use sqlx::PgConnection;

use super::*;

impl PostgresRoleRepository {
    pub(super) async fn create_role_impl(&self, input: NewRole) -> AppResult<RoleDefinition> {
        let mut transaction = begin(&self.pool).await?;

        let role_id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            INSERT INTO roles (name, display_name, description, is_system)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(input.name.as_str())
        .bind(input.display_name.as_str())
        .bind(input.description.as_deref())
        .bind(input.is_system)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_role_write_error(error, &input.name))?;

        insert_grants(&mut transaction, role_id, &input.name, &input.permissions).await?;
        commit(transaction).await?;

        Ok(RoleDefinition {
            role_id: role_id.to_string(),
            name: input.name,
            display_name: input.display_name.into(),
            description: input.description,
            is_system: input.is_system,
            permissions: input.permissions,
        })
    }

    pub(super) async fn update_role_impl(
        &self,
        role_name: &RoleName,
        changes: RoleChanges,
    ) -> AppResult<RoleDefinition> {
        let mut transaction = begin(&self.pool).await?;
        let role_id = resolve_role_id(&mut transaction, role_name).await?;
        let target_name = changes.name.clone().unwrap_or_else(|| role_name.clone());

        sqlx::query(
            r#"
            UPDATE roles
            SET name = COALESCE($2, name),
                display_name = COALESCE($3, display_name),
                description = COALESCE($4, description),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(role_id)
        .bind(changes.name.as_ref().map(RoleName::as_str))
        .bind(changes.display_name.as_ref().map(|value| value.as_str()))
        .bind(changes.description.as_deref())
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_role_write_error(error, &target_name))?;

        if let Some(permissions) = &changes.permissions {
            sqlx::query(
                r#"
                DELETE FROM role_permissions
                WHERE role_id = $1
                "#,
            )
            .bind(role_id)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to clear role permissions: {error}"))
            })?;

            insert_grants(&mut transaction, role_id, &target_name, permissions).await?;
        }

        commit(transaction).await?;

        self.find_role(&target_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{target_name}' does not exist")))
    }

    pub(super) async fn delete_role_impl(&self, role_name: &RoleName) -> AppResult<()> {
        let mut transaction = begin(&self.pool).await?;
        let role_id = resolve_role_id(&mut transaction, role_name).await?;

        let holders = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM user_roles
            WHERE role_id = $1
            "#,
        )
        .bind(role_id)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count role holders: {error}")))?;

        if holders > 0 {
            return Err(AppError::Conflict(format!(
                "role '{role_name}' is still assigned to {holders} users"
            )));
        }

        sqlx::query(
            r#"
            DELETE FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id)
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_role_delete_error(error, role_name))?;

        commit(transaction).await
    }

    pub(super) async fn upsert_system_role_impl(
        &self,
        input: NewRole,
    ) -> AppResult<RoleDefinition> {
        let mut transaction = begin(&self.pool).await?;

        let role_id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            INSERT INTO roles (name, display_name, description, is_system)
            VALUES ($1, $2, $3, true)
            ON CONFLICT (name) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                description = EXCLUDED.description,
                is_system = true,
                updated_at = now()
            RETURNING id
            "#,
        )
        .bind(input.name.as_str())
        .bind(input.display_name.as_str())
        .bind(input.description.as_deref())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to upsert system role: {error}")))?;

        sqlx::query(
            r#"
            DELETE FROM role_permissions
            WHERE role_id = $1
            "#,
        )
        .bind(role_id)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to clear system role permissions: {error}"))
        })?;

        insert_grants(&mut transaction, role_id, &input.name, &input.permissions).await?;
        commit(transaction).await?;

        Ok(RoleDefinition {
            role_id: role_id.to_string(),
            name: input.name,
            display_name: input.display_name.into(),
            description: input.description,
            is_system: true,
            permissions: input.permissions,
        })
    }
}

async fn insert_grants(
    connection: &mut PgConnection,
    role_id: uuid::Uuid,
    role_name: &RoleName,
    permissions: &BTreeSet<Permission>,
) -> AppResult<()> {
    for permission in permissions {
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission)
            VALUES ($1, $2)
            ON CONFLICT (role_id, permission) DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(permission.as_str())
        .execute(&mut *connection)
        .await
        .map_err(|error| {
            map_edge_error(
                error,
                "persist role permissions",
                &format!("role '{role_name}' or permission '{permission}'"),
            )
        })?;
    }

    Ok(())
}
