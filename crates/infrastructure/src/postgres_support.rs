use std::collections::BTreeMap;
use std::str::FromStr;

use assetkeep_application::{RoleDefinition, UserAccount};
use assetkeep_core::{AppError, AppResult};
use assetkeep_domain::{Permission, RoleName, UserId, UserStatus};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    database_error_code(error).as_deref() == Some(UNIQUE_VIOLATION)
}

pub(crate) fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    database_error_code(error).as_deref() == Some(FOREIGN_KEY_VIOLATION)
}

fn database_error_code(error: &sqlx::Error) -> Option<String> {
    match error {
        sqlx::Error::Database(database_error) => {
            database_error.code().map(|code| code.into_owned())
        }
        _ => None,
    }
}

/// Builds an `ILIKE ... ESCAPE '\'` pattern matching `needle` literally.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for character in needle.chars() {
        if matches!(character, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(character);
    }
    pattern.push('%');
    pattern
}

/// Maps edge inserts: a vanished endpoint surfaces as `NotFound`.
pub(crate) fn map_edge_error(error: sqlx::Error, action: &str, endpoints: &str) -> AppError {
    if is_foreign_key_violation(&error) {
        return AppError::NotFound(format!("{endpoints} no longer exists"));
    }

    AppError::Internal(format!("failed to {action}: {error}"))
}

pub(crate) async fn begin(pool: &PgPool) -> AppResult<Transaction<'static, Postgres>> {
    pool.begin()
        .await
        .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
}

pub(crate) async fn commit(transaction: Transaction<'static, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
}

/// Resolves and locks a role row for the rest of the transaction.
pub(crate) async fn resolve_role_id(
    connection: &mut PgConnection,
    role_name: &RoleName,
) -> AppResult<uuid::Uuid> {
    sqlx::query_scalar::<_, uuid::Uuid>(
        r#"
        SELECT id
        FROM roles
        WHERE name = $1
        FOR UPDATE
        "#,
    )
    .bind(role_name.as_str())
    .fetch_optional(connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to resolve role: {error}")))?
    .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' does not exist")))
}

pub(crate) async fn ensure_user_exists(
    connection: &mut PgConnection,
    user_id: UserId,
) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)
        "#,
    )
    .bind(user_id.as_uuid())
    .fetch_one(connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to resolve user: {error}")))?;

    if !exists {
        return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
    }

    Ok(())
}

pub(crate) fn decode_permission(value: &str) -> AppResult<Permission> {
    Permission::from_str(value).map_err(|error| {
        AppError::Internal(format!("invalid stored permission '{value}': {error}"))
    })
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub(crate) id: uuid::Uuid,
    pub(crate) display_name: String,
    pub(crate) email: Option<String>,
    pub(crate) status: String,
}

impl UserRow {
    pub(crate) fn into_account(self) -> AppResult<UserAccount> {
        let status = UserStatus::from_str(self.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "invalid stored status for user '{}': {error}",
                self.id
            ))
        })?;

        Ok(UserAccount {
            user_id: UserId::from_uuid(self.id),
            display_name: self.display_name,
            email: self.email,
            status,
        })
    }
}

/// One role joined with one of its grants.
#[derive(Debug, FromRow)]
pub(crate) struct RoleRow {
    pub(crate) role_id: uuid::Uuid,
    pub(crate) role_name: String,
    pub(crate) display_name: String,
    pub(crate) description: Option<String>,
    pub(crate) is_system: bool,
    pub(crate) permission: Option<String>,
}

/// Folds joined rows into role definitions keyed by role name.
pub(crate) fn aggregate_roles(rows: Vec<RoleRow>) -> AppResult<BTreeMap<RoleName, RoleDefinition>> {
    let mut by_name: BTreeMap<RoleName, RoleDefinition> = BTreeMap::new();

    for row in rows {
        let name = RoleName::new(row.role_name.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "invalid stored role name '{}': {error}",
                row.role_name
            ))
        })?;

        let role = by_name
            .entry(name.clone())
            .or_insert_with(|| RoleDefinition {
                role_id: row.role_id.to_string(),
                name,
                display_name: row.display_name,
                description: row.description,
                is_system: row.is_system,
                permissions: Default::default(),
            });

        if let Some(permission) = row.permission {
            role.permissions.insert(decode_permission(permission.as_str())?);
        }
    }

    Ok(by_name)
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn search_patterns_escape_wildcards() {
        assert_eq!(contains_pattern("clerk"), "%clerk%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("back\\slash"), "%back\\\\slash%");
    }
}
