use async_trait::async_trait;

use assetkeep_application::{NewUser, UserAccount, UserChanges, UserDirectory, UserQuery};
use assetkeep_core::{AppError, AppResult};
use assetkeep_domain::UserId;

use sqlx::PgPool;

use crate::postgres_support::{UserRow, contains_pattern, is_unique_violation};

/// PostgreSQL-backed user directory.
#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, display_name, email, status
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?
        .map(UserRow::into_account)
        .transpose()
    }

    async fn list_users(&self, query: &UserQuery) -> AppResult<Vec<UserAccount>> {
        let pattern = query.needle().as_deref().map(contains_pattern);

        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, display_name, email, status
            FROM users
            WHERE ($1::TEXT IS NULL
                    OR display_name ILIKE $1 ESCAPE '\'
                    OR email ILIKE $1 ESCAPE '\')
                AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY lower(display_name), id
            "#,
        )
        .bind(pattern.as_deref())
        .bind(query.status.map(|status| status.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?
        .into_iter()
        .map(UserRow::into_account)
        .collect()
    }

    async fn create_user(&self, input: NewUser) -> AppResult<UserAccount> {
        let user_id = input.user_id;
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, display_name, email, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, display_name, email, status
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(input.display_name.as_str())
        .bind(input.email.as_deref())
        .bind(input.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict(format!(
                    "user '{user_id}' or its email already exists"
                ));
            }
            AppError::Internal(format!("failed to create user: {error}"))
        })?;

        row.into_account()
    }

    async fn update_user(&self, user_id: UserId, changes: UserChanges) -> AppResult<UserAccount> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET display_name = COALESCE($2, display_name),
                email = COALESCE($3, email),
                status = COALESCE($4, status),
                updated_at = now()
            WHERE id = $1
            RETURNING id, display_name, email, status
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(changes.display_name.as_ref().map(|value| value.as_str()))
        .bind(changes.email.as_deref())
        .bind(changes.status.map(|status| status.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict("email is already in use".to_owned());
            }
            AppError::Internal(format!("failed to update user: {error}"))
        })?
        .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?
        .into_account()
    }
}

#[cfg(test)]
mod tests {
    use assetkeep_application::{NewUser, UserChanges, UserDirectory, UserQuery};
    use assetkeep_core::{AppError, NonEmptyString};
    use assetkeep_domain::{UserId, UserStatus};

    use crate::postgres_test_support::test_pool;

    use super::PostgresUserDirectory;

    fn new_user(display_name: &str, email: Option<String>) -> NewUser {
        NewUser {
            user_id: UserId::new(),
            display_name: NonEmptyString::new(display_name).unwrap_or_else(|_| unreachable!()),
            email,
            status: UserStatus::Active,
        }
    }

    #[tokio::test]
    async fn update_user_changes_status_and_guards_email() {
        let Some(pool) = test_pool().await else {
            return;
        };
        let directory = PostgresUserDirectory::new(pool);
        let marker = UserId::new().as_uuid().simple().to_string();
        let taken = format!("taken-{marker}@example.org");

        let first = directory
            .create_user(new_user("First", Some(taken.clone())))
            .await
            .unwrap_or_else(|error| panic!("user creation failed: {error}"));
        let second = directory
            .create_user(new_user("Second", None))
            .await
            .unwrap_or_else(|error| panic!("user creation failed: {error}"));

        let suspended = directory
            .update_user(
                first.user_id,
                UserChanges {
                    status: Some(UserStatus::Suspended),
                    ..UserChanges::default()
                },
            )
            .await;
        assert!(suspended.is_ok_and(|account| {
            account.status == UserStatus::Suspended && account.email.as_deref() == Some(&taken)
        }));

        let clash = directory
            .update_user(
                second.user_id,
                UserChanges {
                    email: Some(taken),
                    ..UserChanges::default()
                },
            )
            .await;
        assert!(matches!(clash, Err(AppError::Conflict(_))));

        let missing = directory
            .update_user(UserId::new(), UserChanges::default())
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_users_filters_by_status_and_literal_search() {
        let Some(pool) = test_pool().await else {
            return;
        };
        let directory = PostgresUserDirectory::new(pool);
        let marker = UserId::new().as_uuid().simple().to_string();

        let literal = directory
            .create_user(new_user(&format!("clerk_{marker}"), None))
            .await
            .unwrap_or_else(|error| panic!("user creation failed: {error}"));
        assert!(
            directory
                .create_user(new_user(&format!("clerkx{marker}"), None))
                .await
                .is_ok()
        );

        let searched = directory
            .list_users(&UserQuery {
                search: Some(format!("clerk_{marker}")),
                status: None,
            })
            .await;
        assert!(searched.is_ok_and(|users| {
            users.len() == 1 && users[0].user_id == literal.user_id
        }));

        let suspended = directory
            .list_users(&UserQuery {
                search: Some(marker),
                status: Some(UserStatus::Suspended),
            })
            .await;
        assert!(suspended.is_ok_and(|users| users.is_empty()));
    }
}
