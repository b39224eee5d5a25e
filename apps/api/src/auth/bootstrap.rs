use assetkeep_application::NewUser;
use assetkeep_core::{AppError, NonEmptyString, UserIdentity};
use assetkeep_domain::{UserId, UserStatus};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;

use super::{SESSION_CREATED_AT_KEY, SESSION_USER_KEY};

/// Token-guarded sign-in for operators before a real identity provider exists.
///
/// An unknown `user_id` is created as an active account when `display_name`
/// is supplied, otherwise the request fails with not found.
#[derive(Debug, Deserialize)]
pub struct BootstrapRequest {
    pub user_id: String,
    pub token: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<StatusCode> {
    if payload.token != state.bootstrap_token {
        return Err(AppError::Unauthenticated("invalid bootstrap token".to_owned()).into());
    }

    let user_id = UserId::parse(payload.user_id.as_str())?;
    let account = match state.user_directory.find_user(user_id).await? {
        Some(account) => account,
        None => {
            let display_name = payload.display_name.ok_or_else(|| {
                AppError::NotFound(format!("user '{user_id}' does not exist"))
            })?;
            let account = state
                .user_directory
                .create_user(NewUser {
                    user_id,
                    display_name: NonEmptyString::new(display_name)?,
                    email: payload.email,
                    status: UserStatus::Active,
                })
                .await?;
            info!(user_id = %user_id, "created user during bootstrap sign-in");
            account
        }
    };

    if !account.status.is_active() {
        return Err(AppError::Unauthenticated("account is not active".to_owned()).into());
    }

    let identity = UserIdentity::new(
        account.user_id.as_uuid(),
        account.display_name,
        account.email,
    );

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    session
        .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session creation time: {error}"))
        })?;

    info!(user_id = %user_id, "bootstrap sign-in succeeded");
    Ok(StatusCode::NO_CONTENT)
}
