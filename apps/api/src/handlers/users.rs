use assetkeep_application::UserContext;
use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::dto::{
    CreateUserRequest, SyncUserRolesRequest, UpdateUserRequest, UserAccountResponse,
    UserDetailResponse, UserPermissionsResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<Vec<UserAccountResponse>>> {
    let users = state
        .user_service
        .list_users(Some(&user), query.search, query.status.as_deref())
        .await?
        .into_iter()
        .map(UserAccountResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserAccountResponse>)> {
    let account = state
        .user_service
        .create_user(Some(&user), payload.into_input())
        .await?;

    Ok((StatusCode::CREATED, Json(UserAccountResponse::from(account))))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserDetailResponse>> {
    let detail = state
        .user_service
        .get_user(Some(&user), user_id.as_str())
        .await?;

    Ok(Json(UserDetailResponse::from(detail)))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserAccountResponse>> {
    let account = state
        .user_service
        .update_user(Some(&user), user_id.as_str(), payload.into_input())
        .await?;

    Ok(Json(UserAccountResponse::from(account)))
}

pub async fn user_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserPermissionsResponse>> {
    let breakdown = state
        .user_access_service
        .user_permissions(Some(&user), user_id.as_str())
        .await?;

    Ok(Json(UserPermissionsResponse::from(breakdown)))
}

/// Replaces the user's role set.
pub async fn sync_user_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(user_id): Path<String>,
    Json(payload): Json<SyncUserRolesRequest>,
) -> ApiResult<StatusCode> {
    state
        .user_access_service
        .sync_roles(Some(&user), user_id.as_str(), &payload.roles)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
