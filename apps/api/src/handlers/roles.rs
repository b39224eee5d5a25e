use assetkeep_application::{RoleQuery, UserContext};
use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::dto::{
    CreateRoleRequest, GrantRolePermissionRequest, RoleDetailResponse, RoleResponse,
    RoleSummaryResponse, RoleUserRequest, UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RoleListQuery {
    pub search: Option<String>,
}

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<RoleListQuery>,
) -> ApiResult<Json<Vec<RoleSummaryResponse>>> {
    let roles = state
        .role_service
        .list_roles(
            Some(&user),
            RoleQuery {
                search: query.search,
            },
        )
        .await?
        .into_iter()
        .map(RoleSummaryResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let (input, categories) = payload.into_parts();

    let role = if categories.is_empty() {
        state.role_service.create_role(Some(&user), input).await?
    } else {
        state
            .role_service
            .create_role_from_categories(Some(&user), input, &categories)
            .await?
    };

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(role_name): Path<String>,
) -> ApiResult<Json<RoleDetailResponse>> {
    let detail = state
        .role_service
        .get_role(Some(&user), role_name.as_str())
        .await?;

    Ok(Json(RoleDetailResponse::from(detail)))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(role_name): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_service
        .update_role(Some(&user), role_name.as_str(), payload.into_input())
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(role_name): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .role_service
        .delete_role(Some(&user), role_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn force_delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(role_name): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .role_service
        .force_delete_role(Some(&user), role_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_role_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(role_name): Path<String>,
    Json(payload): Json<RoleUserRequest>,
) -> ApiResult<StatusCode> {
    state
        .user_access_service
        .assign_role(Some(&user), payload.user_id.as_str(), role_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn revoke_role_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(role_name): Path<String>,
    Json(payload): Json<RoleUserRequest>,
) -> ApiResult<StatusCode> {
    state
        .user_access_service
        .remove_role(Some(&user), payload.user_id.as_str(), role_name.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn grant_role_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(role_name): Path<String>,
    Json(payload): Json<GrantRolePermissionRequest>,
) -> ApiResult<StatusCode> {
    state
        .role_service
        .grant_permission(Some(&user), role_name.as_str(), payload.permission.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn revoke_role_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path((role_name, permission)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .role_service
        .revoke_permission(Some(&user), role_name.as_str(), permission.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests;
