use assetkeep_application::{PermissionQuery, UserContext};
use assetkeep_domain::UserId;
use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::dto::{
    BulkAssignPermissionsRequest, BulkAssignPermissionsResponse, PermissionCategoryResponse,
    PermissionDetailResponse, PermissionResponse, UserPermissionRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PermissionListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<PermissionListQuery>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .permission_service
        .list_permissions(
            Some(&user),
            PermissionQuery {
                search: query.search,
                category: query.category,
            },
        )
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn permissions_by_category_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
) -> ApiResult<Json<Vec<PermissionCategoryResponse>>> {
    let grouped = state
        .permission_service
        .permissions_by_category(Some(&user))
        .await?
        .into_iter()
        .map(|(category, permissions)| PermissionCategoryResponse {
            category: category.to_owned(),
            permissions: permissions
                .into_iter()
                .map(PermissionResponse::from)
                .collect(),
        })
        .collect();

    Ok(Json(grouped))
}

pub async fn permission_categories_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
) -> ApiResult<Json<Vec<String>>> {
    let categories = state
        .permission_service
        .categories(Some(&user))
        .await?
        .into_iter()
        .map(str::to_owned)
        .collect();

    Ok(Json(categories))
}

pub async fn get_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(permission): Path<String>,
) -> ApiResult<Json<PermissionDetailResponse>> {
    let detail = state
        .permission_service
        .get_permission(Some(&user), permission.as_str())
        .await?;

    Ok(Json(PermissionDetailResponse::from(detail)))
}

pub async fn assign_permission_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(permission): Path<String>,
    Json(payload): Json<UserPermissionRequest>,
) -> ApiResult<StatusCode> {
    state
        .user_access_service
        .grant_permission(Some(&user), payload.user_id.as_str(), permission.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn revoke_permission_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(permission): Path<String>,
    Json(payload): Json<UserPermissionRequest>,
) -> ApiResult<StatusCode> {
    state
        .user_access_service
        .revoke_permission(Some(&user), payload.user_id.as_str(), permission.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn bulk_assign_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Json(payload): Json<BulkAssignPermissionsRequest>,
) -> ApiResult<Json<BulkAssignPermissionsResponse>> {
    let granted = state
        .user_access_service
        .bulk_grant(Some(&user), payload.user_id.as_str(), &payload.permissions)
        .await?;

    Ok(Json(BulkAssignPermissionsResponse {
        user_id: UserId::parse(payload.user_id.as_str())?.to_string(),
        granted: granted
            .into_iter()
            .map(|permission| permission.as_str().to_owned())
            .collect(),
    }))
}
