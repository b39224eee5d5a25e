use assetkeep_application::UserContext;
use assetkeep_core::AppError;
use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use tower_sessions::Session;

use crate::dto::UserIdentityResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let effective = state
        .authorization_service
        .effective_permissions(&user)
        .await?;

    let roles = effective
        .roles()
        .iter()
        .map(|role| role.as_str().to_owned())
        .collect();
    let permissions = effective
        .all()
        .iter()
        .map(|permission| permission.as_str().to_owned())
        .collect();

    Ok(Json(UserIdentityResponse::from_context(
        &user,
        roles,
        permissions,
    )))
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::extract::Extension;

    use crate::handlers::test_support::TestApp;

    use super::me_handler;

    #[tokio::test]
    async fn me_reports_roles_and_effective_permissions() {
        let app = TestApp::provisioned().await;
        let clerk = app.user_with_roles("Sam", &["inventory_clerk"]).await;

        let response = me_handler(app.state(), Extension(app.context(clerk).await)).await;

        let Json(identity) =
            response.unwrap_or_else(|error| panic!("identity should resolve: {error:?}"));
        assert_eq!(identity.user_id, clerk.to_string());
        assert_eq!(identity.roles, vec!["inventory_clerk".to_owned()]);
        assert!(identity.permissions.contains(&"items.create".to_owned()));
        assert!(!identity.permissions.contains(&"roles.create".to_owned()));
    }
}
