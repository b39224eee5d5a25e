use assetkeep_core::{AppError, UserIdentity};
use assetkeep_domain::UserId;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use tower_sessions::Session;
use tracing::debug;

use crate::auth::{SESSION_ABSOLUTE_LIFETIME_HOURS, SESSION_CREATED_AT_KEY, SESSION_USER_KEY};
use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the session identity into a request-scoped user context.
///
/// Identities whose account disappeared or is no longer active are treated as
/// anonymous, so the permission memo is never built for them.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthenticated("authentication required".to_owned()))?;

    let created_at = session
        .get::<i64>(SESSION_CREATED_AT_KEY)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to read session creation time: {error}"))
        })?;
    if created_at.is_none_or(is_past_absolute_lifetime) {
        session
            .delete()
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;
        return Err(AppError::Unauthenticated("session expired".to_owned()).into());
    }

    let user_id = UserId::from_uuid(identity.user_id());
    let context = match state.authorization_service.user_context(user_id).await {
        Ok(context) => context,
        Err(AppError::NotFound(_)) => {
            debug!(user_id = %user_id, "session refers to an unknown user");
            return Err(AppError::Unauthenticated("authentication required".to_owned()).into());
        }
        Err(error) => return Err(error.into()),
    };

    if !context.account().status.is_active() {
        debug!(
            user_id = %user_id,
            status = context.account().status.as_str(),
            "session refers to a user that is not active"
        );
        return Err(AppError::Unauthenticated("account is not active".to_owned()).into());
    }

    request.extensions_mut().insert(identity);
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site") {
            if fetch_site == HeaderValue::from_static("cross-site") {
                return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
            }
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed_origin = state.frontend_url;
        let origin_is_allowed = origin == allowed_origin;
        let referer_is_allowed = referer.starts_with(&allowed_origin);

        if !origin_is_allowed && !referer_is_allowed {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn is_past_absolute_lifetime(created_at: i64) -> bool {
    let age_seconds = chrono::Utc::now().timestamp() - created_at;
    age_seconds > SESSION_ABSOLUTE_LIFETIME_HOURS * 60 * 60
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
