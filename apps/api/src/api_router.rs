use assetkeep_core::AppError;
use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/api/roles",
            get(handlers::roles::list_roles_handler).post(handlers::roles::create_role_handler),
        )
        .route(
            "/api/roles/{role_name}",
            get(handlers::roles::get_role_handler)
                .put(handlers::roles::update_role_handler)
                .delete(handlers::roles::delete_role_handler),
        )
        .route(
            "/api/roles/{role_name}/force",
            delete(handlers::roles::force_delete_role_handler),
        )
        .route(
            "/api/roles/{role_name}/assign-user",
            post(handlers::roles::assign_role_user_handler),
        )
        .route(
            "/api/roles/{role_name}/revoke-user",
            post(handlers::roles::revoke_role_user_handler),
        )
        .route(
            "/api/roles/{role_name}/permissions",
            post(handlers::roles::grant_role_permission_handler),
        )
        .route(
            "/api/roles/{role_name}/permissions/{permission}",
            delete(handlers::roles::revoke_role_permission_handler),
        )
        .route(
            "/api/permissions",
            get(handlers::permissions::list_permissions_handler),
        )
        .route(
            "/api/permissions/by-category",
            get(handlers::permissions::permissions_by_category_handler),
        )
        .route(
            "/api/permissions/categories",
            get(handlers::permissions::permission_categories_handler),
        )
        .route(
            "/api/permissions/bulk-assign",
            post(handlers::permissions::bulk_assign_permissions_handler),
        )
        .route(
            "/api/permissions/{permission}",
            get(handlers::permissions::get_permission_handler),
        )
        .route(
            "/api/permissions/{permission}/assign-user",
            post(handlers::permissions::assign_permission_user_handler),
        )
        .route(
            "/api/permissions/{permission}/revoke-user",
            post(handlers::permissions::revoke_permission_user_handler),
        )
        .route(
            "/api/users",
            get(handlers::users::list_users_handler).post(handlers::users::create_user_handler),
        )
        .route(
            "/api/users/{user_id}",
            get(handlers::users::get_user_handler).put(handlers::users::update_user_handler),
        )
        .route(
            "/api/users/{user_id}/permissions",
            get(handlers::users::user_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/roles",
            put(handlers::users::sync_user_roles_handler),
        )
        .route("/auth/me", get(auth::me_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}
