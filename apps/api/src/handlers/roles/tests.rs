use assetkeep_application::UserAccessRepository;
use assetkeep_domain::{Permission, SUPER_ADMINISTRATOR_ROLE};
use axum::Json;
use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;

use crate::dto::{CreateRoleRequest, GrantRolePermissionRequest, RoleUserRequest};
use crate::handlers::test_support::{TestApp, status_of};

use super::{
    RoleListQuery, assign_role_user_handler, create_role_handler, delete_role_handler,
    force_delete_role_handler, get_role_handler, grant_role_permission_handler,
    list_roles_handler,
};

fn create_request(name: &str, permissions: &[&str], categories: &[&str]) -> CreateRoleRequest {
    CreateRoleRequest {
        name: name.to_owned(),
        display_name: "Warehouse Staff".to_owned(),
        description: None,
        is_system: false,
        permissions: permissions.iter().map(|value| (*value).to_owned()).collect(),
        categories: categories.iter().map(|value| (*value).to_owned()).collect(),
    }
}

#[tokio::test]
async fn list_roles_includes_provisioned_system_roles() {
    let app = TestApp::provisioned().await;
    let auditor = app.user_with_roles("Ada", &["auditor"]).await;

    let response = list_roles_handler(
        app.state(),
        Extension(app.context(auditor).await),
        Query(RoleListQuery::default()),
    )
    .await;

    let Json(roles) = response.unwrap_or_else(|error| panic!("listing should pass: {error:?}"));
    assert_eq!(roles.len(), 10);
    let auditor_row = roles.iter().find(|role| role.name == "auditor");
    assert_eq!(auditor_row.map(|role| role.user_count), Some(1));
    assert!(roles.iter().all(|role| role.is_system));
}

#[tokio::test]
async fn create_role_requires_role_create_permission() {
    let app = TestApp::provisioned().await;
    let auditor = app.user_with_roles("Ada", &["auditor"]).await;

    let response = create_role_handler(
        app.state(),
        Extension(app.context(auditor).await),
        Json(create_request("warehouse_staff", &["items.view"], &[])),
    )
    .await;

    let error = response.err().unwrap_or_else(|| unreachable!());
    assert_eq!(status_of(error), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_role_expands_categories() {
    let app = TestApp::provisioned().await;
    let admin = app.user_with_roles("Root", &[SUPER_ADMINISTRATOR_ROLE]).await;

    let response = create_role_handler(
        app.state(),
        Extension(app.context(admin).await),
        Json(create_request(
            "warehouse_staff",
            &["dashboard.view"],
            &["locations"],
        )),
    )
    .await;

    let (status, Json(role)) =
        response.unwrap_or_else(|error| panic!("creation should pass: {error:?}"));
    assert_eq!(status, StatusCode::CREATED);
    assert!(role.permissions.contains(&"dashboard.view".to_owned()));
    assert!(role.permissions.contains(&"locations.create".to_owned()));
    assert!(!role.is_system);
}

#[tokio::test]
async fn create_role_rejects_unknown_permission_identifier() {
    let app = TestApp::provisioned().await;
    let admin = app.user_with_roles("Root", &[SUPER_ADMINISTRATOR_ROLE]).await;

    let response = create_role_handler(
        app.state(),
        Extension(app.context(admin).await),
        Json(create_request("warehouse_staff", &["items.teleport"], &[])),
    )
    .await;

    let error = response.err().unwrap_or_else(|| unreachable!());
    assert_eq!(status_of(error), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn held_role_cannot_be_deleted() {
    let app = TestApp::provisioned().await;
    let admin = app.user_with_roles("Root", &[SUPER_ADMINISTRATOR_ROLE]).await;
    let created = create_role_handler(
        app.state(),
        Extension(app.context(admin).await),
        Json(create_request("warehouse_staff", &["items.view"], &[])),
    )
    .await;
    assert!(created.is_ok());

    let clerk = app.user_with_roles("Sam", &[]).await;
    let assigned = assign_role_user_handler(
        app.state(),
        Extension(app.context(admin).await),
        Path("warehouse_staff".to_owned()),
        Json(RoleUserRequest {
            user_id: clerk.to_string(),
        }),
    )
    .await;
    assert_eq!(assigned.ok(), Some(StatusCode::NO_CONTENT));

    let deleted = delete_role_handler(
        app.state(),
        Extension(app.context(admin).await),
        Path("warehouse_staff".to_owned()),
    )
    .await;
    let error = deleted.err().unwrap_or_else(|| unreachable!());
    assert_eq!(status_of(error), StatusCode::CONFLICT);

    let detail = get_role_handler(
        app.state(),
        Extension(app.context(admin).await),
        Path("warehouse_staff".to_owned()),
    )
    .await;
    let Json(detail) = detail.unwrap_or_else(|error| panic!("role should exist: {error:?}"));
    assert_eq!(detail.users.len(), 1);
}

#[tokio::test]
async fn system_roles_need_force_delete() {
    let app = TestApp::provisioned().await;
    let admin = app.user_with_roles("Root", &[SUPER_ADMINISTRATOR_ROLE]).await;

    let deleted = delete_role_handler(
        app.state(),
        Extension(app.context(admin).await),
        Path("report_viewer".to_owned()),
    )
    .await;
    let error = deleted.err().unwrap_or_else(|| unreachable!());
    assert_eq!(status_of(error), StatusCode::CONFLICT);

    let forced = force_delete_role_handler(
        app.state(),
        Extension(app.context(admin).await),
        Path("report_viewer".to_owned()),
    )
    .await;
    assert_eq!(forced.ok(), Some(StatusCode::NO_CONTENT));

    let detail = get_role_handler(
        app.state(),
        Extension(app.context(admin).await),
        Path("report_viewer".to_owned()),
    )
    .await;
    let error = detail.err().unwrap_or_else(|| unreachable!());
    assert_eq!(status_of(error), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn system_role_grants_are_protected_from_non_super_administrators() {
    let app = TestApp::provisioned().await;
    let helper = app.user_with_roles("Lee", &[]).await;
    let granted = app
        .repository
        .grant_permissions(helper, &[Permission::PermissionsAssign])
        .await;
    assert!(granted.is_ok());

    let response = grant_role_permission_handler(
        app.state(),
        Extension(app.context(helper).await),
        Path("staff_user".to_owned()),
        Json(GrantRolePermissionRequest {
            permission: "items.delete".to_owned(),
        }),
    )
    .await;

    let error = response.err().unwrap_or_else(|| unreachable!());
    assert_eq!(status_of(error), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn denied_actors_get_forbidden_for_malformed_input() {
    let app = TestApp::provisioned().await;
    let staff = app.user_with_roles("Kim", &["staff_user"]).await;

    let create = create_role_handler(
        app.state(),
        Extension(app.context(staff).await),
        Json(create_request("teleporters", &["items.teleport"], &[])),
    )
    .await;
    let error = create.err().unwrap_or_else(|| unreachable!());
    assert_eq!(status_of(error), StatusCode::FORBIDDEN);

    let grant = grant_role_permission_handler(
        app.state(),
        Extension(app.context(staff).await),
        Path("staff_user".to_owned()),
        Json(GrantRolePermissionRequest {
            permission: "items.teleport".to_owned(),
        }),
    )
    .await;
    let error = grant.err().unwrap_or_else(|| unreachable!());
    assert_eq!(status_of(error), StatusCode::FORBIDDEN);

    let assign = assign_role_user_handler(
        app.state(),
        Extension(app.context(staff).await),
        Path("staff_user".to_owned()),
        Json(RoleUserRequest {
            user_id: "not-a-uuid".to_owned(),
        }),
    )
    .await;
    let error = assign.err().unwrap_or_else(|| unreachable!());
    assert_eq!(status_of(error), StatusCode::FORBIDDEN);
}
