use assetkeep_core::AppError;
use assetkeep_domain::{AuditAction, Permission, UserId, UserStatus};

use crate::test_support::Harness;

use super::{CreateUserInput, UpdateUserInput};

fn clerk_input(email: &str) -> CreateUserInput {
    CreateUserInput {
        display_name: "Casey Clerk".to_owned(),
        email: Some(email.to_owned()),
        ..CreateUserInput::default()
    }
}

#[tokio::test]
async fn create_user_defaults_to_active_and_rejects_taken_email() {
    let harness = Harness::new();
    let admin = harness.actor_with(&[Permission::UsersCreate]).await;

    let created = harness
        .user_service
        .create_user(Some(&admin), clerk_input(" Casey@Example.org "))
        .await
        .unwrap_or_else(|error| panic!("user creation failed: {error}"));
    assert_eq!(created.status, UserStatus::Active);
    assert_eq!(created.email.as_deref(), Some("casey@example.org"));

    let duplicate = harness
        .user_service
        .create_user(Some(&admin), clerk_input("casey@example.org"))
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let events = harness.audit.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::UserCreated);
}

#[tokio::test]
async fn create_user_validates_after_access_check() {
    let harness = Harness::new();
    let outsider = harness.actor_with(&[Permission::UsersView]).await;
    let admin = harness.actor_with(&[Permission::UsersCreate]).await;

    let mut input = clerk_input("not-an-email");
    input.status = Some("retired".to_owned());

    let denied = harness
        .user_service
        .create_user(Some(&outsider), input.clone())
        .await;
    assert!(matches!(denied, Err(AppError::Unauthorized(_))));

    let invalid = harness.user_service.create_user(Some(&admin), input).await;
    assert!(matches!(invalid, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn create_user_with_roles_requires_role_assignment() {
    let harness = Harness::new();
    let creator = harness.actor_with(&[Permission::UsersCreate]).await;
    let admin = harness
        .actor_with(&[Permission::UsersCreate, Permission::RolesAssign])
        .await;
    let clerk = harness
        .store
        .add_role("inventory_clerk", &[Permission::ItemsCreate], false)
        .await;

    let mut input = clerk_input("casey@example.org");
    input.roles = vec!["inventory_clerk".to_owned()];

    let denied = harness
        .user_service
        .create_user(Some(&creator), input.clone())
        .await;
    assert!(matches!(denied, Err(AppError::Unauthorized(_))));

    let mut unknown = input.clone();
    unknown.roles = vec!["phantom".to_owned()];
    let missing = harness.user_service.create_user(Some(&admin), unknown).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let created = harness
        .user_service
        .create_user(Some(&admin), input)
        .await
        .unwrap_or_else(|error| panic!("user creation failed: {error}"));
    let context = harness.context(created.user_id).await;
    let effective = harness
        .authorization_service
        .effective_permissions(&context)
        .await;
    assert!(effective.is_ok_and(|effective| {
        effective.roles().contains(&clerk) && effective.contains(Permission::ItemsCreate)
    }));
}

#[tokio::test]
async fn list_users_filters_by_search_and_status() {
    let harness = Harness::new();
    let viewer = harness.actor_with(&[Permission::UsersViewAny]).await;
    let suspended = harness.store.add_user("Morgan Mover").await;
    harness.store.add_user("Casey Clerk").await;
    let updater = harness.actor_with(&[Permission::UsersUpdate]).await;
    let updated = harness
        .user_service
        .update_user(
            Some(&updater),
            &suspended.to_string(),
            UpdateUserInput {
                status: Some("suspended".to_owned()),
                ..UpdateUserInput::default()
            },
        )
        .await;
    assert!(updated.is_ok());

    let searched = harness
        .user_service
        .list_users(Some(&viewer), Some("clerk".to_owned()), None)
        .await;
    assert!(searched.is_ok_and(|users| {
        users.len() == 1 && users[0].display_name == "Casey Clerk"
    }));

    let filtered = harness
        .user_service
        .list_users(Some(&viewer), None, Some("suspended"))
        .await;
    assert!(filtered.is_ok_and(|users| users.len() == 1 && users[0].user_id == suspended));

    let bad_status = harness
        .user_service
        .list_users(Some(&viewer), None, Some("retired"))
        .await;
    assert!(matches!(bad_status, Err(AppError::Validation(_))));

    let denied = harness
        .user_service
        .list_users(Some(&updater), None, None)
        .await;
    assert!(matches!(denied, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn get_user_reports_roles_and_direct_grants() {
    let harness = Harness::new();
    let viewer = harness.actor_with(&[Permission::UsersView]).await;
    let auditor = harness
        .store
        .add_role("auditor", &[Permission::ReportsView], false)
        .await;
    let user_id = harness.store.add_user("Avery Auditor").await;
    harness.store.assign(user_id, &auditor).await;
    harness
        .store
        .grant_direct(user_id, &[Permission::ReportsExport])
        .await;

    let detail = harness
        .user_service
        .get_user(Some(&viewer), &user_id.to_string())
        .await
        .unwrap_or_else(|error| panic!("user lookup failed: {error}"));
    assert_eq!(detail.account.display_name, "Avery Auditor");
    assert!(detail.roles.contains(&auditor));
    assert!(detail.direct_permissions.contains(&Permission::ReportsExport));
    assert!(!detail.direct_permissions.contains(&Permission::ReportsView));

    let missing = harness
        .user_service
        .get_user(Some(&viewer), &UserId::new().to_string())
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let malformed = harness
        .user_service
        .get_user(Some(&viewer), "not-a-uuid")
        .await;
    assert!(matches!(malformed, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn update_user_changes_status_and_blocks_self_deactivation() {
    let harness = Harness::new();
    let admin = harness.actor_with(&[Permission::UsersUpdate]).await;
    let user_id = harness.store.add_user("Casey Clerk").await;

    let suspended = harness
        .user_service
        .update_user(
            Some(&admin),
            &user_id.to_string(),
            UpdateUserInput {
                display_name: Some("Casey C.".to_owned()),
                status: Some("suspended".to_owned()),
                ..UpdateUserInput::default()
            },
        )
        .await;
    assert!(suspended.is_ok_and(|account| {
        account.status == UserStatus::Suspended && account.display_name == "Casey C."
    }));

    let self_deactivation = harness
        .user_service
        .update_user(
            Some(&admin),
            &admin.user_id().to_string(),
            UpdateUserInput {
                status: Some("inactive".to_owned()),
                ..UpdateUserInput::default()
            },
        )
        .await;
    assert!(matches!(self_deactivation, Err(AppError::Validation(_))));

    let events = harness.audit.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::UserUpdated);
    assert!(
        events[0]
            .detail
            .as_deref()
            .is_some_and(|detail| detail.contains("active -> suspended"))
    );
}

#[tokio::test]
async fn update_user_rejects_unknown_users() {
    let harness = Harness::new();
    let admin = harness.actor_with(&[Permission::UsersUpdate]).await;

    let missing = harness
        .user_service
        .update_user(
            Some(&admin),
            &UserId::new().to_string(),
            UpdateUserInput::default(),
        )
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}
