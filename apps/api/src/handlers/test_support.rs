use std::sync::Arc;

use assetkeep_application::{
    NewUser, ProvisioningService, UserAccessRepository, UserContext, UserDirectory,
};
use assetkeep_core::NonEmptyString;
use assetkeep_domain::{RoleName, UserId, UserStatus};
use assetkeep_infrastructure::InMemoryRbacRepository;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::api_services::{RepositorySet, assemble_app_state};
use crate::error::ApiError;
use crate::state::AppState;

/// Application state over a provisioned in-memory store.
pub(crate) struct TestApp {
    pub repository: Arc<InMemoryRbacRepository>,
    pub state: AppState,
}

impl TestApp {
    pub async fn provisioned() -> Self {
        let repository = Arc::new(InMemoryRbacRepository::new());
        let provisioned = ProvisioningService::new(
            repository.clone(),
            repository.clone(),
            repository.clone(),
        )
        .provision()
        .await;
        assert!(provisioned.is_ok());

        let state = assemble_app_state(
            RepositorySet {
                authorization_repository: repository.clone(),
                user_directory: repository.clone(),
                role_repository: repository.clone(),
                user_access_repository: repository.clone(),
                permission_repository: repository.clone(),
                audit_repository: repository.clone(),
            },
            "http://localhost:3000".to_owned(),
            "bootstrap-token".to_owned(),
        );

        Self { repository, state }
    }

    pub fn state(&self) -> State<AppState> {
        State(self.state.clone())
    }

    /// Creates an active user holding the given roles.
    pub async fn user_with_roles(&self, display_name: &str, roles: &[&str]) -> UserId {
        let user_id = UserId::new();
        let created = self
            .repository
            .create_user(NewUser {
                user_id,
                display_name: NonEmptyString::new(display_name)
                    .unwrap_or_else(|_| unreachable!()),
                email: None,
                status: UserStatus::Active,
            })
            .await;
        assert!(created.is_ok());

        for role in roles {
            let role_name = RoleName::new(*role).unwrap_or_else(|_| unreachable!());
            let assigned = self.repository.assign_role(user_id, &role_name).await;
            assert!(assigned.is_ok());
        }

        user_id
    }

    /// Builds a fresh request context for the user.
    pub async fn context(&self, user_id: UserId) -> UserContext {
        self.state
            .authorization_service
            .user_context(user_id)
            .await
            .unwrap_or_else(|error| panic!("user context should resolve: {error}"))
    }
}

pub(crate) fn status_of(error: ApiError) -> StatusCode {
    error.into_response().status()
}
