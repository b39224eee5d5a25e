//! User domain types.

use std::str::FromStr;

use assetkeep_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a user display name.
pub const USER_DISPLAY_NAME_MAX_LENGTH: usize = 255;

/// Maximum length of a user email address.
pub const USER_EMAIL_MAX_LENGTH: usize = 255;

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Parses a transport value into a user identifier.
    pub fn parse(value: &str) -> AppResult<Self> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid user id '{value}': {error}")))
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Account status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Account may sign in and act.
    Active,
    /// Account is disabled by an administrator.
    Inactive,
    /// Account is temporarily blocked.
    Suspended,
}

impl UserStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }

    /// Returns whether the status is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl FromStr for UserStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            _ => Err(AppError::Validation(format!(
                "unknown user status '{value}'"
            ))),
        }
    }
}

/// Trims and lowercases an email address after a shape check.
pub fn normalize_email(value: &str) -> AppResult<String> {
    let value = value.trim().to_lowercase();
    if value.chars().count() > USER_EMAIL_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "email must not exceed {USER_EMAIL_MAX_LENGTH} characters"
        )));
    }

    let well_formed = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !well_formed {
        return Err(AppError::Validation(format!(
            "invalid email address '{value}'"
        )));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{UserId, UserStatus, normalize_email};

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  Clerk@Example.ORG ").ok().as_deref(),
            Some("clerk@example.org")
        );
        assert!(normalize_email("clerk@example").is_err());
        assert!(normalize_email("clerk at example.org").is_err());
        assert!(normalize_email("@example.org").is_err());
        assert!(normalize_email("a@b@example.org").is_err());
    }

    #[test]
    fn user_id_parse_rejects_garbage() {
        assert!(UserId::parse("not-a-uuid").is_err());

        let user_id = UserId::new();
        assert_eq!(UserId::parse(&user_id.to_string()).ok(), Some(user_id));
    }

    #[test]
    fn only_active_status_is_active() {
        assert!(UserStatus::Active.is_active());
        assert!(!UserStatus::Suspended.is_active());
        assert_eq!(
            UserStatus::from_str("inactive").ok(),
            Some(UserStatus::Inactive)
        );
        assert!(UserStatus::from_str("deleted").is_err());
    }
}
