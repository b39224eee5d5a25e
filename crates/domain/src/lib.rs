//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod permission;
mod role;
mod user;

pub use audit::AuditAction;
pub use permission::Permission;
pub use role::{
    ROLE_DESCRIPTION_MAX_LENGTH, ROLE_DISPLAY_NAME_MAX_LENGTH, ROLE_NAME_MAX_LENGTH, RoleName,
    SUPER_ADMINISTRATOR_ROLE, SystemRole,
};
pub use user::{
    USER_DISPLAY_NAME_MAX_LENGTH, USER_EMAIL_MAX_LENGTH, UserId, UserStatus, normalize_email,
};
