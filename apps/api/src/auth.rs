mod bootstrap;
mod session;

pub use bootstrap::bootstrap_handler;
pub use session::{logout_handler, me_handler};

pub const SESSION_USER_KEY: &str = "user_identity";
/// Session creation timestamp used for absolute timeout enforcement.
pub const SESSION_CREATED_AT_KEY: &str = "session_created_at";
/// Hours after which a session expires regardless of activity.
pub const SESSION_ABSOLUTE_LIFETIME_HOURS: i64 = 12;
