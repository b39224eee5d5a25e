use std::sync::Arc;

use assetkeep_domain::UserId;
use tokio::sync::Mutex;

use crate::UserAccount;

use super::EffectivePermissions;

type PermissionMemo = Arc<Mutex<Option<Arc<EffectivePermissions>>>>;

/// Request-scoped identity of the acting user.
///
/// A context memoizes the user's effective permissions after the first check.
/// Clones share the memo, so a context must be built per request and never
/// stored beyond it.
#[derive(Debug, Clone)]
pub struct UserContext {
    account: UserAccount,
    memo: PermissionMemo,
}

impl UserContext {
    /// Creates a context with an empty permission memo.
    #[must_use]
    pub fn new(account: UserAccount) -> Self {
        Self {
            account,
            memo: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the acting user's identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.account.user_id
    }

    /// Returns the acting user's account projection.
    #[must_use]
    pub fn account(&self) -> &UserAccount {
        &self.account
    }

    /// Drops the memoized permission set so the next check reloads edges.
    pub async fn invalidate_permissions(&self) {
        *self.memo.lock().await = None;
    }

    /// Invalidates the memo when the context belongs to `user_id`.
    pub async fn invalidate_if_user(&self, user_id: UserId) {
        if self.user_id() == user_id {
            self.invalidate_permissions().await;
        }
    }

    pub(super) fn memo(&self) -> &Mutex<Option<Arc<EffectivePermissions>>> {
        &self.memo
    }
}
