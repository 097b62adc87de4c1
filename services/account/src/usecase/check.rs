use uuid::Uuid;

use crate::domain::repository::{OtpRepository, UserPort};
use crate::domain::types::AccountUser;
use crate::error::AccountError;

pub struct CheckOtpUseCase<U, O>
where
    U: UserPort,
    O: OtpRepository,
{
    pub users: U,
    pub otps: O,
}

impl<U, O> CheckOtpUseCase<U, O>
where
    U: UserPort,
    O: OtpRepository,
{
    /// Polling fallback for clients that missed the hub push. `Ok(None)`
    /// means no live credential — the caller answers `success=false` with no
    /// side effects, which makes repeated calls after expiry idempotent.
    ///
    /// When a live credential is found, all already-expired credentials are
    /// swept — every user's, not just this one's. The broad scope is the
    /// observed cleanup policy; narrowing it would change when other users'
    /// stale rows disappear.
    pub async fn execute(&self, user_id: Uuid) -> Result<Option<AccountUser>, AccountError> {
        if self.otps.find_live_by_user(user_id).await?.is_none() {
            return Ok(None);
        }

        let swept = self.otps.delete_expired().await?;
        if swept > 0 {
            tracing::debug!(swept, "removed expired otp credentials");
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AccountError::AuthenticationFailed)?;
        Ok(Some(user))
    }
}
