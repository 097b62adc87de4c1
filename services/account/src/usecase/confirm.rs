use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::repository::{Notifier, OtpRepository, UserPort};
use crate::domain::types::{CONFIRM_WINDOW_SECS, HubEvent};
use crate::error::AccountError;

pub struct ConfirmOtpInput {
    /// Raw request-id path segment; an unparsable id rejects like an
    /// unknown one.
    pub request_id: String,
    /// Unix-seconds expiry as encoded in the confirmation link.
    pub ts: i64,
}

pub struct ConfirmOtpUseCase<U, O, N>
where
    U: UserPort,
    O: OtpRepository,
    N: Notifier,
{
    pub users: U,
    pub otps: O,
    pub notifier: N,
}

impl<U, O, N> ConfirmOtpUseCase<U, O, N>
where
    U: UserPort,
    O: OtpRepository,
    N: Notifier,
{
    /// The confirmation funnel. Each gate is a distinct rejection; none of
    /// them throws. On success the owning user's live connections are
    /// notified and the user id is returned for the redirect.
    ///
    /// Store liveness is deliberately NOT a gate here: the link-age window
    /// (1800 s) and the exact-expiry match are the two checks, independent of
    /// each other and of `expires_at > now`.
    pub async fn execute(&self, input: ConfirmOtpInput) -> Result<Uuid, AccountError> {
        if input.ts < 0 {
            return Err(AccountError::OtpNotValid);
        }
        if Utc::now().timestamp() - input.ts > CONFIRM_WINDOW_SECS {
            return Err(AccountError::OtpExpired);
        }

        let request_id =
            Uuid::parse_str(&input.request_id).map_err(|_| AccountError::OtpNotValid)?;
        let otp = self
            .otps
            .find_by_request_id(request_id)
            .await?
            .ok_or(AccountError::OtpNotValid)?;

        let user = self
            .users
            .find_by_id(otp.user_id)
            .await?
            .ok_or(AccountError::AuthenticationFailed)?;

        // Re-derive the expected expiry from the link's timestamp and demand
        // an exact match for this user: a valid-looking but mismatched
        // (request id, ts) pair is rejected.
        let expected = DateTime::from_timestamp(input.ts, 0).ok_or(AccountError::OtpNotValid)?;
        self.otps
            .find_by_user_and_expiry(user.id, expected)
            .await?
            .ok_or(AccountError::OtpNotValid)?;

        // Fire-and-forget relative to the HTTP response: a push failure is
        // reported to the same group as a second event, never to the caller.
        if let Err(push_err) = self.notifier.notify(user.id, HubEvent::authenticated()) {
            tracing::warn!(user_id = %user.id, error = %push_err, "hub push failed");
            let _ = self
                .notifier
                .notify(user.id, HubEvent::error(push_err.to_string()));
        }

        Ok(user.id)
    }
}
