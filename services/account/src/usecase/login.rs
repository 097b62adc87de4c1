use chrono::{DateTime, Duration, Utc};
use sha1::{Digest, Sha1};
use uuid::Uuid;

use clickgate_core::password::verify_password;

use crate::domain::repository::{MailPort, OtpRepository, UserPort};
use crate::domain::types::{AccountUser, OTP_TTL_SECS, OtpCredential};
use crate::error::AccountError;

pub struct IssueOtpInput {
    pub email: String,
    pub password: String,
}

/// Result of a successful password check: either a fresh credential was
/// minted and delivered, or a live one already exists and nothing was done.
/// Both branches send the caller to the waiting page; only `Issued` carries
/// the material for the sealed correlation cookies.
#[derive(Debug)]
pub enum IssueOutcome {
    Issued {
        user: AccountUser,
        request_id: Uuid,
        expires_at: DateTime<Utc>,
    },
    AlreadyPending { user: AccountUser },
}

pub struct IssueOtpUseCase<U, O, M>
where
    U: UserPort,
    O: OtpRepository,
    M: MailPort,
{
    pub users: U,
    pub otps: O,
    pub mailer: M,
    /// Public origin used to build confirmation links, e.g. `https://example.com`.
    pub base_url: String,
}

impl<U, O, M> IssueOtpUseCase<U, O, M>
where
    U: UserPort,
    O: OtpRepository,
    M: MailPort,
{
    pub async fn execute(&self, input: IssueOtpInput) -> Result<IssueOutcome, AccountError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(AccountError::InvalidLogin)?;
        if !verify_password(&input.password, &user.password_hash) {
            return Err(AccountError::InvalidLogin);
        }

        // The link carries the expiry as Unix seconds, so the stored expiry
        // is reconstructed from that same integer: confirmation later matches
        // on exact equality.
        let now = Utc::now();
        let ts = (now + Duration::seconds(OTP_TTL_SECS)).timestamp();
        let expires_at = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| AccountError::Internal(anyhow::anyhow!("expiry out of range")))?;

        // "Already sent" check: while a live credential exists it stays the
        // only valid one — no second mint, no second email. Best-effort under
        // concurrency; two racing logins may both pass (accepted, both
        // credentials validate independently).
        if self.otps.find_live_by_user(user.id).await?.is_some() {
            return Ok(IssueOutcome::AlreadyPending { user });
        }

        let request_id = Uuid::new_v4();
        let otp = OtpCredential {
            request_id,
            user_id: user.id,
            expires_at,
            secret: confirmation_digest(user.id, &user.email, ts),
            created_at: now,
        };

        // Deliver before persisting: a delivery failure must abort the flow
        // with no credential written, so the client is never told to check a
        // mailbox that received nothing.
        let link = format!(
            "{}/Account/Otp/{}/{}",
            self.base_url.trim_end_matches('/'),
            request_id,
            ts
        );
        let body = format!(
            "Hello! Please <a href=\"{link}\">click here</a> to login. \
             This link has validity of 3 minutes."
        );
        self.mailer.send(&user.email, "Your OTP link", &body).await?;
        tracing::info!(user_id = %user.id, "otp email sent");

        self.otps.insert(&otp).await?;

        Ok(IssueOutcome::Issued {
            user,
            request_id,
            expires_at,
        })
    }
}

/// Hex SHA-1 over `{user_id}_{email}_{ts}` — the credential's reserved
/// hardening field.
fn confirmation_digest(user_id: Uuid, email: &str, ts: i64) -> String {
    let digest = Sha1::digest(format!("{user_id}_{email}_{ts}").as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
