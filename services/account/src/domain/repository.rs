#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{AccountUser, HubEvent, OtpCredential};
use crate::error::AccountError;
use crate::registry::PushError;

/// Port for the identity provider. Password hashing and lockout policy live
/// behind this boundary; the login flow only looks users up and checks a
/// password against the stored hash.
pub trait UserPort: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountUser>, AccountError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountUser>, AccountError>;
}

/// Repository for one-time login-confirmation credentials.
pub trait OtpRepository: Send + Sync {
    /// Find a live (unexpired) credential for a user, if any. Used by the
    /// issuer's "already sent" check and the polling fallback.
    async fn find_live_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<OtpCredential>, AccountError>;

    /// Insert a freshly minted credential.
    async fn insert(&self, otp: &OtpCredential) -> Result<(), AccountError>;

    /// Find a credential by its public request id, live or not.
    async fn find_by_request_id(
        &self,
        request_id: Uuid,
    ) -> Result<Option<OtpCredential>, AccountError>;

    /// Find a credential by owner and *exact* expiry. The confirmation
    /// handler re-derives the expiry from the link's timestamp and requires
    /// equality; a near-miss is a rejection, not a match.
    async fn find_by_user_and_expiry(
        &self,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<OtpCredential>, AccountError>;

    /// Delete every credential (any user) whose expiry has passed.
    /// Returns the number of rows removed.
    async fn delete_expired(&self) -> Result<u64, AccountError>;
}

/// Port for the mail-sending capability. Non-acceptance by the transport
/// must surface as an error; the issuer treats it as fatal to the flow.
pub trait MailPort: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), AccountError>;
}

/// Port for pushing events to a user's live connections. Zero connections
/// is a no-op success; a delivery problem is reported, never panicked.
pub trait Notifier: Send + Sync {
    fn notify(&self, user_id: Uuid, event: HubEvent) -> Result<(), PushError>;
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, user_id: Uuid, event: HubEvent) -> Result<(), PushError> {
        (**self).notify(user_id, event)
    }
}
