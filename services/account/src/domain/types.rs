use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// User data needed by the login flow (lookup + password verification).
#[derive(Debug, Clone)]
pub struct AccountUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

/// One-time login-confirmation credential. Immutable after creation; its
/// only state transition (live → expired) is observed at query time.
#[derive(Debug, Clone)]
pub struct OtpCredential {
    pub request_id: Uuid,
    pub user_id: Uuid,
    /// Whole-second expiry, reconstructible from the link's Unix timestamp.
    pub expires_at: DateTime<Utc>,
    pub secret: String,
    pub created_at: DateTime<Utc>,
}

impl OtpCredential {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Event pushed to a user's live connections over the notification hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubEvent {
    pub event: &'static str,
    pub data: String,
}

impl HubEvent {
    pub fn authenticated() -> Self {
        Self {
            event: RECEIVE_MSG,
            data: "Authenticated".to_owned(),
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            event: RECEIVE_MSG_ERROR,
            data: detail.into(),
        }
    }
}

/// Server-to-client event carrying the confirmation string.
pub const RECEIVE_MSG: &str = "ReceiveMsg";

/// Server-to-client event carrying a push-failure detail.
pub const RECEIVE_MSG_ERROR: &str = "ReceiveMsgError";

/// OTP lifetime at issuance: 3 minutes.
pub const OTP_TTL_SECS: i64 = 180;

/// Maximum accepted age of a confirmation link, in seconds. Intentionally
/// looser than the issuance lifetime: link age and stored expiry are two
/// independent gates, matching the observed policy.
pub const CONFIRM_WINDOW_SECS: i64 = 1800;

/// Sealed correlation cookies handed to the client at issuance.
pub const USER_ID_COOKIE: &str = "UserId";
pub const USER_EMAIL_COOKIE: &str = "UserEmail";
pub const OTP_ACTIVE_COOKIE: &str = "OtpActive";
pub const REQ_ID_COOKIE: &str = "ReqId";
