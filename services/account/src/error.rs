use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Account service error variants, one per branch of the login funnel.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Unknown email or wrong password. One message for both — the login
    /// form must not reveal which part was wrong.
    #[error("Invalid login attempt.")]
    InvalidLogin,
    /// No credential matches the supplied request id / expiry pair.
    #[error("Otp code not valid.")]
    OtpNotValid,
    /// The confirmation link is older than the accepted window.
    #[error("Otp code expired.")]
    OtpExpired,
    /// The credential references a user that no longer resolves.
    #[error("Authentication failed.")]
    AuthenticationFailed,
    /// The mail capability did not accept the confirmation email. Must never
    /// be swallowed as a successful issuance.
    #[error("Could not send the confirmation email.")]
    DeliveryFailed,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AccountError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidLogin => "INVALID_LOGIN",
            Self::OtpNotValid => "OTP_NOT_VALID",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::DeliveryFailed => "DELIVERY_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// The message surfaced to the browser when the confirmation funnel
    /// redirects back to the login page. Internal detail is not leaked.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidLogin => "Invalid login attempt.",
            Self::OtpNotValid => "Otp code not valid.",
            Self::OtpExpired => "Otp code expired.",
            Self::AuthenticationFailed | Self::Internal(_) => "Authentication failed.",
            Self::DeliveryFailed => "Could not send the confirmation email.",
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidLogin
            | Self::OtpNotValid
            | Self::OtpExpired
            | Self::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            Self::DeliveryFailed => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
