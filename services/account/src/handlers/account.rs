use axum::{
    Form, Json,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cookie::{SESSION_COOKIE, set_sealed_cookie, set_session_cookie};
use crate::domain::types::{
    OTP_ACTIVE_COOKIE, REQ_ID_COOKIE, USER_EMAIL_COOKIE, USER_ID_COOKIE,
};
use crate::error::AccountError;
use crate::state::AppState;
use crate::usecase::check::CheckOtpUseCase;
use crate::usecase::confirm::{ConfirmOtpInput, ConfirmOtpUseCase};
use crate::usecase::login::{IssueOtpInput, IssueOtpUseCase, IssueOutcome};
use crate::usecase::session::{issue_session_token, validate_session_token};

// ── POST /Account/Login ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Parsed for form compatibility; the second factor decides the session,
    /// and the polling sign-in is always persistent.
    #[serde(default)]
    pub remember_me: bool,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AccountError> {
    let usecase = IssueOtpUseCase {
        users: state.user_repo(),
        otps: state.otp_repo(),
        mailer: state.mailer(),
        base_url: state.base_url.clone(),
    };
    let outcome = usecase
        .execute(IssueOtpInput {
            email: form.email,
            password: form.password,
        })
        .await?;

    // Correlation cookies only accompany a fresh issuance; with an OTP
    // already pending the client keeps the ones it has.
    let jar = match &outcome {
        IssueOutcome::Issued {
            user,
            request_id,
            expires_at,
        } => {
            let ttl = (*expires_at - Utc::now()).num_seconds().max(0);
            let jar = set_sealed_cookie(
                jar,
                USER_ID_COOKIE,
                state.sealer.seal(&user.id.to_string())?,
                ttl,
            );
            let jar = set_sealed_cookie(jar, USER_EMAIL_COOKIE, state.sealer.seal(&user.email)?, ttl);
            let jar = set_sealed_cookie(jar, OTP_ACTIVE_COOKIE, state.sealer.seal("true")?, ttl);
            set_sealed_cookie(jar, REQ_ID_COOKIE, state.sealer.seal(&request_id.to_string())?, ttl)
        }
        IssueOutcome::AlreadyPending { .. } => jar,
    };

    Ok((jar, Redirect::to("/Account/Awaiting")))
}

// ── GET /Account/Awaiting ─────────────────────────────────────────────────────

const AWAITING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Awaiting confirmation</title></head>
<body>
  <p>We sent you a confirmation link. This page completes automatically once
  you click it.</p>
  <script>
    const sealedUserId = "{{sealed_user_id}}";
    function checkAuthenticity() {
      fetch("/Account/CheckOtpAuthenticity/" + sealedUserId)
        .then(r => r.json())
        .then(res => { if (res.success) setTimeout(() => location.href = "/Home", 3000); });
    }
    const proto = location.protocol === "https:" ? "wss://" : "ws://";
    const ws = new WebSocket(proto + location.host + "/NotificationHubOtp");
    ws.onmessage = e => {
      const msg = JSON.parse(e.data);
      if (msg.event === "ReceiveMsg") checkAuthenticity();
    };
    // Fallback when the push channel is unavailable. A flapping socket
    // fires onerror repeatedly; only the first error starts the poller.
    let poller = null;
    ws.onerror = () => {
      if (!poller) poller = setInterval(checkAuthenticity, 5000);
    };
  </script>
</body>
</html>
"#;

pub async fn awaiting(jar: CookieJar) -> Html<String> {
    // The sealed user id is already client-held (it IS the cookie value);
    // embedding it lets the page call the polling endpoint.
    let sealed = jar
        .get(USER_ID_COOKIE)
        .map(|c| c.value().to_owned())
        .unwrap_or_default();
    Html(AWAITING_PAGE.replace("{{sealed_user_id}}", &sealed))
}

// ── GET /Account/Otp/{request_id}/{time_stamp} ────────────────────────────────

pub async fn confirm_otp(
    State(state): State<AppState>,
    Path((request_id, time_stamp)): Path<(String, i64)>,
) -> impl IntoResponse {
    let usecase = ConfirmOtpUseCase {
        users: state.user_repo(),
        otps: state.otp_repo(),
        notifier: state.registry.clone(),
    };
    match usecase
        .execute(ConfirmOtpInput {
            request_id,
            ts: time_stamp,
        })
        .await
    {
        Ok(user_id) => {
            tracing::info!(%user_id, "otp confirmed");
            Redirect::to("/Home")
        }
        Err(err) => {
            if let AccountError::Internal(ref e) = err {
                tracing::error!(error = %e, "otp confirmation failed");
            }
            Redirect::to(&login_redirect(err.user_message()))
        }
    }
}

/// Redirect back to the login entry point carrying the user-facing message.
fn login_redirect(message: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("error", message)
        .finish();
    format!("/Account/Login?{query}")
}

// ── GET /Account/CheckOtpAuthenticity/{user_id} ───────────────────────────────

#[derive(Serialize)]
pub struct CheckOtpResponse {
    pub success: bool,
    pub message: String,
}

const NOT_VALID_MSG: &str = "Otp not valid or expired. Please try again.";
const VALID_MSG: &str = "<b>Valid OTP!</b> Redirect in 3 seconds...";

fn check_failure(message: &str) -> Json<CheckOtpResponse> {
    Json(CheckOtpResponse {
        success: false,
        message: message.to_owned(),
    })
}

pub async fn check_otp_authenticity(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(sealed_user_id): Path<String>,
) -> Result<(CookieJar, Json<CheckOtpResponse>), AccountError> {
    // Unseal failure (or a forged payload) reads as "no valid OTP", not as
    // an internal fault.
    let Ok(unsealed) = state.sealer.unseal(&sealed_user_id) else {
        return Ok((jar, check_failure(NOT_VALID_MSG)));
    };
    let Ok(user_id) = Uuid::parse_str(&unsealed) else {
        return Ok((jar, check_failure(NOT_VALID_MSG)));
    };

    let usecase = CheckOtpUseCase {
        users: state.user_repo(),
        otps: state.otp_repo(),
    };
    match usecase.execute(user_id).await {
        Ok(Some(user)) => {
            let (token, _) = issue_session_token(user.id, &state.session_secret, true)?;
            let jar = set_session_cookie(jar, token, true);
            Ok((
                jar,
                Json(CheckOtpResponse {
                    success: true,
                    message: VALID_MSG.to_owned(),
                }),
            ))
        }
        Ok(None) => Ok((jar, check_failure(NOT_VALID_MSG))),
        Err(AccountError::AuthenticationFailed) => {
            Ok((jar, check_failure("Authentication failed.")))
        }
        Err(err) => Err(err),
    }
}

// ── GET /Account/Secret ───────────────────────────────────────────────────────

pub async fn secret(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
        return Redirect::to("/Account/Login").into_response();
    };
    match validate_session_token(&token, &state.session_secret) {
        Ok(user_id) => Json(serde_json::json!({
            "user_id": user_id,
            "message": "This is the secret area.",
        }))
        .into_response(),
        Err(_) => Redirect::to("/Account/Login").into_response(),
    }
}
