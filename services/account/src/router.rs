use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    account::{awaiting, check_otp_authenticity, confirm_otp, login, secret},
    health::{healthz, readyz},
    hub::notification_hub,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Account
        .route("/Account/Login", post(login))
        .route("/Account/Awaiting", get(awaiting))
        .route("/Account/Otp/{request_id}/{time_stamp}", get(confirm_otp))
        .route(
            "/Account/CheckOtpAuthenticity/{user_id}",
            get(check_otp_authenticity),
        )
        .route("/Account/Secret", get(secret))
        // Real-time notification hub
        .route("/NotificationHubOtp", get(notification_hub))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
