use axum::extract::State;
use axum::http::StatusCode;
use sea_orm::DatabaseConnection;

use crate::state::AppState;

/// `GET /healthz` — the process is up.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// `GET /readyz` — the service can do work. Without the database the whole
/// login funnel is down, so readiness is a ping against it.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(&state.db).await
}

async fn readiness(db: &DatabaseConnection) -> StatusCode {
    match db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness probe failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
