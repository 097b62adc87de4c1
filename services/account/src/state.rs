use std::sync::Arc;

use sea_orm::DatabaseConnection;

use clickgate_core::seal::Sealer;

use crate::infra::db::{DbOtpRepository, DbUserRepository};
use crate::infra::mail::SmtpMailer;
use crate::registry::ConnectionRegistry;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub registry: Arc<ConnectionRegistry>,
    pub sealer: Arc<Sealer>,
    pub mailer: SmtpMailer,
    pub session_secret: String,
    /// Public origin for confirmation links, e.g. `https://example.com`.
    pub base_url: String,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_repo(&self) -> DbOtpRepository {
        DbOtpRepository {
            db: self.db.clone(),
        }
    }

    pub fn mailer(&self) -> SmtpMailer {
        self.mailer.clone()
    }
}
