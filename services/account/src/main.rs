use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use clickgate_account::config::AccountConfig;
use clickgate_account::infra::mail::SmtpMailer;
use clickgate_account::registry::ConnectionRegistry;
use clickgate_account::router::build_router;
use clickgate_account::state::AppState;
use clickgate_core::seal::Sealer;

#[tokio::main]
async fn main() {
    clickgate_core::tracing::init_tracing();

    let config = AccountConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let sealer = Sealer::from_base64_key(&config.seal_key).expect("invalid SEAL_KEY");
    let mailer =
        SmtpMailer::new(&config.smtp_url, &config.mail_from).expect("invalid SMTP configuration");

    let state = AppState {
        db,
        registry: Arc::new(ConnectionRegistry::new()),
        sealer: Arc::new(sealer),
        mailer,
        session_secret: config.session_secret,
        base_url: config.base_url,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.account_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("account service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
