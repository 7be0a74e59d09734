use std::sync::Arc;

use pitchside::api::{routes::create_routes, AppState};
use pitchside::auth::AuthService;
use pitchside::config::{run_migrations, AppConfig, DatabaseConfig};
use pitchside::services::{
    DocumentService, EmailService, LlmConfig, ReminderScheduler, SmtpConfig, StorageConfig,
    SuggestionService,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let db_config = DatabaseConfig::from_env()?;
    let db = db_config.create_pool().await?;
    run_migrations(&db).await?;
    info!("database ready");

    let auth = AuthService::new(db.clone(), &config.jwt_secret);
    let email = Arc::new(EmailService::new(SmtpConfig::from_env())?);
    let suggestions = Arc::new(SuggestionService::new(LlmConfig::from_env())?);
    let documents = DocumentService::new(db.clone(), StorageConfig::from_env());

    // Keep the handle alive for the lifetime of the server.
    let _reminders = ReminderScheduler::start(db.clone(), email.clone()).await?;

    let state = AppState {
        db,
        auth,
        email,
        suggestions,
        documents,
        config: config.clone(),
    };
    let app = create_routes(state);

    let listener = TcpListener::bind(config.server_address()).await?;
    info!(
        "Pitchside server starting on http://{}",
        config.server_address()
    );
    axum::serve(listener, app).await?;

    Ok(())
}
