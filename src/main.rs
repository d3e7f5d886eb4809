use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use medcard::config::AppConfig;
use medcard::db;
use medcard::handlers;
use medcard::services::mailer::mailgun::MailgunMailer;
use medcard::services::mailer::{ConsoleMailer, MailerProvider};
use medcard::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let mailer: Box<dyn MailerProvider> = if config.mailgun_api_key.is_empty() {
        tracing::info!("MAILGUN_API_KEY not set, verification codes go to the log");
        Box::new(ConsoleMailer)
    } else {
        anyhow::ensure!(
            !config.mailgun_domain.is_empty(),
            "MAILGUN_DOMAIN must be set when MAILGUN_API_KEY is set"
        );
        tracing::info!("using Mailgun mailer (domain: {})", config.mailgun_domain);
        Box::new(MailgunMailer::new(
            config.mailgun_domain.clone(),
            config.mailgun_api_key.clone(),
            config.mail_from.clone(),
        ))
    };

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        mailer,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/patients", post(handlers::patients::signup))
        .route("/api/verify-email", post(handlers::patients::verify_email))
        .route("/api/login", post(handlers::patients::login))
        .route(
            "/api/patients/:username",
            get(handlers::patients::get_profile).put(handlers::patients::update_profile),
        )
        .route("/api/doctors/:id", get(handlers::doctors::get_doctor))
        .route("/api/clinics", get(handlers::clinics::list_clinics))
        .route(
            "/api/appointments",
            post(handlers::appointments::create_appointment)
                .get(handlers::appointments::list_appointments),
        )
        .route(
            "/api/appointments/:id",
            get(handlers::appointments::get_appointment)
                .put(handlers::appointments::update_appointment),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
