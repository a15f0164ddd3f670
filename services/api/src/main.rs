use sea_orm::Database;
use tracing::{info, warn};

use hbnb_api::config::ApiConfig;
use hbnb_api::infra::cache::{MemoryTwoFactorStore, RedisTwoFactorStore, TwoFactorBackend};
use hbnb_api::infra::mail::{LogMailer, MailBackend, SmtpMailer};
use hbnb_api::infra::password::Argon2Hasher;
use hbnb_api::infra::storage::LocalUploadStore;
use hbnb_api::router::{build_router, cors_layer};
use hbnb_api::state::AppState;
use hbnb_auth_types::identity::SessionSecret;
use hbnb_core::config::Config;
use hbnb_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let two_factor = match &config.redis_url {
        Some(url) => {
            let pool = deadpool_redis::Config::from_url(url)
                .create_pool(Some(deadpool_redis::Runtime::Tokio1))
                .expect("failed to create Redis pool");
            TwoFactorBackend::Redis(RedisTwoFactorStore { pool })
        }
        None => {
            warn!("REDIS_URL not set, two-factor codes are kept in process memory");
            TwoFactorBackend::Memory(MemoryTwoFactorStore::new())
        }
    };

    let mailer = match config.smtp() {
        Some(settings) => {
            MailBackend::Smtp(SmtpMailer::new(&settings).expect("invalid SMTP configuration"))
        }
        None => {
            warn!("SMTP_HOST not set, two-factor codes are logged instead of mailed");
            MailBackend::Log(LogMailer)
        }
    };

    let cors = cors_layer(config.cors_origins().as_deref());
    let state = AppState {
        db,
        two_factor,
        mailer,
        hasher: Argon2Hasher::default(),
        uploads: LocalUploadStore::new(&config.upload_dir),
        session_secret: SessionSecret::new(config.jwt_secret.as_str()),
    };

    let router = build_router(state, cors);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("api service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
