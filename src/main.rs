use oauth_identity::{config::AppConfig, db, repositories::SqliteUserRepository, routes, AppState};

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oauth_identity=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    config.validate_production_config()?;
    tracing::debug!(?config, "Configuration loaded");

    // Database connection
    let pool = db::create_pool(&config.database_url).await?;

    // Run migrations
    db::run_migrations(&pool).await?;

    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let app_state = AppState::new(
        user_repository,
        config.identity.clone(),
        config.bridge_token.clone(),
    );

    tracing::info!(
        providers = ?config.identity.providers,
        trust_provider_email = config.identity.trust_provider_email,
        "Identity resolver ready"
    );

    let app = routes::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server running on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
