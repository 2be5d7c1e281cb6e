use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subscription_service::db::{create_pool, run_migrations};
use subscription_service::routes::configure_routes;
use subscription_service::security::jwt;
use subscription_service::Config;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!("Starting subscription-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Initialize JWT verification key (tokens are issued elsewhere)
    jwt::initialize_verification_key(&config.auth.public_key_pem)
        .context("Failed to initialize JWT verification key")?;
    tracing::info!("JWT verification key initialized");

    // Create database connection pool
    let pool = create_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await
    .context("Failed to create database pool")?;

    // Verify database connection
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("Failed to verify database connection")?;
    tracing::info!(
        "Database pool created with {} max connections",
        config.database.max_connections
    );

    // Run database migrations
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations completed");

    let bind_addr = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Listening on http://{}", bind_addr);

    let pool_data = web::Data::new(pool);
    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .bind(&bind_addr)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")
}
