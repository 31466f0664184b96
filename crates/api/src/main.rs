// Tenancy API server
// Resolves tenants from hostnames and tokens, and enforces isolation and plan limits

use anyhow::Context;
use dotenvy::dotenv;
use saas_api::{routes, AppState, Config};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                "info,saas_api=debug,saas_tenant=debug,tower_http=debug".to_string()
            }),
        )
        .init();

    tracing::info!("Starting tenancy API server");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    tracing::info!(base_domains = ?config.tenancy.base_domains, "Tenancy configured");

    tracing::info!("Connecting to database...");
    let database = saas_database::Database::new(config.database.clone())
        .await
        .context("Failed to connect to database")?;
    database.ping().await.context("Database ping failed")?;
    tracing::info!("Database connected");

    let jwt = saas_auth::JwtService::from_env().context("Failed to initialize JWT service")?;
    let state = Arc::new(AppState::from_database(jwt, &config.tenancy, &database));

    let app = routes::create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
    );

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server ready at http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
