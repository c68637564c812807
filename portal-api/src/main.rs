//! Campus portal server binary
//!
//! Loads configuration from the environment, connects to PostgreSQL, runs
//! migrations, and serves the portal until interrupted.
//!
//! ```bash
//! cargo run -p portal-api
//! ```

use portal_api::{
    app::{build_router, AppState},
    config::Config,
    responder::{HttpResponder, Responder, UnconfiguredResponder},
};
use portal_shared::db::{migrations, pool};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Campus portal v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    migrations::ensure_database_exists(&config.database.url).await?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    let responder: Arc<dyn Responder> = match &config.responder_url {
        Some(url) => Arc::new(HttpResponder::new(url.clone())),
        None => {
            tracing::warn!("RESPONDER_URL not set; chat endpoint will report unavailable");
            Arc::new(UnconfiguredResponder)
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(db.clone(), config, responder);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting");
        })
        .await?;

    pool::close_pool(db).await;

    Ok(())
}
