use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use garagebook::config::AppConfig;
use garagebook::db;
use garagebook::handlers;
use garagebook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    let state = AppState::new(conn, config.clone());

    if config.seed_demo_data {
        let digest = state
            .tokens
            .hash_password(db::seed::DEMO_USER_EMAIL, db::seed::DEMO_USER_PASSWORD);
        let conn = state.db.lock().unwrap();
        db::seed::seed_demo_data(&conn, &digest).context("failed to seed demo data")?;
        tracing::info!(
            "demo customer: {} / {}",
            db::seed::DEMO_USER_EMAIL,
            db::seed::DEMO_USER_PASSWORD
        );
    }

    let app = handlers::router(Arc::new(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting booking API on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
