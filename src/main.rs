mod config;
mod db;
mod models;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::AppConfig::from_env().expect("invalid configuration");

    let store = db::init_database(&config.mongo)
        .await
        .expect("database init failed");

    let state = state::AppState::new(Arc::new(store), &config);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "ugc-reviews listening");
    axum::serve(listener, app).await.expect("server failed");
}
