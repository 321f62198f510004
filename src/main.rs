use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use gamesage_backend::api;
use gamesage_backend::chat::ChatService;
use gamesage_backend::config::Config;
use gamesage_backend::db::Database;
use gamesage_backend::llm::GroqClient;
use gamesage_backend::scraper::ScraperService;

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "gamesage-backend" }))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::load();

    let db = Database::new(&config.database_url)
        .await
        .expect("Failed to initialize database");
    let db = Arc::new(db);

    let provider = GroqClient::new(
        config.groq_api_key.clone(),
        config.groq_api_url.clone(),
        config.llm_model.clone(),
    )
    .expect("Failed to build completion client");

    let chat = Arc::new(ChatService::new(db.clone(), Arc::new(provider)));
    let scraper = Arc::new(ScraperService::new(db.clone()).expect("Failed to build scraper client"));

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(api::router(db, chat, scraper))
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to port {}: {e}", config.port));

    tracing::info!("GameSage backend listening on port {}", config.port);
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
