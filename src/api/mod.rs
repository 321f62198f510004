// HTTP API routes (games, entities, strategies, conversations, scraper).

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::chat::{ChatError, ChatService};
use crate::db::Database;
use crate::scraper::{ScrapeError, ScraperService};

/// User id assumed when the request carries none. In a real deployment this
/// comes from auth.
const DEFAULT_USER_ID: &str = "user123";

/// First message of every new conversation.
const GREETING: &str = "Hello! How can I help you with game strategies today?";

// ── Request types ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct EntityListParams {
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct ConversationListParams {
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateConversationRequest {
    pub game_id: i64,
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct PostMessageRequest {
    pub message: String,
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub chat: Arc<ChatService>,
    pub scraper: Arc<ScraperService>,
}

// ── Error helpers ─────────────────────────────────────────────────────

fn json_error(status: StatusCode, msg: &str) -> impl IntoResponse {
    (status, Json(json!({ "success": false, "error": msg })))
}

fn internal_error(e: impl std::fmt::Display) -> impl IntoResponse {
    tracing::error!("Internal error: {e}");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(
    db: Arc<Database>,
    chat: Arc<ChatService>,
    scraper: Arc<ScraperService>,
) -> Router {
    let state = AppState { db, chat, scraper };

    Router::new()
        // Games
        .route("/api/games", get(list_games))
        .route("/api/games/{id}", get(get_game))
        .route("/api/games/{game_id}/entities", get(list_game_entities))
        .route(
            "/api/games/{game_id}/entities/search",
            get(search_game_entities),
        )
        .route("/api/games/{game_id}/strategies", get(list_game_strategies))
        .route(
            "/api/games/{game_id}/strategies/search",
            get(search_game_strategies),
        )
        // Conversations
        .route("/api/conversations", post(create_conversation))
        .route(
            "/api/conversations/game/{game_id}",
            get(list_conversations_for_game),
        )
        .route("/api/conversations/{id}", get(get_conversation))
        .route("/api/conversations/{id}/messages", post(post_message))
        // Scraper
        .route("/api/scraper/setup", post(scraper_setup))
        .route("/api/scraper/scrape/{game_id}", post(scrape_game))
        .with_state(state)
}

// ── Game handlers ─────────────────────────────────────────────────────

async fn list_games(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.list_games().await {
        Ok(games) => (StatusCode::OK, Json(json!(games))).into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

async fn get_game(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match state.db.get_game(id).await {
        Ok(Some(game)) => (StatusCode::OK, Json(json!(game))).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "Game not found").into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

async fn list_game_entities(
    State(state): State<AppState>,
    Path(game_id): Path<i64>,
    Query(params): Query<EntityListParams>,
) -> impl IntoResponse {
    match state
        .db
        .list_entities(game_id, params.entity_type.as_deref())
        .await
    {
        Ok(entities) => (StatusCode::OK, Json(json!(entities))).into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

async fn search_game_entities(
    State(state): State<AppState>,
    Path(game_id): Path<i64>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let Some(q) = params.q.filter(|q| !q.is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "Search query is required").into_response();
    };
    match state.db.search_entities_text(game_id, &q).await {
        Ok(entities) => (StatusCode::OK, Json(json!(entities))).into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

async fn list_game_strategies(
    State(state): State<AppState>,
    Path(game_id): Path<i64>,
) -> impl IntoResponse {
    match state.db.list_strategies(game_id).await {
        Ok(strategies) => (StatusCode::OK, Json(json!(strategies))).into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

async fn search_game_strategies(
    State(state): State<AppState>,
    Path(game_id): Path<i64>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let Some(q) = params.q.filter(|q| !q.is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "Search query is required").into_response();
    };
    match state.db.search_strategies_text(game_id, &q).await {
        Ok(strategies) => (StatusCode::OK, Json(json!(strategies))).into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

// ── Conversation handlers ─────────────────────────────────────────────

async fn list_conversations_for_game(
    State(state): State<AppState>,
    Path(game_id): Path<i64>,
    Query(params): Query<ConversationListParams>,
) -> impl IntoResponse {
    let user_id = params.user_id.unwrap_or_else(|| DEFAULT_USER_ID.to_string());
    match state.db.list_conversations(game_id, &user_id).await {
        Ok(conversations) => (StatusCode::OK, Json(json!(conversations))).into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let conversation = match state.db.get_conversation(id).await {
        Ok(Some(c)) => c,
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "Conversation not found").into_response()
        }
        Err(e) => return internal_error(e).into_response(),
    };
    match state.db.list_messages(id).await {
        Ok(messages) => {
            let mut body = json!(conversation);
            body["messages"] = json!(messages);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => internal_error(e).into_response(),
    }
}

async fn create_conversation(
    State(state): State<AppState>,
    Json(req): Json<CreateConversationRequest>,
) -> impl IntoResponse {
    // Reject unknown games up front so the chat pipeline never sees a
    // conversation pointing nowhere.
    match state.db.get_game(req.game_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return json_error(StatusCode::NOT_FOUND, "Game not found").into_response(),
        Err(e) => return internal_error(e).into_response(),
    }

    let user_id = req.user_id.unwrap_or_else(|| DEFAULT_USER_ID.to_string());
    let now = chrono::Utc::now().to_rfc3339();

    let conversation = match state.db.create_conversation(&user_id, req.game_id, &now).await {
        Ok(c) => c,
        Err(e) => return internal_error(e).into_response(),
    };
    let greeting = match state
        .db
        .append_message(conversation.id, GREETING, false, &now)
        .await
    {
        Ok(m) => m,
        Err(e) => return internal_error(e).into_response(),
    };

    let mut body = json!(conversation);
    body["messages"] = json!([greeting]);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<PostMessageRequest>,
) -> impl IntoResponse {
    if req.message.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "message is required").into_response();
    }

    // The pipeline reads persisted history, so the question is stored only
    // after it runs; its history window must end at the previous turn.
    let response_text = match state.chat.process_message(id, &req.message).await {
        Ok(text) => text,
        Err(ChatError::ConversationNotFound) => {
            return json_error(StatusCode::NOT_FOUND, "Conversation not found").into_response()
        }
        Err(e) => return internal_error(e).into_response(),
    };

    let now = chrono::Utc::now().to_rfc3339();
    let user_message = match state.db.append_message(id, &req.message, true, &now).await {
        Ok(m) => m,
        Err(e) => return internal_error(e).into_response(),
    };
    let response_message = match state.db.append_message(id, &response_text, false, &now).await {
        Ok(m) => m,
        Err(e) => return internal_error(e).into_response(),
    };

    (
        StatusCode::OK,
        Json(json!({
            "user_message": user_message,
            "response_message": response_message,
        })),
    )
        .into_response()
}

// ── Scraper handlers ──────────────────────────────────────────────────

async fn scraper_setup(State(state): State<AppState>) -> impl IntoResponse {
    match state.scraper.setup_games().await {
        Ok(games) => {
            let summaries: Vec<_> = games
                .iter()
                .map(|g| json!({ "id": g.id, "name": g.name }))
                .collect();
            (
                StatusCode::OK,
                Json(json!({ "success": true, "games": summaries })),
            )
                .into_response()
        }
        Err(e) => internal_error(e).into_response(),
    }
}

async fn scrape_game(
    State(state): State<AppState>,
    Path(game_id): Path<i64>,
) -> impl IntoResponse {
    match state.scraper.scrape_game(game_id).await {
        Ok(outcome) => (StatusCode::OK, Json(json!(outcome))).into_response(),
        Err(ScrapeError::GameNotFound) => {
            json_error(StatusCode::NOT_FOUND, "Game not found").into_response()
        }
        Err(e) => internal_error(e).into_response(),
    }
}
