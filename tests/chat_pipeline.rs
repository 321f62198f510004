// Integration tests for the chat pipeline: keyword-targeted retrieval with
// its fallback stages, context assembly, and the completion-failure path.

use std::sync::Arc;

use async_trait::async_trait;

use gamesage_backend::chat::retrieval::retrieve_relevant_entities;
use gamesage_backend::chat::{ChatError, ChatService};
use gamesage_backend::db::{Database, Game};
use gamesage_backend::llm::{CompletionError, CompletionProvider, FALLBACK_PREFIX};

/// Provider that always answers with a fixed string and records nothing.
struct StaticProvider(&'static str);

#[async_trait]
impl CompletionProvider for StaticProvider {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, CompletionError> {
        Ok(self.0.to_string())
    }
}

/// Provider that fails every call, simulating a transport/API outage.
struct FailingProvider;

#[async_trait]
impl CompletionProvider for FailingProvider {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, CompletionError> {
        Err(CompletionError::Empty)
    }
}

async fn test_db() -> Arc<Database> {
    Arc::new(Database::new("sqlite::memory:").await.unwrap())
}

async fn seed_game(db: &Database) -> Game {
    db.create_game(
        "Clash of Clans",
        "Village-building strategy game",
        "https://clashofclans.fandom.com",
        "[]",
        None,
    )
    .await
    .unwrap()
}

async fn seed_entity(db: &Database, game_id: i64, name: &str, entity_type: &str, desc: &str) {
    db.create_entity(
        game_id,
        name,
        entity_type,
        desc,
        "",
        "{}",
        "",
        "2026-01-01T00:00:00Z",
    )
    .await
    .unwrap();
}

// ── Retrieval stages ──────────────────────────────────────────────────

#[tokio::test]
async fn test_targeted_search_applies_type_intent() {
    let db = test_db().await;
    let game = seed_game(&db).await;

    seed_entity(&db, game.id, "Archer Tower", "Building", "Shoots arrows at raiders").await;
    seed_entity(&db, game.id, "Archer", "Troop", "A ranged attacker").await;

    // "tower" classifies the query as Building, so the troop named Archer
    // is filtered out even though the keyword matches it.
    let entities = retrieve_relevant_entities(&db, game.id, "how strong is the archer tower?")
        .await
        .unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].name, "Archer Tower");
}

#[tokio::test]
async fn test_no_keyword_match_falls_back_to_name_order() {
    let db = test_db().await;
    let game = seed_game(&db).await;

    for name in ["Wizard", "Archer", "Golem", "Barbarian", "Miner", "Healer"] {
        seed_entity(&db, game.id, name, "Troop", "").await;
    }

    // "zeppelin" matches nothing, so the broaden stage returns the first 5
    // entities by name rather than an error or empty set.
    let entities = retrieve_relevant_entities(&db, game.id, "tell me about zeppelin tactics")
        .await
        .unwrap();
    assert_eq!(entities.len(), 5);
    let names: Vec<&str> = entities.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Archer", "Barbarian", "Golem", "Healer", "Miner"]);
}

#[tokio::test]
async fn test_stop_word_only_query_takes_default_path() {
    let db = test_db().await;
    let game = seed_game(&db).await;

    seed_entity(&db, game.id, "Wizard", "Troop", "").await;
    seed_entity(&db, game.id, "Archer", "Troop", "").await;

    // Every token is a stop word or too short; no keyword search runs.
    let entities = retrieve_relevant_entities(&db, game.id, "how is it?")
        .await
        .unwrap();
    let names: Vec<&str> = entities.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Archer", "Wizard"]);
}

#[tokio::test]
async fn test_conflicting_type_intent_still_filters_then_broadens() {
    let db = test_db().await;
    let game = seed_game(&db).await;

    // Only troops exist, but the query's type intent is Hero. The targeted
    // stage keeps the Hero filter and finds nothing; the broaden stage keeps
    // it too and also finds nothing.
    seed_entity(&db, game.id, "Giant", "Troop", "A special kind of attacker").await;

    let entities = retrieve_relevant_entities(&db, game.id, "which special giant is best?")
        .await
        .unwrap();
    assert!(entities.is_empty());
}

#[tokio::test]
async fn test_results_capped_at_five() {
    let db = test_db().await;
    let game = seed_game(&db).await;

    for i in 0..8 {
        seed_entity(
            &db,
            game.id,
            &format!("Dragon {i}"),
            "Troop",
            "A flying dragon",
        )
        .await;
    }

    let entities = retrieve_relevant_entities(&db, game.id, "best dragon?")
        .await
        .unwrap();
    assert_eq!(entities.len(), 5);
}

// ── End-to-end pipeline ───────────────────────────────────────────────

#[tokio::test]
async fn test_process_message_returns_completion_text() {
    let db = test_db().await;
    let game = seed_game(&db).await;
    seed_entity(&db, game.id, "Giant", "Troop", "A big slow attacker").await;

    let conv = db
        .create_conversation("user123", game.id, "2026-01-01T00:00:00Z")
        .await
        .unwrap();

    let chat = ChatService::new(db.clone(), Arc::new(StaticProvider("Use giants up front.")));
    let response = chat
        .process_message(conv.id, "What troops should I use to attack?")
        .await
        .unwrap();
    assert_eq!(response, "Use giants up front.");
}

#[tokio::test]
async fn test_missing_conversation_is_a_distinct_error() {
    let db = test_db().await;
    seed_game(&db).await;

    let chat = ChatService::new(db.clone(), Arc::new(StaticProvider("unused")));
    let err = chat.process_message(999, "hello").await.unwrap_err();
    assert!(matches!(err, ChatError::ConversationNotFound));
}

#[tokio::test]
async fn test_provider_failure_yields_template_fallback() {
    let db = test_db().await;
    let game = seed_game(&db).await;

    let conv = db
        .create_conversation("user123", game.id, "2026-01-01T00:00:00Z")
        .await
        .unwrap();

    let chat = ChatService::new(db.clone(), Arc::new(FailingProvider));
    let response = chat
        .process_message(conv.id, "What should I upgrade first?")
        .await
        .unwrap();

    assert!(response.starts_with(FALLBACK_PREFIX));
    assert!(response.contains("Upgrading your buildings and troops"));
}

#[tokio::test]
async fn test_provider_failure_never_surfaces_for_any_query() {
    let db = test_db().await;
    let game = seed_game(&db).await;

    let conv = db
        .create_conversation("user123", game.id, "2026-01-01T00:00:00Z")
        .await
        .unwrap();

    let chat = ChatService::new(db.clone(), Arc::new(FailingProvider));
    for query in ["strategy?", "attack plan", "completely unrelated"] {
        let response = chat.process_message(conv.id, query).await.unwrap();
        assert!(!response.is_empty());
        assert!(response.starts_with(FALLBACK_PREFIX));
    }
}
