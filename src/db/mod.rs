// Database access layer (SQLite via sqlx).

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::collections::BTreeMap;

/// A game known to the system, with the wiki layout the scraper walks.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Game {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub wiki_base_url: String,
    /// JSON array of category paths, e.g. `["/wiki/Category:Troops"]`.
    pub category_paths: String,
    pub icon_url: Option<String>,
}

impl Game {
    pub fn category_path_list(&self) -> Vec<String> {
        serde_json::from_str(&self.category_paths).unwrap_or_default()
    }
}

/// A persisted fact sheet about one in-game object, scoped to a game.
/// Created by the scraper and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GameEntity {
    pub id: i64,
    pub game_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub description: String,
    pub wiki_url: String,
    /// JSON object of scraped infobox key/value pairs.
    pub properties: String,
    pub content: String,
    pub scraped_at: String,
}

impl GameEntity {
    pub fn property_map(&self) -> BTreeMap<String, String> {
        serde_json::from_str(&self.properties).unwrap_or_default()
    }
}

/// A long-form strategy write-up scoped to a game, separate from entities.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Strategy {
    pub id: i64,
    pub game_id: i64,
    pub title: String,
    pub description: String,
    pub content: String,
    /// JSON array of tag strings.
    pub tags: String,
    pub source: String,
    pub scraped_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: i64,
    pub user_id: String,
    pub game_id: i64,
    pub started_at: String,
    pub last_activity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub message: String,
    pub is_from_user: bool,
    pub timestamp: String,
}

pub struct Database {
    pool: SqlitePool,
}

/// Substring LIKE pattern with `%`, `_` and the escape character itself
/// escaped, for use with `LIKE ? ESCAPE '\'`.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                wiki_base_url TEXT NOT NULL,
                category_paths TEXT NOT NULL DEFAULT '[]',
                icon_url TEXT
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS game_entities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                entity_type TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                wiki_url TEXT NOT NULL DEFAULT '',
                properties TEXT NOT NULL DEFAULT '{}',
                content TEXT NOT NULL DEFAULT '',
                scraped_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_entities_game_type ON game_entities(game_id, entity_type)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS strategies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                content TEXT NOT NULL DEFAULT '',
                tags TEXT NOT NULL DEFAULT '[]',
                source TEXT NOT NULL DEFAULT '',
                scraped_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                game_id INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
                started_at TEXT NOT NULL DEFAULT (datetime('now')),
                last_activity TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                conversation_id INTEGER NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
                message TEXT NOT NULL,
                is_from_user INTEGER NOT NULL DEFAULT 1,
                timestamp TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ── Games ─────────────────────────────────────────────────────────

    pub async fn create_game(
        &self,
        name: &str,
        description: &str,
        wiki_base_url: &str,
        category_paths: &str,
        icon_url: Option<&str>,
    ) -> Result<Game, sqlx::Error> {
        let row = sqlx::query_as::<_, Game>(
            "INSERT INTO games (name, description, wiki_base_url, category_paths, icon_url) VALUES (?, ?, ?, ?, ?) RETURNING id, name, description, wiki_base_url, category_paths, icon_url",
        )
        .bind(name)
        .bind(description)
        .bind(wiki_base_url)
        .bind(category_paths)
        .bind(icon_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_games(&self) -> Result<Vec<Game>, sqlx::Error> {
        let rows = sqlx::query_as::<_, Game>(
            "SELECT id, name, description, wiki_base_url, category_paths, icon_url FROM games ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_game(&self, id: i64) -> Result<Option<Game>, sqlx::Error> {
        let row = sqlx::query_as::<_, Game>(
            "SELECT id, name, description, wiki_base_url, category_paths, icon_url FROM games WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_game_by_name(&self, name: &str) -> Result<Option<Game>, sqlx::Error> {
        let row = sqlx::query_as::<_, Game>(
            "SELECT id, name, description, wiki_base_url, category_paths, icon_url FROM games WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    // ── Game entities ─────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    pub async fn create_entity(
        &self,
        game_id: i64,
        name: &str,
        entity_type: &str,
        description: &str,
        wiki_url: &str,
        properties: &str,
        content: &str,
        scraped_at: &str,
    ) -> Result<GameEntity, sqlx::Error> {
        let row = sqlx::query_as::<_, GameEntity>(
            "INSERT INTO game_entities (game_id, name, entity_type, description, wiki_url, properties, content, scraped_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id, game_id, name, entity_type, description, wiki_url, properties, content, scraped_at",
        )
        .bind(game_id)
        .bind(name)
        .bind(entity_type)
        .bind(description)
        .bind(wiki_url)
        .bind(properties)
        .bind(content)
        .bind(scraped_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_entities(
        &self,
        game_id: i64,
        entity_type: Option<&str>,
    ) -> Result<Vec<GameEntity>, sqlx::Error> {
        let rows = match entity_type {
            Some(t) => {
                sqlx::query_as::<_, GameEntity>(
                    "SELECT id, game_id, name, entity_type, description, wiki_url, properties, content, scraped_at FROM game_entities WHERE game_id = ? AND entity_type = ? ORDER BY id",
                )
                .bind(game_id)
                .bind(t)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, GameEntity>(
                    "SELECT id, game_id, name, entity_type, description, wiki_url, properties, content, scraped_at FROM game_entities WHERE game_id = ? ORDER BY id",
                )
                .bind(game_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    /// Free-text entity search for the REST surface: case-insensitive
    /// literal substring match over name, description and content.
    pub async fn search_entities_text(
        &self,
        game_id: i64,
        query: &str,
    ) -> Result<Vec<GameEntity>, sqlx::Error> {
        let pattern = like_pattern(query);
        let rows = sqlx::query_as::<_, GameEntity>(
            "SELECT id, game_id, name, entity_type, description, wiki_url, properties, content, scraped_at FROM game_entities WHERE game_id = ? AND (name LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\' OR content LIKE ? ESCAPE '\\') ORDER BY id",
        )
        .bind(game_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Targeted retrieval query for the chat pipeline: game scope, optional
    /// type equality, and a disjunction of every keyword against name,
    /// description and the scraped "description" property. Unordered.
    pub async fn search_entities_by_keywords(
        &self,
        game_id: i64,
        entity_type: Option<&str>,
        keywords: &[String],
        limit: i64,
    ) -> Result<Vec<GameEntity>, sqlx::Error> {
        let mut qb = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
            "SELECT id, game_id, name, entity_type, description, wiki_url, properties, content, scraped_at FROM game_entities WHERE game_id = ",
        );
        qb.push_bind(game_id);

        if let Some(t) = entity_type {
            qb.push(" AND entity_type = ");
            qb.push_bind(t);
        }

        if !keywords.is_empty() {
            qb.push(" AND (");
            for (i, keyword) in keywords.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                let pattern = format!("%{keyword}%");
                qb.push("name LIKE ");
                qb.push_bind(pattern.clone());
                qb.push(" OR description LIKE ");
                qb.push_bind(pattern.clone());
                qb.push(" OR json_extract(properties, '$.description') LIKE ");
                qb.push_bind(pattern);
            }
            qb.push(")");
        }

        qb.push(" LIMIT ");
        qb.push_bind(limit);

        let rows = qb
            .build_query_as::<GameEntity>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Broad retrieval query: game scope (and optional type), ordered by
    /// name ascending. Used for the default and fallback paths.
    pub async fn list_entities_by_name(
        &self,
        game_id: i64,
        entity_type: Option<&str>,
        limit: i64,
    ) -> Result<Vec<GameEntity>, sqlx::Error> {
        let rows = match entity_type {
            Some(t) => {
                sqlx::query_as::<_, GameEntity>(
                    "SELECT id, game_id, name, entity_type, description, wiki_url, properties, content, scraped_at FROM game_entities WHERE game_id = ? AND entity_type = ? ORDER BY name ASC LIMIT ?",
                )
                .bind(game_id)
                .bind(t)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, GameEntity>(
                    "SELECT id, game_id, name, entity_type, description, wiki_url, properties, content, scraped_at FROM game_entities WHERE game_id = ? ORDER BY name ASC LIMIT ?",
                )
                .bind(game_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    // ── Strategies ────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    pub async fn create_strategy(
        &self,
        game_id: i64,
        title: &str,
        description: &str,
        content: &str,
        tags: &str,
        source: &str,
        scraped_at: &str,
    ) -> Result<Strategy, sqlx::Error> {
        let row = sqlx::query_as::<_, Strategy>(
            "INSERT INTO strategies (game_id, title, description, content, tags, source, scraped_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id, game_id, title, description, content, tags, source, scraped_at",
        )
        .bind(game_id)
        .bind(title)
        .bind(description)
        .bind(content)
        .bind(tags)
        .bind(source)
        .bind(scraped_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_strategies(&self, game_id: i64) -> Result<Vec<Strategy>, sqlx::Error> {
        let rows = sqlx::query_as::<_, Strategy>(
            "SELECT id, game_id, title, description, content, tags, source, scraped_at FROM strategies WHERE game_id = ? ORDER BY id",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn search_strategies_text(
        &self,
        game_id: i64,
        query: &str,
    ) -> Result<Vec<Strategy>, sqlx::Error> {
        let pattern = like_pattern(query);
        let rows = sqlx::query_as::<_, Strategy>(
            "SELECT id, game_id, title, description, content, tags, source, scraped_at FROM strategies WHERE game_id = ? AND (title LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\' OR content LIKE ? ESCAPE '\\') ORDER BY id",
        )
        .bind(game_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ── Conversations ─────────────────────────────────────────────────

    pub async fn create_conversation(
        &self,
        user_id: &str,
        game_id: i64,
        started_at: &str,
    ) -> Result<Conversation, sqlx::Error> {
        let row = sqlx::query_as::<_, Conversation>(
            "INSERT INTO conversations (user_id, game_id, started_at, last_activity) VALUES (?, ?, ?, ?) RETURNING id, user_id, game_id, started_at, last_activity",
        )
        .bind(user_id)
        .bind(game_id)
        .bind(started_at)
        .bind(started_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_conversation(&self, id: i64) -> Result<Option<Conversation>, sqlx::Error> {
        let row = sqlx::query_as::<_, Conversation>(
            "SELECT id, user_id, game_id, started_at, last_activity FROM conversations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_conversations(
        &self,
        game_id: i64,
        user_id: &str,
    ) -> Result<Vec<Conversation>, sqlx::Error> {
        let rows = sqlx::query_as::<_, Conversation>(
            "SELECT id, user_id, game_id, started_at, last_activity FROM conversations WHERE game_id = ? AND user_id = ? ORDER BY last_activity DESC",
        )
        .bind(game_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Messages in chronological order. Insertion order is never rewritten,
    /// so the rowid order is the chronological order.
    pub async fn list_messages(
        &self,
        conversation_id: i64,
    ) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ChatMessage>(
            "SELECT id, conversation_id, message, is_from_user, timestamp FROM chat_messages WHERE conversation_id = ? ORDER BY id",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Append a message and move the conversation's last-activity marker to
    /// the message timestamp.
    pub async fn append_message(
        &self,
        conversation_id: i64,
        message: &str,
        is_from_user: bool,
        timestamp: &str,
    ) -> Result<ChatMessage, sqlx::Error> {
        let row = sqlx::query_as::<_, ChatMessage>(
            "INSERT INTO chat_messages (conversation_id, message, is_from_user, timestamp) VALUES (?, ?, ?, ?) RETURNING id, conversation_id, message, is_from_user, timestamp",
        )
        .bind(conversation_id)
        .bind(message)
        .bind(is_from_user)
        .bind(timestamp)
        .fetch_one(&self.pool)
        .await?;

        sqlx::query("UPDATE conversations SET last_activity = ? WHERE id = ?")
            .bind(timestamp)
            .bind(conversation_id)
            .execute(&self.pool)
            .await?;

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    async fn seed_game(db: &Database) -> Game {
        db.create_game(
            "Clash of Clans",
            "Village-building strategy game",
            "https://clashofclans.fandom.com",
            r#"["/wiki/Category:Troops"]"#,
            None,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list_games() {
        let db = test_db().await;

        let game = seed_game(&db).await;
        assert_eq!(game.name, "Clash of Clans");
        assert_eq!(
            game.category_path_list(),
            vec!["/wiki/Category:Troops".to_string()]
        );

        let games = db.list_games().await.unwrap();
        assert_eq!(games.len(), 1);

        let fetched = db.get_game(game.id).await.unwrap();
        assert!(fetched.is_some());

        let missing = db.get_game(999).await.unwrap();
        assert!(missing.is_none());

        let by_name = db.get_game_by_name("Clash of Clans").await.unwrap();
        assert_eq!(by_name.unwrap().id, game.id);
    }

    #[tokio::test]
    async fn test_keyword_search_matches_three_fields() {
        let db = test_db().await;
        let game = seed_game(&db).await;

        db.create_entity(
            game.id,
            "Giant",
            "Troop",
            "A slow melee attacker",
            "",
            "{}",
            "",
            "2026-01-01T00:00:00Z",
        )
        .await
        .unwrap();
        db.create_entity(
            game.id,
            "Archer Tower",
            "Building",
            "Shoots arrows",
            "",
            r#"{"description": "Defends against giant raids"}"#,
            "",
            "2026-01-01T00:00:00Z",
        )
        .await
        .unwrap();
        db.create_entity(
            game.id,
            "Healer",
            "Troop",
            "Restores hitpoints",
            "",
            "{}",
            "",
            "2026-01-01T00:00:00Z",
        )
        .await
        .unwrap();

        // "giant" hits the name of one entity and the properties description
        // of another, case-insensitively.
        let keywords = vec!["giant".to_string()];
        let hits = db
            .search_entities_by_keywords(game.id, None, &keywords, 5)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);

        // Type filter narrows the same keyword to the troop.
        let hits = db
            .search_entities_by_keywords(game.id, Some("Troop"), &keywords, 5)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Giant");

        // Unmatched keyword yields nothing rather than everything.
        let keywords = vec!["dragon".to_string()];
        let hits = db
            .search_entities_by_keywords(game.id, None, &keywords, 5)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_text_search_treats_like_metacharacters_as_literals() {
        let db = test_db().await;
        let game = seed_game(&db).await;

        db.create_entity(
            game.id,
            "Wall",
            "Building",
            "Blocks ground troops",
            "",
            "{}",
            "",
            "2026-01-01T00:00:00Z",
        )
        .await
        .unwrap();
        db.create_entity(
            game.id,
            "X-Bow",
            "Building",
            "Deals 100% damage to air_and_ground targets",
            "",
            "{}",
            "",
            "2026-01-01T00:00:00Z",
        )
        .await
        .unwrap();

        // A bare "%" only matches rows that contain a literal percent sign.
        let hits = db.search_entities_text(game.id, "%").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "X-Bow");

        // "_" is a literal underscore, not a single-character wildcard.
        let hits = db.search_entities_text(game.id, "air_and").await.unwrap();
        assert_eq!(hits.len(), 1);
        let hits = db.search_entities_text(game.id, "airXand").await.unwrap();
        assert!(hits.is_empty());

        let hits = db.search_strategies_text(game.id, "%").await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_list_entities_by_name_orders_and_limits() {
        let db = test_db().await;
        let game = seed_game(&db).await;

        for name in ["Wizard", "Archer", "Golem", "Barbarian", "Miner", "Healer", "Dragon"] {
            db.create_entity(game.id, name, "Troop", "", "", "{}", "", "2026-01-01T00:00:00Z")
                .await
                .unwrap();
        }

        let entities = db.list_entities_by_name(game.id, None, 5).await.unwrap();
        assert_eq!(entities.len(), 5);
        let names: Vec<&str> = entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Archer", "Barbarian", "Dragon", "Golem", "Healer"]);
    }

    #[tokio::test]
    async fn test_strategies_crud_and_search() {
        let db = test_db().await;
        let game = seed_game(&db).await;

        db.create_strategy(
            game.id,
            "GoWiPe",
            "Golem, Wizard, P.E.K.K.A push",
            "Open with golems to soak damage...",
            r#"["attack"]"#,
            "https://example.test/gowipe",
            "2026-01-01T00:00:00Z",
        )
        .await
        .unwrap();

        let all = db.list_strategies(game.id).await.unwrap();
        assert_eq!(all.len(), 1);

        let hits = db.search_strategies_text(game.id, "golem").await.unwrap();
        assert_eq!(hits.len(), 1);
        let hits = db.search_strategies_text(game.id, "balloon").await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_conversation_messages_and_last_activity() {
        let db = test_db().await;
        let game = seed_game(&db).await;

        let conv = db
            .create_conversation("user123", game.id, "2026-01-01T00:00:00Z")
            .await
            .unwrap();
        assert_eq!(conv.last_activity, "2026-01-01T00:00:00Z");

        db.append_message(conv.id, "Hello", false, "2026-01-01T00:00:01Z")
            .await
            .unwrap();
        db.append_message(conv.id, "What should I upgrade?", true, "2026-01-01T00:00:02Z")
            .await
            .unwrap();

        let messages = db.list_messages(conv.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].message, "Hello");
        assert!(!messages[0].is_from_user);
        assert!(messages[1].is_from_user);

        // last_activity tracks the newest message.
        let conv = db.get_conversation(conv.id).await.unwrap().unwrap();
        assert_eq!(conv.last_activity, "2026-01-01T00:00:02Z");

        let listed = db.list_conversations(game.id, "user123").await.unwrap();
        assert_eq!(listed.len(), 1);
        let listed = db.list_conversations(game.id, "someone-else").await.unwrap();
        assert!(listed.is_empty());
    }
}
