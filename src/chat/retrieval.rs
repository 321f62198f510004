// Entity retrieval: keyword-targeted search with a broaden-by-name fallback.

use std::fmt;

use crate::chat::keywords::extract_keywords;
use crate::db::{Database, GameEntity};

/// Hard cap on retrieved entities per query.
pub const RESULT_LIMIT: i64 = 5;

/// Closed set of entity types. The scraper assigns one per page and the
/// retriever filters on it when the query shows a type intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Troop,
    Spell,
    Building,
    Hero,
    Other,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Troop => "Troop",
            EntityType::Spell => "Spell",
            EntityType::Building => "Building",
            EntityType::Hero => "Hero",
            EntityType::Other => "Other",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trigger substrings per type, tested in table order against the lowercased
/// raw query. The first type with any matching trigger wins.
const TYPE_TRIGGERS: &[(EntityType, &[&str])] = &[
    (EntityType::Troop, &["troop", "army", "soldier", "unit", "attack"]),
    (EntityType::Spell, &["spell", "magic", "potion"]),
    (
        EntityType::Building,
        &["building", "structure", "defense", "tower", "wall"],
    ),
    (EntityType::Hero, &["hero", "champion", "special", "unique"]),
];

/// Best-effort guess at which entity type a query is about. Substring
/// containment, not token match, so "attacking" still triggers Troop.
pub fn classify_type_intent(query: &str) -> Option<EntityType> {
    let lowered = query.to_lowercase();
    TYPE_TRIGGERS
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|t| lowered.contains(t)))
        .map(|(entity_type, _)| *entity_type)
}

/// One stage of the retrieval strategy, tried in order until a stage yields
/// a non-empty result.
enum SearchAttempt<'a> {
    /// Keyword disjunction over name/description/properties, storage order.
    Keywords {
        keywords: &'a [String],
        entity_type: Option<EntityType>,
    },
    /// No content filter, name ascending.
    ByName { entity_type: Option<EntityType> },
}

/// Return at most [`RESULT_LIMIT`] entities relevant to `query`, scoped to
/// one game.
///
/// A query with no usable keywords short-circuits to the name-ascending
/// default. Otherwise the targeted keyword search runs first (with the type
/// filter applied even when it disagrees with the keyword signal), and an
/// empty result broadens to the by-name listing.
pub async fn retrieve_relevant_entities(
    db: &Database,
    game_id: i64,
    query: &str,
) -> Result<Vec<GameEntity>, sqlx::Error> {
    let keywords: Vec<String> = extract_keywords(query).into_iter().collect();
    if keywords.is_empty() {
        return db.list_entities_by_name(game_id, None, RESULT_LIMIT).await;
    }

    let intent = classify_type_intent(query);
    let attempts = [
        SearchAttempt::Keywords {
            keywords: &keywords,
            entity_type: intent,
        },
        SearchAttempt::ByName { entity_type: intent },
    ];

    for attempt in &attempts {
        let entities = match attempt {
            SearchAttempt::Keywords {
                keywords,
                entity_type,
            } => {
                db.search_entities_by_keywords(
                    game_id,
                    entity_type.map(|t| t.as_str()),
                    keywords,
                    RESULT_LIMIT,
                )
                .await?
            }
            SearchAttempt::ByName { entity_type } => {
                db.list_entities_by_name(game_id, entity_type.map(|t| t.as_str()), RESULT_LIMIT)
                    .await?
            }
        };
        if !entities.is_empty() {
            return Ok(entities);
        }
    }

    Ok(Vec::new())
}
