// Context formatting: renders retrieved entities and conversation history
// into the text blocks sent to the completion provider.

use regex::Regex;
use std::sync::OnceLock;

use crate::db::{ChatMessage, GameEntity};

/// Fixed sentence prefixing the entity block.
pub const CONTEXT_INTRO: &str = "Here's information about relevant game entities:\n\n";

/// Fixed header prefixing the history block.
pub const HISTORY_HEADER: &str = "Previous conversation:\n";

/// Cleaned descriptions are hard-truncated to this many characters.
const DESCRIPTION_LIMIT: usize = 300;

/// Only the most recent messages are forwarded as history.
const HISTORY_WINDOW: usize = 6;

/// Property keys already rendered elsewhere in the entity block.
const RESERVED_PROPERTY_KEYS: &[&str] = &["name", "type", "description"];

fn wiki_markup_patterns() -> &'static [Regex; 4] {
    static PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"\[\[.*?\]\]").expect("valid wiki link pattern"),
            Regex::new(r"\{\{.*?\}\}").expect("valid template pattern"),
            Regex::new(r"File:.*?\|.*?\|link=\]\]").expect("valid file link pattern"),
            Regex::new(r"==.*?==").expect("valid section header pattern"),
        ]
    })
}

fn newline_runs() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\n+").expect("valid newline pattern"))
}

/// Strip wiki markup ([[links]], {{templates}}, file links, ==headers==),
/// collapse newline runs to single spaces and trim.
pub fn clean_wiki_content(content: &str) -> String {
    let mut clean = content.to_string();
    for pattern in wiki_markup_patterns() {
        clean = pattern.replace_all(&clean, "").into_owned();
    }
    let clean = newline_runs().replace_all(&clean, " ");
    clean.trim().to_string()
}

/// Render one text block describing the retrieved entities.
///
/// Per entity: a `--- name (type) ---` header (name truncated at the first
/// `/`), the cleaned description capped at 300 characters, and a
/// `Properties:` block for any infobox keys beyond name/type/description.
/// Pure and deterministic: the same input always yields the same block.
pub fn format_entity_context(entities: &[GameEntity]) -> String {
    let mut context = String::from(CONTEXT_INTRO);

    for entity in entities {
        let name = entity
            .name
            .split('/')
            .next()
            .unwrap_or(&entity.name)
            .trim();

        let source = if entity.content.is_empty() {
            &entity.description
        } else {
            &entity.content
        };
        let mut description = clean_wiki_content(source);
        if description.chars().count() > DESCRIPTION_LIMIT {
            description = description.chars().take(DESCRIPTION_LIMIT).collect();
            description.push_str("...");
        }

        let properties = entity.property_map();
        let mut properties_text = String::new();
        for (key, value) in &properties {
            if RESERVED_PROPERTY_KEYS.contains(&key.as_str()) {
                continue;
            }
            properties_text.push_str(&format!("- {key}: {value}\n"));
        }

        context.push_str(&format!("--- {name} ({}) ---\n", entity.entity_type));
        context.push_str(&description);
        context.push('\n');
        if !properties_text.is_empty() {
            context.push_str("Properties:\n");
            context.push_str(&properties_text);
            context.push('\n');
        }
        context.push('\n');
    }

    context
}

/// Render the last [`HISTORY_WINDOW`] messages in chronological order, each
/// prefixed with its author role.
pub fn format_conversation_history(messages: &[ChatMessage]) -> String {
    let start = messages.len().saturating_sub(HISTORY_WINDOW);

    let mut history = String::from(HISTORY_HEADER);
    for message in &messages[start..] {
        let role = if message.is_from_user {
            "User"
        } else {
            "Assistant"
        };
        history.push_str(&format!("{role}: {}\n", message.message));
    }
    history
}
