// Chat pipeline: query -> keywords -> entities -> formatted context ->
// completion call, one sequential pass per user message.

pub mod context;
pub mod keywords;
pub mod retrieval;

use std::sync::Arc;

use crate::db::Database;
use crate::llm::{fallback_response, CompletionProvider};

/// Persona and constraints sent with every completion request.
pub const SYSTEM_PROMPT: &str = "You are an expert game strategy advisor. \
You provide helpful, accurate, and strategic advice to players.
Use the provided game information to inform your responses, but don't explicitly mention the data source.
Present information in a clear, conversational way. If you don't know something, admit it rather than making up information.
When discussing strategy, consider both offensive and defensive aspects of the game.
If the user asks for a simulation, describe a hypothetical scenario and outcome based on the game mechanics.";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The referenced conversation does not exist; maps to a 404.
    #[error("Conversation not found")]
    ConversationNotFound,
    /// Storage failures propagate uncaught; the pipeline has no recovery
    /// strategy for them.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Stateless per-call pipeline over the externally owned conversation and
/// entity collections.
pub struct ChatService {
    db: Arc<Database>,
    provider: Arc<dyn CompletionProvider>,
}

impl ChatService {
    pub fn new(db: Arc<Database>, provider: Arc<dyn CompletionProvider>) -> Self {
        Self { db, provider }
    }

    /// Produce a response to `message` within an existing conversation.
    ///
    /// Fails only when the conversation is missing or storage errors out;
    /// completion-provider failures are absorbed into the template fallback
    /// and never surface to the caller.
    pub async fn process_message(
        &self,
        conversation_id: i64,
        message: &str,
    ) -> Result<String, ChatError> {
        let conversation = self
            .db
            .get_conversation(conversation_id)
            .await?
            .ok_or(ChatError::ConversationNotFound)?;

        let entities =
            retrieval::retrieve_relevant_entities(&self.db, conversation.game_id, message).await?;
        tracing::debug!(
            conversation_id,
            game_id = conversation.game_id,
            entity_count = entities.len(),
            "retrieved entities for chat turn"
        );

        let entity_context = context::format_entity_context(&entities);
        let messages = self.db.list_messages(conversation_id).await?;
        let history = context::format_conversation_history(&messages);

        let user_prompt = format!(
            "{history}\n\nRelevant Game Information:\n{entity_context}\n\nUser Question: {message}"
        );

        match self.provider.complete(SYSTEM_PROMPT, &user_prompt).await {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!("completion request failed, using fallback: {e}");
                Ok(fallback_response(message))
            }
        }
    }
}
