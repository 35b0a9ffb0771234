use std::sync::Arc;

use crate::core::normalize::normalize_content;
use crate::core::prompts::{consult_user_prompt, CONSULT_SYSTEM};
use crate::models::ConversationTurn;
use crate::services::llm::{ChatBackend, ChatMessage};

pub const CONSULT_NO_BACKEND: &str =
    "Sorry, the AI chef cannot reach its brain right now (API key missing).";
pub const CONSULT_BACKEND_FAILED: &str =
    "Sorry, the kitchen is very busy right now. Please try again later.";

/// Most recent turns of history sent with each question
pub const HISTORY_WINDOW: usize = 4;

/// Follow-up chat grounded in a previously returned recipe list
#[derive(Clone)]
pub struct ConsultSession {
    backend: Option<Arc<dyn ChatBackend>>,
}

impl ConsultSession {
    pub fn new(backend: Option<Arc<dyn ChatBackend>>) -> Self {
        Self { backend }
    }

    /// Answer a follow-up question. Never fails.
    ///
    /// Turns older than the last [`HISTORY_WINDOW`] are dropped. Reply length
    /// is left to the persona prompt.
    pub async fn reply(&self, query: &str, context: &str, history: &[ConversationTurn]) -> String {
        let Some(backend) = &self.backend else {
            return CONSULT_NO_BACKEND.to_string();
        };

        let messages = [
            ChatMessage::system(CONSULT_SYSTEM),
            ChatMessage::user(consult_user_prompt(query, context, recent_turns(history))),
        ];

        match backend.invoke(&messages).await {
            Ok(reply) => {
                let text = normalize_content(&reply.content);
                if text.is_empty() {
                    tracing::warn!("Consult backend returned empty content");
                    return CONSULT_BACKEND_FAILED.to_string();
                }
                text
            }
            Err(e) => {
                tracing::error!("Consult backend call failed: {}", e);
                CONSULT_BACKEND_FAILED.to_string()
            }
        }
    }
}

pub fn recent_turns(history: &[ConversationTurn]) -> &[ConversationTurn] {
    &history[history.len().saturating_sub(HISTORY_WINDOW)..]
}
