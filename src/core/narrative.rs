use std::sync::Arc;

use crate::core::normalize::normalize_content;
use crate::core::prompts::{narrative_user_prompt, NARRATIVE_SYSTEM};
use crate::models::CandidateRecipe;
use crate::services::llm::{ChatBackend, ChatMessage};

pub const NARRATIVE_NO_BACKEND: &str =
    "The AI chef is taking a break (no API key configured). Please browse the recipes below.";
pub const NARRATIVE_NO_CANDIDATES: &str =
    "Sorry, no matching recipes were found, so I have little to recommend this time.";
pub const NARRATIVE_BACKEND_FAILED: &str =
    "Based on your ingredient preferences, I have selected the following dishes worth trying.";

/// Candidates included in the narrative request
pub const NARRATIVE_MAX_CANDIDATES: usize = 5;

/// Writes the persona-voiced summary shown above a recipe list
#[derive(Clone)]
pub struct NarrativeGenerator {
    backend: Option<Arc<dyn ChatBackend>>,
}

impl NarrativeGenerator {
    pub fn new(backend: Option<Arc<dyn ChatBackend>>) -> Self {
        Self { backend }
    }

    /// Summarize up to the first five candidates. Never fails.
    pub async fn summarize(&self, query: &str, candidates: &[CandidateRecipe]) -> String {
        let Some(backend) = &self.backend else {
            return NARRATIVE_NO_BACKEND.to_string();
        };

        if candidates.is_empty() {
            return NARRATIVE_NO_CANDIDATES.to_string();
        }

        let shown = &candidates[..candidates.len().min(NARRATIVE_MAX_CANDIDATES)];
        let messages = [
            ChatMessage::system(NARRATIVE_SYSTEM),
            ChatMessage::user(narrative_user_prompt(query, shown)),
        ];

        match backend.invoke(&messages).await {
            Ok(reply) => {
                let text = normalize_content(&reply.content);
                if text.is_empty() {
                    tracing::warn!("Narrative backend returned empty content");
                    return NARRATIVE_BACKEND_FAILED.to_string();
                }
                tracing::debug!("Narrative reply: {}", text);
                text
            }
            Err(e) => {
                tracing::error!("Narrative backend call failed: {}", e);
                NARRATIVE_BACKEND_FAILED.to_string()
            }
        }
    }
}
