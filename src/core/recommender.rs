use std::sync::Arc;

use crate::core::{
    assembler::{list_response, recipe_response},
    consult::ConsultSession,
    filters::{apply_preferences, dedupe_by_name},
    narrative::NarrativeGenerator,
    rerank::RerankSelector,
};
use crate::models::{ConversationTurn, RecipeListResponse, RecipeResponse, UserPreferences};
use crate::services::{llm::ChatBackend, store::CandidateStore};

/// Pipeline options
#[derive(Debug, Clone, Copy)]
pub struct RecommenderOptions {
    /// Candidates fetched for single-best selection
    pub single_top_k: usize,
    /// Apply the preference filter on the list path as well
    pub filter_list_results: bool,
}

impl Default for RecommenderOptions {
    fn default() -> Self {
        Self {
            single_top_k: 6,
            filter_list_results: false,
        }
    }
}

/// Main recommendation orchestrator
///
/// # Pipeline
/// 1. Similarity search (threshold applied by the store)
/// 2. Preference filtering
/// 3. Deduplication by name (both paths, once)
/// 4. AI rerank (single) or AI narrative (list)
/// 5. Output assembly
#[derive(Clone)]
pub struct Recommender {
    store: Arc<CandidateStore>,
    selector: RerankSelector,
    narrator: NarrativeGenerator,
    consultant: ConsultSession,
    options: RecommenderOptions,
}

impl Recommender {
    pub fn new(
        store: Arc<CandidateStore>,
        backend: Option<Arc<dyn ChatBackend>>,
        options: RecommenderOptions,
    ) -> Self {
        Self {
            store,
            selector: RerankSelector::new(backend.clone()),
            narrator: NarrativeGenerator::new(backend.clone()),
            consultant: ConsultSession::new(backend),
            options,
        }
    }

    pub fn store(&self) -> &CandidateStore {
        &self.store
    }

    /// Recipe list with narrative, or `None` when nothing was found
    pub async fn search_list(
        &self,
        query: &str,
        limit: usize,
        preferences: Option<&UserPreferences>,
    ) -> Option<RecipeListResponse> {
        tracing::info!("Searching recipe list for '{}', limit: {}", query, limit);

        let mut candidates = self.store.search(query, limit).await;

        if self.options.filter_list_results {
            candidates = apply_preferences(candidates, preferences);
        }

        let candidates = dedupe_by_name(candidates);
        if candidates.is_empty() {
            tracing::info!("No recipes found for '{}'", query);
            return None;
        }

        let narrative = self.narrator.summarize(query, &candidates).await;

        let response = list_response(candidates, narrative);

        tracing::info!(
            "Returning {} recipes for '{}'",
            response.candidates.len(),
            query
        );

        Some(response)
    }

    /// The single best recipe with an AI justification, or `None`
    pub async fn recommend(
        &self,
        query: &str,
        preferences: Option<&UserPreferences>,
    ) -> Option<RecipeResponse> {
        tracing::info!("Recommending best recipe for '{}'", query);

        let candidates = self.store.search(query, self.options.single_top_k).await;
        let candidates = dedupe_by_name(apply_preferences(candidates, preferences));

        if candidates.is_empty() {
            tracing::info!("No recipes left for '{}' after filtering", query);
            return None;
        }

        let decision = self.selector.select(query, &candidates).await;
        let index = decision.index.min(candidates.len() - 1);
        let best = candidates.into_iter().nth(index)?;

        tracing::info!("Selected candidate {}: {}", index, best.name);

        Some(recipe_response(best, decision.justification))
    }

    /// Follow-up answer grounded in a previous list
    pub async fn consult(&self, query: &str, context: &str, history: &[ConversationTurn]) -> String {
        tracing::info!("Consult question: '{}' ({} history turns)", query, history.len());
        self.consultant.reply(query, context, history).await
    }
}
