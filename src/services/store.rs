use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::core::assembler::{clean_image, decode_steps, decode_tags};
use crate::models::CandidateRecipe;
use crate::services::chroma::ChromaError;
use crate::services::embedding::EmbeddingError;

/// Errors that can occur while loading or querying the similarity index
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Index error: {0}")]
    Index(#[from] ChromaError),

    #[error("Index unavailable: {0}")]
    Unavailable(String),
}

/// One raw k-NN result: document metadata, text and distance
#[derive(Debug, Clone, Default)]
pub struct IndexHit {
    pub metadata: Map<String, Value>,
    pub document: String,
    pub distance: f64,
}

/// A similarity index answering k-nearest-neighbor text queries
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<IndexHit>, StoreError>;
}

/// Builds the index handle (embedding model + index connection)
#[async_trait]
pub trait IndexLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn SimilarityIndex>, StoreError>;
}

/// Nearest-neighbor recipe search over a lazily loaded index
///
/// The handle is loaded at most once; concurrent first callers wait on the
/// same load. A failed load leaves the store empty-handed until the next call
/// tries again. Search never fails: an unavailable index yields no candidates.
pub struct CandidateStore {
    loader: Arc<dyn IndexLoader>,
    index: OnceCell<Arc<dyn SimilarityIndex>>,
    score_threshold: f64,
}

impl CandidateStore {
    pub fn new(loader: Arc<dyn IndexLoader>, score_threshold: f64) -> Self {
        Self {
            loader,
            index: OnceCell::new(),
            score_threshold,
        }
    }

    /// Wrap an already-built index
    pub fn with_index(index: Arc<dyn SimilarityIndex>, score_threshold: f64) -> Self {
        Self {
            loader: Arc::new(Preloaded(index.clone())),
            index: OnceCell::new_with(Some(index)),
            score_threshold,
        }
    }

    pub fn score_threshold(&self) -> f64 {
        self.score_threshold
    }

    pub fn is_loaded(&self) -> bool {
        self.index.initialized()
    }

    async fn handle(&self) -> Result<&Arc<dyn SimilarityIndex>, StoreError> {
        self.index.get_or_try_init(|| self.loader.load()).await
    }

    /// Up to `top_k` candidates, ascending by distance, none above the threshold
    pub async fn search(&self, query: &str, top_k: usize) -> Vec<CandidateRecipe> {
        if top_k == 0 {
            return Vec::new();
        }

        let index = match self.handle().await {
            Ok(index) => index,
            Err(e) => {
                tracing::error!("Similarity index failed to load: {}", e);
                return Vec::new();
            }
        };

        let hits = match index.similarity_search(query, top_k).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::error!("Similarity search failed for '{}': {}", query, e);
                return Vec::new();
            }
        };

        tracing::info!(
            "Retrieved {} hits for '{}' (threshold: {})",
            hits.len(),
            query,
            self.score_threshold
        );

        let mut candidates: Vec<CandidateRecipe> = hits
            .into_iter()
            .filter(|hit| hit.distance <= self.score_threshold)
            .map(candidate_from_hit)
            .collect();

        candidates.sort_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(top_k);

        for candidate in &candidates {
            tracing::debug!("  - {} (score: {:.4})", candidate.name, candidate.score);
        }

        candidates
    }
}

struct Preloaded(Arc<dyn SimilarityIndex>);

#[async_trait]
impl IndexLoader for Preloaded {
    async fn load(&self) -> Result<Arc<dyn SimilarityIndex>, StoreError> {
        Ok(self.0.clone())
    }
}

fn metadata_str<'a>(metadata: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    metadata.get(key).and_then(|v| v.as_str())
}

/// Map index metadata onto a typed candidate, applying field defaults
pub fn candidate_from_hit(hit: IndexHit) -> CandidateRecipe {
    let metadata = &hit.metadata;

    let id = match metadata.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => "unknown".to_string(),
    };

    let name = metadata_str(metadata, "name")
        .filter(|name| !name.trim().is_empty())
        .unwrap_or("Untitled")
        .to_string();

    CandidateRecipe {
        id,
        name,
        tags: metadata.get("tags").map(decode_tags).unwrap_or_default(),
        cover_image: metadata_str(metadata, "image").and_then(clean_image),
        steps: metadata.get("instructions").map(decode_steps).unwrap_or_default(),
        content: hit.document,
        score: hit.distance,
    }
}
