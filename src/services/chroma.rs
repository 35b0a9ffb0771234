use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{CacheSettings, EmbeddingSettings, IndexSettings};
use crate::services::embedding::EmbeddingClient;
use crate::services::store::{IndexHit, IndexLoader, SimilarityIndex, StoreError};

/// Errors that can occur when talking to Chroma
#[derive(Debug, Error)]
pub enum ChromaError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Collection not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Chroma collection queried over its REST API
///
/// The query text is embedded client-side and sent as `query_embeddings`.
pub struct ChromaIndex {
    base_url: String,
    collection_id: String,
    client: Client,
    embedder: EmbeddingClient,
}

impl ChromaIndex {
    /// Resolve the named collection and build an index handle for it
    pub async fn connect(
        settings: &IndexSettings,
        embedder: EmbeddingClient,
    ) -> Result<Self, ChromaError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        let base_url = settings.url.trim_end_matches('/').to_string();

        let url = format!(
            "{}/api/v1/collections/{}",
            base_url,
            urlencoding::encode(&settings.collection)
        );

        tracing::debug!("Resolving Chroma collection from: {}", url);

        let response = client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ChromaError::NotFound(settings.collection.clone()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(ChromaError::ApiError(format!(
                "Failed to resolve collection {}: {} - {}",
                settings.collection, status, body
            )));
        }

        let json: Value = response.json().await?;
        let collection_id = json
            .get("id")
            .and_then(|id| id.as_str())
            .ok_or_else(|| ChromaError::InvalidResponse("Collection missing id".into()))?
            .to_string();

        Ok(Self {
            base_url,
            collection_id,
            client,
            embedder,
        })
    }

    async fn query(&self, embedding: &[f32], n_results: usize) -> Result<Vec<IndexHit>, ChromaError> {
        let url = format!(
            "{}/api/v1/collections/{}/query",
            self.base_url, self.collection_id
        );
        let body = serde_json::json!({
            "query_embeddings": [embedding],
            "n_results": n_results,
            "include": ["metadatas", "documents", "distances"],
        });

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(ChromaError::ApiError(format!(
                "Failed to query collection: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        parse_query_response(&json)
    }
}

#[async_trait]
impl SimilarityIndex for ChromaIndex {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<IndexHit>, StoreError> {
        let embedding = self.embedder.embed_query(query).await?;
        Ok(self.query(&embedding, k).await?)
    }
}

/// Chroma results are column-major, one inner list per query embedding
fn parse_query_response(json: &Value) -> Result<Vec<IndexHit>, ChromaError> {
    let distances = first_row(json, "distances")
        .ok_or_else(|| ChromaError::InvalidResponse("Missing distances".into()))?;
    let documents = first_row(json, "documents");
    let metadatas = first_row(json, "metadatas");

    let hits = distances
        .iter()
        .enumerate()
        .map(|(i, distance)| {
            let distance = distance
                .as_f64()
                .ok_or_else(|| ChromaError::InvalidResponse("Distance must be numeric".into()))?;
            let document = documents
                .and_then(|docs| docs.get(i))
                .and_then(|d| d.as_str())
                .unwrap_or_default()
                .to_string();
            let metadata = metadatas
                .and_then(|metas| metas.get(i))
                .and_then(|m| m.as_object())
                .cloned()
                .unwrap_or_default();

            Ok(IndexHit {
                metadata,
                document,
                distance,
            })
        })
        .collect::<Result<Vec<_>, ChromaError>>()?;

    tracing::debug!("Chroma returned {} hits", hits.len());

    Ok(hits)
}

fn first_row<'a>(json: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    json.get(key)
        .and_then(|v| v.as_array())
        .and_then(|rows| rows.first())
        .and_then(|row| row.as_array())
}

/// Builds the Chroma index handle the first time the store needs it
pub struct ChromaLoader {
    index: IndexSettings,
    embedding: EmbeddingSettings,
    cache: CacheSettings,
}

impl ChromaLoader {
    pub fn new(index: IndexSettings, embedding: EmbeddingSettings, cache: CacheSettings) -> Self {
        Self { index, embedding, cache }
    }
}

#[async_trait]
impl IndexLoader for ChromaLoader {
    async fn load(&self) -> Result<Arc<dyn SimilarityIndex>, StoreError> {
        tracing::info!(
            "Initializing similarity index: {} ({})",
            self.index.url,
            self.index.collection
        );

        let embedder = EmbeddingClient::new(&self.embedding, &self.cache)?;
        let index = ChromaIndex::connect(&self.index, embedder).await?;

        tracing::info!("Similarity index ready (collection id: {})", index.collection_id);

        Ok(Arc::new(index))
    }
}
