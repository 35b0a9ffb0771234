use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{CacheSettings, EmbeddingSettings};

/// Errors that can occur when vectorizing text
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Client for an OpenAI-compatible `/embeddings` endpoint
///
/// Query vectors are kept in an in-process cache, so repeated searches for the
/// same text skip the round trip.
pub struct EmbeddingClient {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
    cache: moka::future::Cache<String, Arc<Vec<f32>>>,
}

impl EmbeddingClient {
    pub fn new(settings: &EmbeddingSettings, cache: &CacheSettings) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        let cache = moka::future::CacheBuilder::new(cache.embedding_cache_size)
            .time_to_live(Duration::from_secs(cache.ttl_secs))
            .build();

        Ok(Self {
            base_url: settings.api_base.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            client,
            cache,
        })
    }

    /// Embed a single query text
    pub async fn embed_query(&self, text: &str) -> Result<Arc<Vec<f32>>, EmbeddingError> {
        if let Some(vector) = self.cache.get(text).await {
            tracing::trace!("Embedding cache hit: {}", text);
            return Ok(vector);
        }

        let url = format!("{}/embeddings", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
        });

        let mut request = self.client.post(&url).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(EmbeddingError::ApiError(format!(
                "Failed to embed query: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        let vector = parse_embedding_response(json)?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("Empty data array".into()))?;

        let vector = Arc::new(normalize(vector));
        self.cache.insert(text.to_string(), vector.clone()).await;

        Ok(vector)
    }
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| EmbeddingError::InvalidResponse("Missing data array".into()))?;

    let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());
    for (fallback_index, item) in data.iter().enumerate() {
        let index = item
            .get("index")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(fallback_index);
        let embedding = item
            .get("embedding")
            .and_then(|v| v.as_array())
            .ok_or_else(|| EmbeddingError::InvalidResponse("Item missing embedding array".into()))?;

        let vector = embedding
            .iter()
            .map(|value| {
                value
                    .as_f64()
                    .map(|n| n as f32)
                    .ok_or_else(|| EmbeddingError::InvalidResponse("Embedding value must be numeric".into()))
            })
            .collect::<Result<Vec<f32>, _>>()?;

        indexed.push((index, vector));
    }

    indexed.sort_by_key(|(index, _)| *index);

    Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}

/// Scale to unit length; the index was built from normalized embeddings
fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_embeddings_in_index_order() {
        let json = serde_json::json!({
            "data": [
                { "index": 1, "embedding": [2.0, 3.0] },
                { "index": 0, "embedding": [0.5, 1.5] }
            ]
        });
        let parsed = parse_embedding_response(json).unwrap();
        assert_eq!(parsed, vec![vec![0.5, 1.5], vec![2.0, 3.0]]);
    }

    #[test]
    fn test_rejects_missing_data() {
        let json = serde_json::json!({ "object": "list" });
        assert!(parse_embedding_response(json).is_err());
    }

    #[test]
    fn test_normalize_unit_length() {
        let v = normalize(vec![3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert_eq!(normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_embed_query_uses_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"index":0,"embedding":[1.0,0.0]}]}"#)
            .expect(1)
            .create_async()
            .await;

        let settings = EmbeddingSettings { api_base: server.url(), ..EmbeddingSettings::default() };
        let client = EmbeddingClient::new(&settings, &CacheSettings::default()).unwrap();

        let first = client.embed_query("tomato").await.unwrap();
        let second = client.embed_query("tomato").await.unwrap();

        assert_eq!(*first, vec![1.0, 0.0]);
        assert_eq!(first, second);
        mock.assert_async().await;
    }
}
