use serde::{Deserialize, Serialize};

use crate::models::domain::RecipeStep;

/// One recipe as returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub recipe_id: String,
    pub recipe_name: String,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub steps: Vec<RecipeStep>,
    /// Commentary for this recipe (AI justification or rule-based placeholder)
    pub message: String,
}

/// Recipe list plus the narrative written for it
///
/// No two entries in `candidates` share a `recipe_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeListResponse {
    pub candidates: Vec<RecipeResponse>,
    pub ai_message: String,
}

/// Consult endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultResponse {
    pub reply: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
