use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{ConversationTurn, UserPreferences};

/// Request body for the list search endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1, max = 500))]
    pub query: String,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
    #[serde(default)]
    pub preferences: Option<UserPreferences>,
}

/// Request body for the single-best recommendation endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    #[validate(length(min = 1, max = 500))]
    pub query: String,
    #[serde(default)]
    pub preferences: Option<UserPreferences>,
}

/// Request body for the consult endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConsultRequest {
    #[validate(length(min = 1, max = 1000))]
    pub query: String,
    /// Summary of the recipe list the user is looking at
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
}
