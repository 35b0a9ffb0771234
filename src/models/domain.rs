use serde::{Deserialize, Serialize};

/// A recipe document returned by similarity search
///
/// Built once at the store boundary; every optional metadata field already
/// carries its default by the time downstream code sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub steps: Vec<RecipeStep>,
    /// Raw document text the embedding was computed from
    #[serde(default)]
    pub content: String,
    /// Distance to the query; lower is closer
    pub score: f64,
}

/// One instruction step, 1-based
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeStep {
    pub step_index: usize,
    pub description: String,
    pub image_url: Option<String>,
}

/// Dietary preferences supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub dislikes: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default, alias = "cuisineStyle")]
    pub cuisine_style: Option<String>,
}

/// Which candidate the generative backend picked, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RerankDecision {
    pub index: usize,
    pub justification: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

/// One prior exchange in a consult conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: TurnRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: TurnRole::Assistant, content: content.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_accept_camel_case_cuisine() {
        let prefs: UserPreferences = serde_json::from_value(serde_json::json!({
            "dislikes": ["cilantro"],
            "cuisineStyle": "Sichuan"
        }))
        .unwrap();

        assert_eq!(prefs.dislikes, vec!["cilantro"]);
        assert!(prefs.allergies.is_empty());
        assert_eq!(prefs.cuisine_style.as_deref(), Some("Sichuan"));
    }

    #[test]
    fn test_turn_role_round_trip() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
        assert_eq!(turn, ConversationTurn::assistant("hi"));
        assert_eq!(turn.role.as_str(), "assistant");
    }
}
