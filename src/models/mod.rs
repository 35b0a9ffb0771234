// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{CandidateRecipe, ConversationTurn, RecipeStep, RerankDecision, TurnRole, UserPreferences};
pub use requests::{ConsultRequest, RecommendRequest, SearchRequest};
pub use responses::{ConsultResponse, ErrorResponse, HealthResponse, RecipeListResponse, RecipeResponse};
