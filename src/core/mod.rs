// Core pipeline exports
pub mod assembler;
pub mod consult;
pub mod filters;
pub mod narrative;
pub mod normalize;
pub mod prompts;
pub mod recommender;
pub mod rerank;

pub use consult::ConsultSession;
pub use filters::{apply_preferences, avoid_list, dedupe_by_name};
pub use narrative::NarrativeGenerator;
pub use normalize::normalize_content;
pub use recommender::{Recommender, RecommenderOptions};
pub use rerank::{parse_decision, RerankSelector};
