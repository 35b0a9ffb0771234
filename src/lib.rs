//! AIChef - recipe recommendation service
//!
//! Retrieves candidate recipes from a vector index, filters them against the
//! user's dislikes and allergies, and has a generative model pick or describe
//! the results. Every model-dependent step has a fixed fallback, so the service
//! keeps answering without a backend.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Recommender, RecommenderOptions};
pub use crate::models::{CandidateRecipe, RecipeListResponse, RecipeResponse, UserPreferences};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let options = RecommenderOptions::default();
        assert_eq!(options.single_top_k, 6);
        assert!(UserPreferences::default().dislikes.is_empty());
    }
}
