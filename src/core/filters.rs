use std::collections::HashSet;

use crate::models::{CandidateRecipe, UserPreferences};

/// Lower-cased union of non-empty dislikes and allergies
pub fn avoid_list(preferences: &UserPreferences) -> Vec<String> {
    preferences
        .dislikes
        .iter()
        .chain(preferences.allergies.iter())
        .map(|term| term.trim())
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Text an avoid term is matched against: name, tags and content, lower-cased
#[inline]
fn searchable_text(candidate: &CandidateRecipe) -> String {
    let tags = serde_json::to_string(&candidate.tags).unwrap_or_default();
    format!("{}{}{}", candidate.name, tags, candidate.content).to_lowercase()
}

/// Drop candidates mentioning anything the user avoids
///
/// Survivors keep their order and scores. With no preferences, or an empty
/// avoid list, the input is returned as is.
pub fn apply_preferences(
    candidates: Vec<CandidateRecipe>,
    preferences: Option<&UserPreferences>,
) -> Vec<CandidateRecipe> {
    let avoid = match preferences {
        Some(preferences) => avoid_list(preferences),
        None => return candidates,
    };

    if avoid.is_empty() {
        return candidates;
    }

    tracing::debug!("Filtering candidates against avoid list: {:?}", avoid);

    candidates
        .into_iter()
        .filter(|candidate| {
            let text = searchable_text(candidate);
            match avoid.iter().find(|term| text.contains(term.as_str())) {
                Some(term) => {
                    tracing::debug!("Excluding '{}' (contains avoided term: {})", candidate.name, term);
                    false
                }
                None => true,
            }
        })
        .collect()
}

/// Keep the first candidate of each name, in input order
pub fn dedupe_by_name(candidates: Vec<CandidateRecipe>) -> Vec<CandidateRecipe> {
    let mut seen = HashSet::with_capacity(candidates.len());

    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.name.clone()))
        .collect()
}
