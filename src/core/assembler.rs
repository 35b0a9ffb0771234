//! Structured-field decoding and output assembly.
//!
//! Instructions and tags reach us either as real JSON arrays or as JSON text
//! (Chroma metadata only holds scalars). Anything that does not decode to an
//! array is treated as empty.

use serde_json::Value;

use crate::models::{CandidateRecipe, RecipeListResponse, RecipeResponse, RecipeStep};

/// Step image fields, in lookup order. Sources disagree on the name.
const STEP_IMAGE_FIELDS: [&str; 2] = ["image_url", "imgLink"];

const SPICY_MARKERS: &[&str] = &["spicy", "辣"];
const SOUP_MARKERS: &[&str] = &["soup", "汤"];

/// Decode instruction data into 1-based steps
pub fn decode_steps(raw: &Value) -> Vec<RecipeStep> {
    structured_array(raw, "instructions")
        .iter()
        .enumerate()
        .map(|(idx, step)| {
            let description = match step {
                Value::String(text) => text.clone(),
                other => other
                    .get("description")
                    .and_then(|d| d.as_str())
                    .unwrap_or_default()
                    .to_string(),
            };

            RecipeStep {
                step_index: idx + 1,
                description,
                image_url: resolve_step_image(step),
            }
        })
        .collect()
}

/// Decode tag data into plain strings
pub fn decode_tags(raw: &Value) -> Vec<String> {
    structured_array(raw, "tags")
        .into_iter()
        .map(|tag| match tag {
            Value::String(text) => text,
            other => other.to_string(),
        })
        .collect()
}

fn structured_array(raw: &Value, field: &str) -> Vec<Value> {
    match raw {
        Value::Array(items) => items.clone(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                tracing::debug!("Encoded {} is not an array, using empty list", field);
                Vec::new()
            }
            Err(e) => {
                tracing::debug!("Failed to decode {} ({}), using empty list", field, e);
                Vec::new()
            }
        },
        _ => Vec::new(),
    }
}

/// First non-empty image field of a step; `"null"` counts as absent
pub fn resolve_step_image(step: &Value) -> Option<String> {
    let link = STEP_IMAGE_FIELDS
        .iter()
        .filter_map(|field| step.get(*field).and_then(|v| v.as_str()))
        .find(|link| !link.trim().is_empty())?;

    clean_image(link)
}

/// Normalize an image reference, mapping empty and `"null"` to `None`
pub fn clean_image(link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() || link == "null" {
        None
    } else {
        Some(link.to_string())
    }
}

fn has_marker(tags: &[String], markers: &[&str]) -> bool {
    tags.iter().any(|tag| {
        let tag = tag.to_lowercase();
        markers.iter().any(|marker| tag.contains(marker))
    })
}

/// Rule-based commentary for list entries that get no AI comment of their own
pub fn placeholder_commentary(candidate: &CandidateRecipe) -> String {
    let match_figure = (candidate.score * 100.0).trunc() as i64;
    let mut comment = format!(
        "Based on your ingredients, this dish scores a {}% match.",
        match_figure
    );

    if has_marker(&candidate.tags, SPICY_MARKERS) {
        comment.push_str(" Note: this dish runs spicy, so consider easing off the chili.");
    } else if has_marker(&candidate.tags, SOUP_MARKERS) {
        comment.push_str(" A fine soup choice, warming and wholesome.");
    }

    comment
}

pub fn recipe_response(candidate: CandidateRecipe, message: String) -> RecipeResponse {
    RecipeResponse {
        recipe_id: candidate.id,
        recipe_name: candidate.name,
        tags: candidate.tags,
        cover_image: candidate.cover_image,
        steps: candidate.steps,
        message,
    }
}

/// Build the list output; each entry gets placeholder commentary
///
/// Expects candidates already deduplicated by name.
pub fn list_response(candidates: Vec<CandidateRecipe>, narrative: String) -> RecipeListResponse {
    let candidates = candidates
        .into_iter()
        .map(|candidate| {
            let message = placeholder_commentary(&candidate);
            recipe_response(candidate, message)
        })
        .collect();

    RecipeListResponse {
        candidates,
        ai_message: narrative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(name: &str, tags: &[&str], score: f64) -> CandidateRecipe {
        CandidateRecipe {
            id: format!("id-{}", name),
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            cover_image: None,
            steps: vec![],
            content: String::new(),
            score,
        }
    }

    #[test]
    fn test_decode_steps_from_encoded_text() {
        let raw = json!(r#"[{"description":"Chop","imgLink":"a.jpg"},{"description":"Fry","image_url":"null"}]"#);
        let steps = decode_steps(&raw);

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].step_index, 1);
        assert_eq!(steps[0].image_url.as_deref(), Some("a.jpg"));
        assert_eq!(steps[1].description, "Fry");
        assert_eq!(steps[1].image_url, None);
    }

    #[test]
    fn test_decode_steps_from_structured_value() {
        let raw = json!([{ "description": "Boil water" }]);
        let steps = decode_steps(&raw);
        assert_eq!(steps, vec![RecipeStep { step_index: 1, description: "Boil water".into(), image_url: None }]);
    }

    #[test]
    fn test_malformed_steps_decode_to_empty() {
        assert!(decode_steps(&json!("[{\"description\": ")).is_empty());
        assert!(decode_steps(&json!("not json")).is_empty());
        assert!(decode_steps(&json!("{\"description\":\"x\"}")).is_empty());
        assert!(decode_steps(&Value::Null).is_empty());
    }

    #[test]
    fn test_decode_tags() {
        assert_eq!(decode_tags(&json!("[\"spicy\",\"chicken\"]")), vec!["spicy", "chicken"]);
        assert_eq!(decode_tags(&json!(["soup", 3])), vec!["soup", "3"]);
        assert!(decode_tags(&json!("spicy, chicken")).is_empty());
    }

    #[test]
    fn test_image_url_wins_over_img_link() {
        let step = json!({ "image_url": "primary.jpg", "imgLink": "secondary.jpg" });
        assert_eq!(resolve_step_image(&step).as_deref(), Some("primary.jpg"));

        let step = json!({ "image_url": "", "imgLink": "secondary.jpg" });
        assert_eq!(resolve_step_image(&step).as_deref(), Some("secondary.jpg"));

        let step = json!({ "imgLink": "null" });
        assert_eq!(resolve_step_image(&step), None);
    }

    #[test]
    fn test_placeholder_commentary_spicy_advisory() {
        let comment = placeholder_commentary(&candidate("Kung Pao Chicken", &["Spicy"], 0.2));
        assert!(comment.contains("20%"));
        assert!(comment.contains("spicy"));
    }

    #[test]
    fn test_placeholder_commentary_soup_advisory() {
        let comment = placeholder_commentary(&candidate("番茄蛋汤", &["汤"], 0.35));
        assert!(comment.contains("35%"));
        assert!(comment.contains("soup"));
    }

    #[test]
    fn test_placeholder_figure_truncates() {
        let comment = placeholder_commentary(&candidate("Fish Soup", &[], 0.357));
        assert!(comment.contains("35%"), "{}", comment);

        let comment = placeholder_commentary(&candidate("Congee", &[], 0.999));
        assert!(comment.contains("99%"), "{}", comment);
    }

    #[test]
    fn test_placeholder_commentary_plain() {
        let comment = placeholder_commentary(&candidate("Toast", &["breakfast"], 0.5));
        assert_eq!(comment, "Based on your ingredients, this dish scores a 50% match.");
    }

    #[test]
    fn test_list_response_keeps_order() {
        let response = list_response(
            vec![
                candidate("Tomato Soup", &["soup"], 0.1),
                candidate("Salad", &[], 0.3),
            ],
            "narrative".to_string(),
        );

        let names: Vec<_> = response.candidates.iter().map(|c| c.recipe_name.as_str()).collect();
        assert_eq!(names, vec!["Tomato Soup", "Salad"]);
        assert_eq!(response.candidates[0].recipe_id, "id-Tomato Soup");
        assert_eq!(response.ai_message, "narrative");
    }
}
