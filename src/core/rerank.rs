use regex::Regex;
use std::sync::{Arc, OnceLock};

use crate::core::normalize::normalize_content;
use crate::core::prompts::{rerank_user_prompt, RERANK_SEPARATOR, RERANK_SYSTEM};
use crate::models::{CandidateRecipe, RerankDecision};
use crate::services::llm::{ChatBackend, ChatMessage};

pub const RERANK_NO_BACKEND: &str = "No API key configured, here is the default recommendation:";
pub const RERANK_BACKEND_FAILED: &str = "Here are the recipes recommended for you:";
pub const RERANK_NO_CANDIDATES: &str = "No candidate recipes.";

/// Asks the generative backend for the single best candidate
///
/// `select` never fails: for a non-empty candidate list the returned index is
/// always in bounds, and the justification is never empty.
#[derive(Clone)]
pub struct RerankSelector {
    backend: Option<Arc<dyn ChatBackend>>,
}

impl RerankSelector {
    pub fn new(backend: Option<Arc<dyn ChatBackend>>) -> Self {
        Self { backend }
    }

    pub async fn select(&self, query: &str, candidates: &[CandidateRecipe]) -> RerankDecision {
        let Some(backend) = &self.backend else {
            return fallback(RERANK_NO_BACKEND);
        };

        if candidates.is_empty() {
            return fallback(RERANK_NO_CANDIDATES);
        }

        let messages = [
            ChatMessage::system(RERANK_SYSTEM),
            ChatMessage::user(rerank_user_prompt(query, candidates)),
        ];

        match backend.invoke(&messages).await {
            Ok(reply) => {
                let text = normalize_content(&reply.content);
                tracing::debug!("Rerank reply: {}", text);
                parse_decision(&text, candidates)
            }
            Err(e) => {
                tracing::error!("Rerank backend call failed: {}", e);
                fallback(RERANK_BACKEND_FAILED)
            }
        }
    }
}

fn fallback(justification: &str) -> RerankDecision {
    RerankDecision {
        index: 0,
        justification: justification.to_string(),
    }
}

/// Index and optional justification as the backend wrote them
#[derive(Debug, PartialEq, Eq)]
struct RawPick {
    index: usize,
    justification: Option<String>,
}

fn parse_pick(text: &str) -> Option<RawPick> {
    if let Some((left, right)) = text.split_once(RERANK_SEPARATOR) {
        if let Some(index) = first_integer(left) {
            return Some(RawPick {
                index,
                justification: Some(right.trim().to_string()),
            });
        }
    }

    leading_integer(text).map(|index| RawPick { index, justification: None })
}

/// Zero code points of the decimal digit blocks backends are known to emit
const DIGIT_ZEROS: [char; 4] = ['0', '\u{0660}', '\u{06F0}', '\u{FF10}'];

fn digit_runs() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"\d+").expect("valid digit pattern"))
}

fn digit_value(c: char) -> Option<usize> {
    DIGIT_ZEROS.iter().find_map(|&zero| {
        let offset = (c as u32).checked_sub(zero as u32)?;
        (offset < 10).then_some(offset as usize)
    })
}

/// Value of a digit run; overflow or an unknown digit block reads as
/// `usize::MAX`, i.e. out of range
fn run_to_index(run: &str) -> usize {
    run.chars()
        .try_fold(0usize, |acc, c| acc.checked_mul(10)?.checked_add(digit_value(c)?))
        .unwrap_or(usize::MAX)
}

fn first_integer(text: &str) -> Option<usize> {
    digit_runs().find(text).map(|run| run_to_index(run.as_str()))
}

fn leading_integer(text: &str) -> Option<usize> {
    digit_runs()
        .find(text)
        .filter(|run| run.start() == 0)
        .map(|run| run_to_index(run.as_str()))
}

/// Turn normalized backend text into a decision that is valid for `candidates`
pub fn parse_decision(text: &str, candidates: &[CandidateRecipe]) -> RerankDecision {
    let Some(first) = candidates.first() else {
        return fallback(RERANK_NO_CANDIDATES);
    };

    let Some(pick) = parse_pick(text) else {
        tracing::warn!("Unparseable rerank reply, defaulting to first candidate");
        return RerankDecision {
            index: 0,
            justification: format!("Try this one: [{}], it should be good!", first.name),
        };
    };

    let index = if pick.index < candidates.len() {
        pick.index
    } else {
        tracing::warn!(
            "Rerank index {} out of range for {} candidates, using 0",
            pick.index,
            candidates.len()
        );
        0
    };

    let justification = pick
        .justification
        .filter(|j| !j.is_empty())
        .unwrap_or_else(|| format!("Recommended for you: [{}]", candidates[index].name));

    RerankDecision { index, justification }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm::{BackendError, ChatReply};
    use async_trait::async_trait;

    fn candidates(names: &[&str]) -> Vec<CandidateRecipe> {
        names
            .iter()
            .map(|name| CandidateRecipe {
                id: name.to_string(),
                name: name.to_string(),
                tags: vec![],
                cover_image: None,
                steps: vec![],
                content: String::new(),
                score: 0.1,
            })
            .collect()
    }

    #[test]
    fn test_parses_separator_line() {
        let decision = parse_decision("1 ||| Leave out the chili oil.", &candidates(&["A", "B"]));
        assert_eq!(decision.index, 1);
        assert_eq!(decision.justification, "Leave out the chili oil.");
    }

    #[test]
    fn test_first_integer_in_left_segment() {
        let decision = parse_decision("Index: 2 ||| nice", &candidates(&["A", "B", "C"]));
        assert_eq!(decision.index, 2);
        assert_eq!(decision.justification, "nice");
    }

    #[test]
    fn test_splits_only_once() {
        let decision = parse_decision("0 ||| a ||| b", &candidates(&["A"]));
        assert_eq!(decision.justification, "a ||| b");
    }

    #[test]
    fn test_out_of_range_corrected_to_zero() {
        let decision = parse_decision("2 ||| try this", &candidates(&["A", "B"]));
        assert_eq!(decision.index, 0);
        assert_eq!(decision.justification, "try this");
    }

    #[test]
    fn test_leading_integer_synthesizes_justification() {
        let decision = parse_decision("1. Mapo Tofu is best", &candidates(&["Kung Pao", "Mapo Tofu"]));
        assert_eq!(decision.index, 1);
        assert_eq!(decision.justification, "Recommended for you: [Mapo Tofu]");
    }

    #[test]
    fn test_separator_without_integer_falls_through() {
        let decision = parse_decision("best ||| the soup", &candidates(&["Soup", "Salad"]));
        assert_eq!(decision.index, 0);
        assert_eq!(decision.justification, "Try this one: [Soup], it should be good!");
    }

    #[test]
    fn test_empty_justification_is_synthesized() {
        let decision = parse_decision("1 |||   ", &candidates(&["A", "B"]));
        assert_eq!(decision.index, 1);
        assert_eq!(decision.justification, "Recommended for you: [B]");
    }

    #[test]
    fn test_full_width_index() {
        let decision = parse_decision("１ ||| 去掉辣椒油即可", &candidates(&["A", "B"]));
        assert_eq!(decision.index, 1);
        assert_eq!(decision.justification, "去掉辣椒油即可");

        let decision = parse_decision("２。清淡一些", &candidates(&["A", "B", "C"]));
        assert_eq!(decision.index, 2);
        assert_eq!(decision.justification, "Recommended for you: [C]");
    }

    #[test]
    fn test_multi_digit_index() {
        let names: Vec<String> = (0..12).map(|i| format!("R{}", i)).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let decision = parse_decision("Option 11 ||| last one", &candidates(&names));
        assert_eq!(decision.index, 11);
    }

    #[test]
    fn test_overflowing_index_corrected() {
        let decision = parse_decision("99999999999999999999999 ||| x", &candidates(&["A"]));
        assert_eq!(decision.index, 0);
    }

    #[test]
    fn test_garbage_and_empty_text() {
        for text in ["", "I cannot decide", "-1 ||| nope"] {
            let decision = parse_decision(text, &candidates(&["A", "B"]));
            assert!(decision.index < 2, "index out of range for {:?}", text);
            assert!(!decision.justification.is_empty());
        }
    }

    struct FixedBackend(&'static str);

    #[async_trait]
    impl ChatBackend for FixedBackend {
        async fn invoke(&self, _messages: &[ChatMessage]) -> Result<ChatReply, BackendError> {
            Ok(ChatReply::text(self.0))
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_with_backend() {
        let selector = RerankSelector::new(Some(Arc::new(FixedBackend("1 ||| anything"))));
        let decision = selector.select("soup", &[]).await;
        assert_eq!(decision, fallback(RERANK_NO_CANDIDATES));
    }

    #[tokio::test]
    async fn test_backend_reply_is_parsed() {
        let selector = RerankSelector::new(Some(Arc::new(FixedBackend("  1 ||| Milder broth  "))));
        let decision = selector.select("not spicy", &candidates(&["A", "B"])).await;
        assert_eq!(decision.index, 1);
        assert_eq!(decision.justification, "Milder broth");
    }

    #[tokio::test]
    async fn test_no_backend_defaults_to_first() {
        let selector = RerankSelector::new(None);
        let decision = selector.select("soup", &candidates(&["A", "B"])).await;
        assert_eq!(decision, fallback(RERANK_NO_BACKEND));
    }
}
