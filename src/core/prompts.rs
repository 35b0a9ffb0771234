//! Persona prompts sent to the generative backend.

use crate::models::{CandidateRecipe, ConversationTurn};

/// Token separating the chosen index from the justification
pub const RERANK_SEPARATOR: &str = "|||";

/// Characters of recipe text shown per candidate when reranking
pub const SNIPPET_CHARS: usize = 150;

pub const RERANK_SYSTEM: &str = "\
You are a clever, adaptable private chef. From the candidate recipes given, \
recommend the single one that suits the user best.

How to choose:
1. Find the best overlap: prefer the dish whose ingredients and flavours are \
closest to what the user asked for.
2. Handle restrictions flexibly:
   - If the user says \"not spicy\", prefer a dish that is not spicy.
   - Crucially, if every candidate breaks the restriction, DO NOT refuse. Pick \
the dish that is easiest to adapt (for example, swap chili oil for sesame oil) \
and tell the user how to adjust it in your reason.
3. Advise, don't just choose: the reason should say why this dish, or how to \
make it fit the request better.

Output format:
Reply with exactly one line: index ||| reason
(for example: 1 ||| The original uses chili, but leave out the chili oil and it \
stays just as savoury, a good fit for you.)";

pub const NARRATIVE_SYSTEM: &str = "\
You are the head-chef consultant of an upscale family restaurant. The user may \
only have typed a few ingredient names. Based on the recipes found, give them a \
short, professional, elegant and well-judged opening recommendation.

Guidelines:
1. Professional tone: courteous, warm and polished (e.g. \"I have selected the \
following dishes for you...\"). No teasing, no over-the-top enthusiasm.
2. Summarise the highlights: capture what makes the dishes special.
3. Offer advice: briefly mention pairings or flavour notes.
4. Humour and interaction (HIGHEST PRIORITY):
   - Always check first, whether or not recipes were found: does the user's \
input contain strange, absurd, unsafe or joking terms (inedible items, poison, \
concrete and the like), or an incongruous pairing of ingredients?
   - Mixed input: if the user asks for \"chocolate and concrete\", even though \
chocolate recipes exist you MUST first react to the absurd ingredient, then \
recommend the chocolate dishes.
   - Example: \"Chocolate I understand, but concrete? For the sake of your \
teeth, let me stick to proper chocolate recipes...\"
   - Never ignore it: pretending not to see the odd term and answering only the \
normal part is not acceptable.
5. Format: no emoji. Keep it within about 100 characters.";

pub const CONSULT_SYSTEM: &str = "\
You are the head-chef consultant of an upscale family restaurant. Using the \
current search-result context and the conversation history, answer the user's \
follow-up question.

Requirements:
1. Professional, elegant, with a light touch of wit.
2. If the user wants a different flavour, recommend from the other dishes in \
the list, or give cooking advice.
3. Keep the answer to about 100 characters.";

/// First `max_chars` characters of `text`, newlines flattened
pub fn snippet(text: &str, max_chars: usize) -> String {
    text.chars()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

fn tags_display(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_default()
}

pub fn rerank_user_prompt(query: &str, candidates: &[CandidateRecipe]) -> String {
    let listing: String = candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            format!(
                "Option[{}]: {}\n   - Tags: {}\n   - Summary: {}...\n\n",
                i,
                candidate.name,
                tags_display(&candidate.tags),
                snippet(&candidate.content, SNIPPET_CHARS),
            )
        })
        .collect();

    format!(
        "User request: [{}]\n\nCandidates:\n{}\nMake your choice:",
        query, listing
    )
}

pub fn narrative_user_prompt(query: &str, candidates: &[CandidateRecipe]) -> String {
    let summary: String = candidates
        .iter()
        .map(|candidate| format!("- {} (Tags: {})\n", candidate.name, tags_display(&candidate.tags)))
        .collect();

    format!(
        "What the user wants to eat / has on hand: [{}]\nRecipes found:\n{}\nGive the user a short, refined recommendation:",
        query, summary
    )
}

pub fn consult_user_prompt(query: &str, context: &str, history: &[ConversationTurn]) -> String {
    let history = history
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "[Current recipe list context]:\n{}\n\n[Conversation history]:\n{}\n\n[User's new question]:\n{}\n\nPlease answer, chef:",
        context, history, query
    )
}
