// Criterion benchmarks for AIChef

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use aichef::core::{
    assembler::list_response,
    filters::{apply_preferences, dedupe_by_name},
    normalize::normalize_content,
    rerank::parse_decision,
};
use aichef::models::{CandidateRecipe, UserPreferences};
use serde_json::json;

const DISHES: &[&str] = &[
    "Kung Pao Chicken",
    "Tomato Egg Soup",
    "Mapo Tofu",
    "Fish Fragrant Eggplant",
    "Hot and Sour Soup",
    "Twice Cooked Pork",
    "Steamed Sea Bass",
];

fn create_candidate(id: usize) -> CandidateRecipe {
    let name = DISHES[id % DISHES.len()];
    CandidateRecipe {
        id: id.to_string(),
        name: name.to_string(),
        tags: vec!["home".to_string(), if id % 3 == 0 { "spicy" } else { "mild" }.to_string()],
        cover_image: None,
        steps: vec![],
        content: format!("{}: ginger, garlic, scallion{}", name, if id % 5 == 0 { ", cilantro" } else { "" }),
        score: (id % 100) as f64 / 100.0,
    }
}

fn create_preferences() -> UserPreferences {
    UserPreferences {
        dislikes: vec!["Cilantro".to_string(), "celery".to_string()],
        allergies: vec!["peanut".to_string()],
        cuisine_style: None,
    }
}

fn bench_preference_filter(c: &mut Criterion) {
    let preferences = create_preferences();

    let mut group = c.benchmark_group("preference_filter");

    for candidate_count in [6, 20, 100, 500].iter() {
        let candidates: Vec<CandidateRecipe> = (0..*candidate_count).map(create_candidate).collect();

        group.bench_with_input(
            BenchmarkId::new("apply_preferences", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| apply_preferences(black_box(candidates.clone()), black_box(Some(&preferences))));
            },
        );
    }

    group.finish();
}

fn bench_dedupe(c: &mut Criterion) {
    let candidates: Vec<CandidateRecipe> = (0..100).map(create_candidate).collect();

    c.bench_function("dedupe_by_name_100_candidates", |b| {
        b.iter(|| dedupe_by_name(black_box(candidates.clone())));
    });
}

fn bench_list_assembly(c: &mut Criterion) {
    let candidates: Vec<CandidateRecipe> = (0..20).map(create_candidate).collect();

    c.bench_function("list_response_20_candidates", |b| {
        b.iter(|| list_response(dedupe_by_name(black_box(candidates.clone())), black_box(String::from("Enjoy!"))));
    });
}

fn bench_normalize_content(c: &mut Criterion) {
    let plain = json!("  2 ||| Hearty and warming  ");
    let parts = json!([{ "type": "text", "text": "Spicy tonight?" }, { "type": "text", "text": "Try the tofu." }]);
    let python_literal = json!("{'type': 'text', 'text': 'A light soup to finish.'}");

    let mut group = c.benchmark_group("normalize_content");
    group.bench_function("plain", |b| b.iter(|| normalize_content(black_box(&plain))));
    group.bench_function("parts", |b| b.iter(|| normalize_content(black_box(&parts))));
    group.bench_function("python_literal", |b| b.iter(|| normalize_content(black_box(&python_literal))));
    group.finish();
}

fn bench_parse_decision(c: &mut Criterion) {
    let candidates: Vec<CandidateRecipe> = (0..6).map(create_candidate).collect();

    c.bench_function("parse_decision", |b| {
        b.iter(|| parse_decision(black_box("Option 3 ||| Bold flavors, quick to cook"), black_box(&candidates)));
    });
}

criterion_group!(
    benches,
    bench_preference_filter,
    bench_dedupe,
    bench_list_assembly,
    bench_normalize_content,
    bench_parse_decision
);

criterion_main!(benches);
