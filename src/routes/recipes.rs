use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use tracing::Instrument;
use validator::Validate;

use crate::config::SearchSettings;
use crate::core::Recommender;
use crate::models::{
    ConsultRequest, ConsultResponse, ErrorResponse, HealthResponse, RecommendRequest, SearchRequest,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub search: SearchSettings,
}

/// Configure all recipe-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/search", web::post().to(search_recipes))
        .route("/recommend", web::post().to(recommend_recipe))
        .route("/consult", web::post().to(consult_chef));
}

fn request_span(endpoint: &'static str) -> tracing::Span {
    tracing::info_span!("request", endpoint, request_id = %uuid::Uuid::new_v4())
}

fn bad_request(error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: 400,
    })
}

fn not_found(query: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        error: "No recipes found".to_string(),
        message: format!("No recipes matched '{}'. Try other ingredients or dish names.", query),
        status_code: 404,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.recommender.store().is_loaded() { "healthy" } else { "starting" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Recipe list endpoint
///
/// POST /api/v1/search
///
/// Request body:
/// ```json
/// {
///   "query": "tomato and egg",
///   "limit": 5,
///   "preferences": { "dislikes": ["cilantro"], "allergies": [], "cuisineStyle": "" }
/// }
/// ```
async fn search_recipes(state: web::Data<AppState>, req: web::Json<SearchRequest>) -> impl Responder {
    async move {
        if let Err(errors) = req.validate() {
            tracing::info!("Validation failed for search request: {:?}", errors);
            return bad_request("Validation failed", errors.to_string());
        }

        let query = req.query.trim();
        if query.is_empty() {
            return bad_request("Validation failed", "query must not be blank");
        }

        let limit = req
            .limit
            .unwrap_or(state.search.default_limit)
            .min(state.search.max_limit);

        match state
            .recommender
            .search_list(query, limit, req.preferences.as_ref())
            .await
        {
            Some(response) => HttpResponse::Ok().json(response),
            None => not_found(query),
        }
    }
    .instrument(request_span("search"))
    .await
}

/// Single-best recommendation endpoint
///
/// POST /api/v1/recommend
async fn recommend_recipe(
    state: web::Data<AppState>,
    req: web::Json<RecommendRequest>,
) -> impl Responder {
    async move {
        if let Err(errors) = req.validate() {
            tracing::info!("Validation failed for recommend request: {:?}", errors);
            return bad_request("Validation failed", errors.to_string());
        }

        let query = req.query.trim();
        if query.is_empty() {
            return bad_request("Validation failed", "query must not be blank");
        }

        match state
            .recommender
            .recommend(query, req.preferences.as_ref())
            .await
        {
            Some(response) => HttpResponse::Ok().json(response),
            None => not_found(query),
        }
    }
    .instrument(request_span("recommend"))
    .await
}

/// Follow-up question about a returned list
///
/// POST /api/v1/consult
async fn consult_chef(state: web::Data<AppState>, req: web::Json<ConsultRequest>) -> impl Responder {
    async move {
        if let Err(errors) = req.validate() {
            return bad_request("Validation failed", errors.to_string());
        }

        let query = req.query.trim();
        if query.is_empty() {
            return bad_request("Validation failed", "query must not be blank");
        }

        let reply = state
            .recommender
            .consult(query, &req.context, &req.history)
            .await;

        HttpResponse::Ok().json(ConsultResponse { reply })
    }
    .instrument(request_span("consult"))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        let response = not_found("dragon fruit stew");
        assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_bad_request_status() {
        let response = bad_request("Validation failed", "query must not be blank");
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
