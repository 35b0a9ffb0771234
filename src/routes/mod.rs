// Route exports
pub mod recipes;

use actix_web::web;

pub use recipes::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(recipes::configure),
    );
}
