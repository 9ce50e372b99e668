pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{Router, routing::get};

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/pages/search", get(handlers::search_pages))
        .route("/api/pages/{page_id}", get(handlers::get_page))
        .route("/api/pages/{page_id}/posts", get(handlers::list_posts))
        .route(
            "/api/pages/{page_id}/employees",
            get(handlers::list_employees),
        )
        .route("/api/pages/{page_id}/comments", get(handlers::list_comments))
        .route(
            "/api/pages/{page_id}/followers",
            get(handlers::list_followers),
        )
        .route(
            "/api/pages/{page_id}/following",
            get(handlers::list_following),
        )
        .route(
            "/api/pages/{page_id}/ai-insights",
            get(handlers::get_insights),
        )
        .with_state(state)
}
