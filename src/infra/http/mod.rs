pub mod api;
mod middleware;

pub use api::{ApiState, build_api_router};

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, middleware as axum_middleware, routing::get};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;

use api::error::{ApiError, codes};
use middleware::{log_responses, set_request_context};

/// Full application router: health probe, page API, panic recovery and
/// response logging.
pub fn build_router(state: ApiState) -> Router {
    with_layers(
        Router::new()
            .route("/healthz", get(healthz))
            .merge(build_api_router(state)),
    )
}

fn with_layers(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "handler panicked".to_string()
    };

    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        codes::INTERNAL,
        "Internal server error",
        Some(detail),
    )
    .into_response()
}
