use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::models::api::ErrorResponse;

pub mod analysis;
pub mod health;
pub mod keywords;
pub mod metrics;

/// API routes with the standard layer stack. `/metrics` is mounted by the binary.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/v1/analysis/{client_id}",
            post(analysis::start_analysis)
                .get(analysis::get_analysis)
                .delete(analysis::cancel_analysis),
        )
        .route("/api/v1/keywords/rank", post(keywords::rank_keywords))
        .route("/api/v1/keywords/selection", post(keywords::apply_selection))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024)) // 2 MB limit
}

/// Error half of handler results: status plus `{error}` body.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}
