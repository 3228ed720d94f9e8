//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the versioned review API and a health probe under a single Axum
//! router. CORS is open because the service is only reachable through the
//! gateway; request tracing is handled by `tower-http`.

pub mod auth;
pub mod reviews;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/reviews", get(reviews::list_reviews).post(reviews::create_review))
        .route(
            "/api/v1/reviews/{review_id}",
            put(reviews::update_review).delete(reviews::delete_review),
        )
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz(State(state): State<AppState>) -> StatusCode {
    match state.reviews.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
