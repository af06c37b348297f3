//! API Routes
//!
//! Configures the Axum router with all recommendation service endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{health_handler, recommend_handler, stats_handler, AppState};
use crate::recommender::RecommenderApi;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /recommendation` - Recommendation for the JSON workload descriptor in the body
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router<A>(state: AppState<A>) -> Router
where
    A: RecommenderApi<Descriptor = Value, Recommendation = Value> + 'static,
{
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/recommendation", post(recommend_handler::<A>))
        .route("/stats", get(stats_handler::<A>))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
