//! API Handlers
//!
//! HTTP request handlers for each recommendation service endpoint.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::error::{RecommenderError, Result};
use crate::models::{HealthResponse, StatsResponse};
use crate::recommender::{CachingRecommender, RecommenderApi};

/// Application state shared across all handlers.
///
/// Holds the caching recommender behind an `Arc`; the recommender does its
/// own locking.
pub struct AppState<A: RecommenderApi> {
    /// Shared caching recommender
    pub recommender: Arc<CachingRecommender<A>>,
}

impl<A: RecommenderApi> AppState<A> {
    /// Creates a new AppState around the given recommender.
    pub fn new(recommender: CachingRecommender<A>) -> Self {
        Self {
            recommender: Arc::new(recommender),
        }
    }
}

// Manual impl: only the `Arc` is cloned, `A` need not be `Clone`.
impl<A: RecommenderApi> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            recommender: Arc::clone(&self.recommender),
        }
    }
}

/// Handler for POST /recommendation
///
/// The body is the workload descriptor. Answers `200` with the
/// recommendation, `204` when the recommender has none.
pub async fn recommend_handler<A>(
    State(state): State<AppState<A>>,
    Json(descriptor): Json<Value>,
) -> Result<Response>
where
    A: RecommenderApi<Descriptor = Value, Recommendation = Value> + 'static,
{
    if descriptor.is_null() {
        return Err(RecommenderError::InvalidRequest(
            "workload descriptor must not be null".to_string(),
        ));
    }

    match state.recommender.get(&descriptor).await? {
        Some(recommendation) => Ok(Json(&*recommendation).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler<A>(State(state): State<AppState<A>>) -> Json<StatsResponse>
where
    A: RecommenderApi + 'static,
{
    Json(state.recommender.stats().await.into())
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
