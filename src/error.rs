//! Error types for the caching recommender
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Recommender Error Enum ==
/// Unified error type for the caching recommender and its HTTP front.
///
/// Cache-layer failures do not exist: the cache cannot fail, and a key that
/// cannot be derived only bypasses the cache.
#[derive(Error, Debug)]
pub enum RecommenderError {
    /// The external recommendation service failed; nothing was cached
    #[error("error fetching recommendation: {0:#}")]
    Fetch(#[source] anyhow::Error),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for RecommenderError {
    fn into_response(self) -> Response {
        let status = match &self {
            RecommenderError::Fetch(_) => StatusCode::BAD_GATEWAY,
            RecommenderError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching recommender.
pub type Result<T> = std::result::Result<T, RecommenderError>;
