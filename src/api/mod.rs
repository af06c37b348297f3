//! API Module
//!
//! HTTP handlers and routing for the recommendation service REST API.
//!
//! # Endpoints
//! - `POST /recommendation` - Recommendation for a workload descriptor
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
