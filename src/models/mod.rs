//! Response models for the recommendation service API
//!
//! Workload descriptors and recommendations travel as raw JSON; only the
//! service's own bodies are typed here.

pub mod responses;

// Re-export commonly used types
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
