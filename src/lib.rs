//! Recommender Cache - memoized access to an external recommendation service
//!
//! Recommendations are cached by the content digest of the workload
//! descriptor and expire after a fixed TTL; a background task sweeps expired
//! entries.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod recommender;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use cache::TtlCache;
pub use config::Config;
pub use error::RecommenderError;
pub use recommender::{CachingRecommender, RecommenderApi, WorkloadDigest};
pub use upstream::HttpRecommenderApi;
