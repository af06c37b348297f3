//! Recommender Module
//!
//! Memoizes an external recommendation service behind a [`TtlCache`](crate::cache::TtlCache),
//! keyed by the content digest of the workload descriptor.
//!
//! # Flow
//! descriptor → [`WorkloadDigest`] → cache lookup → (hit: cached value) |
//! (miss: [`RecommenderApi`] call → store non-empty success → return)

mod api;
mod caching;
mod canonical;
mod digest;

pub use api::RecommenderApi;
pub use caching::CachingRecommender;
pub use digest::{DigestError, WorkloadDigest};
