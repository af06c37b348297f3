use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{CacheStatsSnapshot, TtlCache};
use crate::error::{RecommenderError, Result};
use crate::recommender::{RecommenderApi, WorkloadDigest};

/// Serves recommendations from a [`RecommenderApi`], caching successful,
/// non-empty answers by the content digest of the descriptor.
///
/// Construction starts a background sweep of the cache. Call
/// [`CachingRecommender::close`] when done with it; dropping the recommender
/// stops the sweep as well.
///
/// Concurrent misses for the same descriptor are not coalesced: each one
/// calls the API and the last answer stored wins.
pub struct CachingRecommender<A: RecommenderApi> {
    api: A,
    cache: TtlCache<WorkloadDigest, A::Recommendation>,
}

impl<A: RecommenderApi> CachingRecommender<A> {
    /// Creates a recommender whose cached answers live for `ttl`.
    ///
    /// The sweep runs every `ttl` as well, so an expired entry is held at
    /// most about one extra `ttl` before it is freed.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn new(ttl: Duration, api: A) -> Self {
        let cache = TtlCache::new(ttl);
        cache.start_sweep(ttl);
        info!("Caching recommender started with ttl {:?}", ttl);

        Self { api, cache }
    }

    /// Returns the recommendation for `descriptor`.
    ///
    /// A cached answer is returned without contacting the API. Otherwise the
    /// API is called; its errors are propagated with context and nothing is
    /// cached, and an empty answer is passed through uncached.
    pub async fn get(
        &self,
        descriptor: &A::Descriptor,
    ) -> Result<Option<Arc<A::Recommendation>>> {
        let digest = match WorkloadDigest::of(descriptor) {
            Ok(digest) => Some(digest),
            Err(err) => {
                warn!("Bypassing recommendation cache: {}", err);
                None
            }
        };

        if let Some(digest) = &digest {
            if let Some(cached) = self.cache.get(digest).await {
                debug!("Recommendation cache hit for {}", digest);
                return Ok(Some(cached));
            }
            debug!("Recommendation cache miss for {}", digest);
        }

        let response = self
            .api
            .get_recommendation(descriptor)
            .await
            .map_err(|err| {
                warn!("Fetching recommendation failed: {:#}", err);
                RecommenderError::Fetch(err)
            })?;

        let Some(recommendation) = response else {
            debug!("Recommender API returned no recommendation, not caching");
            return Ok(None);
        };

        let recommendation = Arc::new(recommendation);
        if let Some(digest) = digest {
            self.cache.set(digest, Arc::clone(&recommendation)).await;
        }
        Ok(Some(recommendation))
    }

    /// Stops the background sweep. Idempotent.
    ///
    /// Lookups keep working afterwards; expired entries are simply no longer
    /// freed until the recommender is dropped.
    pub fn close(&self) {
        if self.cache.is_sweeping() {
            info!("Stopping caching recommender sweep");
        }
        self.cache.stop_sweep();
    }

    /// The configured time-to-live of cached recommendations.
    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Returns true while the background sweep is running.
    pub fn is_sweeping(&self) -> bool {
        self.cache.is_sweeping()
    }

    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStatsSnapshot {
        self.cache.stats().await
    }

    /// Returns the wrapped API.
    pub fn api(&self) -> &A {
        &self.api
    }
}

impl<A: RecommenderApi> Drop for CachingRecommender<A> {
    fn drop(&mut self) {
        self.cache.stop_sweep();
    }
}
