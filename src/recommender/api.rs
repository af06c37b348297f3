use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

/// The external service that computes recommendations.
///
/// `Ok(None)` is a legitimate answer meaning "no recommendation for this
/// workload". Errors are the collaborator's own; timeouts and retries, if any,
/// belong to the implementation.
#[async_trait]
pub trait RecommenderApi: Send + Sync {
    /// Structured description of the workload to recommend for
    type Descriptor: Serialize + Send + Sync;
    /// Result handed back to callers
    type Recommendation: Send + Sync + 'static;

    async fn get_recommendation(
        &self,
        descriptor: &Self::Descriptor,
    ) -> anyhow::Result<Option<Self::Recommendation>>;
}

#[async_trait]
impl<T> RecommenderApi for Arc<T>
where
    T: RecommenderApi + ?Sized,
{
    type Descriptor = T::Descriptor;
    type Recommendation = T::Recommendation;

    async fn get_recommendation(
        &self,
        descriptor: &Self::Descriptor,
    ) -> anyhow::Result<Option<Self::Recommendation>> {
        (**self).get_recommendation(descriptor).await
    }
}
