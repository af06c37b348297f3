//! Upstream Module
//!
//! HTTP client for the external recommendation service.

use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::recommender::RecommenderApi;

/// [`RecommenderApi`] backed by a JSON-over-HTTP endpoint.
///
/// The descriptor is POSTed as the request body. A `200` with a JSON body is
/// a recommendation; `204`, `404` or a `null` body mean "no recommendation".
/// Any other status is an error.
#[derive(Debug, Clone)]
pub struct HttpRecommenderApi {
    client: Client,
    url: String,
}

impl HttpRecommenderApi {
    /// Creates a client for `url` with a per-request `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build recommender API client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Creates a client from the `RECOMMENDER_API_*` settings.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            config.recommender_api_url.clone(),
            config.recommender_api_timeout(),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RecommenderApi for HttpRecommenderApi {
    type Descriptor = Value;
    type Recommendation = Value;

    async fn get_recommendation(&self, descriptor: &Value) -> anyhow::Result<Option<Value>> {
        let response = self
            .client
            .post(&self.url)
            .json(descriptor)
            .send()
            .await
            .with_context(|| format!("POST {} failed", self.url))?;

        let status = response.status();
        debug!("Recommender API answered {}", status);

        match status {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => {
                bail!("recommender API at {} answered {}", self.url, status)
            }
            _ => {}
        }

        let body: Value = response
            .json()
            .await
            .context("failed to decode recommendation body")?;

        Ok((!body.is_null()).then_some(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};
    use serde_json::json;

    /// Serves `router` on an ephemeral local port and returns its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn stub_upstream() -> String {
        let router = Router::new()
            .route(
                "/echo",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({ "target": body["name"], "cpu": "250m" }))
                }),
            )
            .route("/empty", post(|| async { AxumStatus::NO_CONTENT }))
            .route("/null", post(|| async { Json(Value::Null) }))
            .route("/broken", post(|| async { AxumStatus::INTERNAL_SERVER_ERROR }));
        serve(router).await
    }

    fn client(base: &str, path: &str) -> HttpRecommenderApi {
        HttpRecommenderApi::new(format!("{base}{path}"), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_recommendation_returned() {
        let base = stub_upstream().await;
        let api = client(&base, "/echo");

        let got = api
            .get_recommendation(&json!({ "name": "web" }))
            .await
            .unwrap();
        assert_eq!(got, Some(json!({ "target": "web", "cpu": "250m" })));
    }

    #[tokio::test]
    async fn test_empty_answers() {
        let base = stub_upstream().await;
        let descriptor = json!({ "name": "web" });

        for path in ["/empty", "/null", "/missing"] {
            let got = client(&base, path).get_recommendation(&descriptor).await;
            assert!(got.unwrap().is_none(), "{path} should be an empty answer");
        }
    }

    #[tokio::test]
    async fn test_server_error_is_error() {
        let base = stub_upstream().await;
        let err = client(&base, "/broken")
            .get_recommendation(&json!({}))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_unreachable_is_error() {
        let api = HttpRecommenderApi::new("http://127.0.0.1:1/", Duration::from_secs(1)).unwrap();

        let err = api.get_recommendation(&json!({})).await.unwrap_err();
        assert!(err.to_string().starts_with("POST http://127.0.0.1:1/ failed"));
    }

    #[test]
    fn test_from_config() {
        let api = HttpRecommenderApi::from_config(&Config::default()).unwrap();
        assert_eq!(api.url(), "http://127.0.0.1:8080/recommendation");
    }
}
