//! NewsAPI client for recent market headlines

use crate::error::{AdvisorError, Result};
use crate::provider::NewsSource;
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const PROVIDER: &str = "NewsAPI";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
}

/// NewsAPI client with rate limiting
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl NewsApiClient {
    /// Create a new NewsAPI client
    ///
    /// # Arguments
    /// * `api_key` - NewsAPI key
    /// * `rate_limit` - Requests per minute
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        rate_limit: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let quota =
            Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::new(60).unwrap()));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            rate_limiter,
        })
    }

    /// Fetch the newest article titles matching a query term
    pub async fn fetch_headlines(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/everything", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("apiKey", &self.api_key)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AdvisorError::RateLimited {
                provider: PROVIDER.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Api(format!(
                "{PROVIDER} error {status}: {body}"
            )));
        }

        let payload: EverythingResponse = response.json().await?;

        Ok(payload
            .articles
            .into_iter()
            .filter_map(|article| article.title)
            .take(limit)
            .collect())
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn top_headlines(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        self.fetch_headlines(query, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = NewsApiClient::new(
            "test_key",
            "https://newsapi.org/v2",
            60,
            Duration::from_secs(30),
        )
        .unwrap();
        assert_eq!(client.api_key, "test_key");
    }

    #[test]
    fn test_untitled_articles_are_dropped() {
        let payload: EverythingResponse = serde_json::from_str(
            r#"{
                "status": "ok",
                "articles": [
                    { "title": "Apple unveils new chip" },
                    { "title": null },
                    { "title": "iPhone sales beat estimates" },
                    { "title": "Supplier guidance cut" },
                    { "title": "A fourth headline" }
                ]
            }"#,
        )
        .unwrap();

        let titles: Vec<String> = payload
            .articles
            .into_iter()
            .filter_map(|article| article.title)
            .take(3)
            .collect();

        assert_eq!(titles.len(), 3);
        assert_eq!(titles[0], "Apple unveils new chip");
        assert_eq!(titles[1], "iPhone sales beat estimates");
    }
}
