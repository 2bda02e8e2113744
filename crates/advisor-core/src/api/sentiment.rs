//! Sentiment classifier client
//!
//! The upstream service expects the text as a URL query parameter with an
//! empty POST body; that transport quirk is part of its contract.

use crate::error::{AdvisorError, Result};
use crate::provider::SentimentClassifier;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SentimentResponse {
    sentiment: String,
}

/// Remote sentiment classifier client
#[derive(Debug, Clone)]
pub struct SentimentClient {
    client: Client,
    url: String,
}

impl SentimentClient {
    /// Create a new sentiment client
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Classify a block of text, returning the sentiment label
    pub async fn classify_text(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .query(&[("text", text)])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::Api(format!(
                "sentiment classifier returned HTTP {status}"
            )));
        }

        let payload: SentimentResponse = response.json().await?;
        Ok(payload.sentiment)
    }
}

#[async_trait]
impl SentimentClassifier for SentimentClient {
    async fn classify(&self, text: &str) -> Result<String> {
        self.classify_text(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let payload: SentimentResponse =
            serde_json::from_str(r#"{ "sentiment": "Positive", "confidence": 0.93 }"#).unwrap();
        assert_eq!(payload.sentiment, "Positive");
    }
}
