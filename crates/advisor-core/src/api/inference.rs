//! Generative model client
//!
//! Calls a hosted text-generation endpoint with `{ "inputs": prompt }` and
//! consumes the first generated continuation.

use crate::error::{AdvisorError, Result};
use crate::provider::TextGenerator;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

/// Hosted generative model client
#[derive(Debug, Clone)]
pub struct InferenceClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl InferenceClient {
    /// Create a new inference client
    pub fn new(
        url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.into(),
            api_key,
        })
    }

    /// Generate a completion for the prompt
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&InferenceRequest { inputs: prompt });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AdvisorError::RateLimited {
                provider: "inference endpoint".to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Model(format!(
                "inference endpoint returned HTTP {status}: {body}"
            )));
        }

        let generations: Vec<Generation> = response.json().await?;

        generations
            .into_iter()
            .next()
            .map(|g| g.generated_text.trim().to_string())
            .ok_or_else(|| AdvisorError::Model("model returned no generations".to_string()))
    }
}

#[async_trait]
impl TextGenerator for InferenceClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_text(prompt).await
    }
}
