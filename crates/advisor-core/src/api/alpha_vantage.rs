//! Alpha Vantage fundamentals client

use crate::error::{AdvisorError, Result};
use crate::provider::FundamentalsSource;
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const PROVIDER: &str = "Alpha Vantage";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Scalar fundamentals snapshot for a symbol
///
/// Each field defaults to a neutral 0.0 when the source field is absent or
/// unparsable; a partial payload never propagates a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    #[serde(rename = "PE_Ratio")]
    pub pe_ratio: f64,
    #[serde(rename = "ROE")]
    pub roe: f64,
    #[serde(rename = "EPS")]
    pub eps: f64,
    #[serde(rename = "Debt_to_Equity")]
    pub debt_to_equity: f64,
}

impl Fundamentals {
    /// The all-zero neutral record used when fundamentals are unavailable
    pub fn neutral() -> Self {
        Self {
            pe_ratio: 0.0,
            roe: 0.0,
            eps: 0.0,
            debt_to_equity: 0.0,
        }
    }
}

impl Default for Fundamentals {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client with API key and rate limit
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (default: 5 for free tier)
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        rate_limit: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let quota =
            Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::new(5).unwrap()));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            rate_limiter,
        })
    }

    /// Get the company overview and extract the fundamentals snapshot
    pub async fn get_overview(&self, symbol: &str) -> Result<Fundamentals> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "OVERVIEW"),
                ("symbol", symbol),
                ("apikey", &self.api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AdvisorError::RateLimited {
                provider: PROVIDER.to_string(),
            });
        }
        if !status.is_success() {
            return Err(AdvisorError::Api(format!(
                "{PROVIDER} returned HTTP {status} for {symbol}"
            )));
        }

        let data: serde_json::Value = response.json().await?;

        // Check for API error messages
        if let Some(error) = data.get("Error Message") {
            return Err(AdvisorError::Api(format!("{PROVIDER} error: {error}")));
        }

        // The free tier signals throttling with a "Note" payload
        if data.get("Note").is_some() {
            return Err(AdvisorError::RateLimited {
                provider: PROVIDER.to_string(),
            });
        }

        if data.as_object().is_none_or(serde_json::Map::is_empty) {
            return Err(AdvisorError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "empty overview payload".to_string(),
            });
        }

        Ok(fundamentals_from_overview(&data))
    }
}

/// Extract the fundamentals snapshot from an OVERVIEW payload.
///
/// Fields are parsed independently; anything absent or non-numeric becomes
/// 0.0 so one bad field never poisons the rest.
fn fundamentals_from_overview(data: &serde_json::Value) -> Fundamentals {
    Fundamentals {
        pe_ratio: scalar_field(data, "PERatio"),
        roe: scalar_field(data, "ReturnOnEquityTTM"),
        eps: scalar_field(data, "EPS"),
        debt_to_equity: scalar_field(data, "DebtToEquity"),
    }
}

fn scalar_field(data: &serde_json::Value, key: &str) -> f64 {
    data.get(key)
        .and_then(serde_json::Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0)
}

#[async_trait]
impl FundamentalsSource for AlphaVantageClient {
    async fn overview(&self, symbol: &str) -> Result<Fundamentals> {
        self.get_overview(symbol).await
    }
}
