//! Configuration for the advisory pipeline

use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co/query";
const DEFAULT_NEWS_BASE_URL: &str = "https://newsapi.org/v2";
const DEFAULT_SENTIMENT_URL: &str = "https://hariharan220-finbert-sentiment.hf.space/predict";
const DEFAULT_INFERENCE_URL: &str =
    "https://api-inference.huggingface.co/models/google/gemma-2b-it";
const DEFAULT_PREDICTOR_URL: &str = "https://hariharan220-stock-predictor.hf.space/predict";

/// Configuration for the advisory pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Maximum number of attempts for retried provider calls
    pub max_retries: u32,

    /// Fixed backoff applied when a provider signals rate limiting
    pub rate_limit_backoff: Duration,

    /// Request timeout applied to every outbound HTTP call
    pub request_timeout: Duration,

    /// Cache TTL for news-derived summaries
    pub cache_ttl_news: Duration,

    /// Alpha Vantage API key (fundamentals degrade to neutral without it)
    pub alpha_vantage_api_key: Option<String>,

    /// NewsAPI key (news degrades to the sentinel without it)
    pub news_api_key: Option<String>,

    /// Hugging Face API key for the sentiment/model/predictor endpoints
    pub hf_api_key: Option<String>,

    /// Requests per minute allowed against Alpha Vantage (free tier: 5)
    pub alpha_vantage_rate_limit: u32,

    /// Requests per minute allowed against NewsAPI
    pub news_rate_limit: u32,

    /// Base URL for the Yahoo Finance chart endpoint
    pub yahoo_base_url: String,

    /// Base URL for the Alpha Vantage query endpoint
    pub alpha_vantage_base_url: String,

    /// Base URL for the NewsAPI endpoints
    pub news_base_url: String,

    /// Endpoint of the sentiment classifier service
    pub sentiment_url: String,

    /// Endpoint of the generative model
    pub inference_url: String,

    /// Endpoint of the price-prediction service
    pub predictor_url: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            rate_limit_backoff: Duration::from_secs(2),
            request_timeout: Duration::from_secs(30),
            cache_ttl_news: Duration::from_secs(600), // 10 minutes
            alpha_vantage_api_key: None,
            news_api_key: None,
            hf_api_key: None,
            alpha_vantage_rate_limit: 5,
            news_rate_limit: 60,
            yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            alpha_vantage_base_url: DEFAULT_ALPHA_VANTAGE_BASE_URL.to_string(),
            news_base_url: DEFAULT_NEWS_BASE_URL.to_string(),
            sentiment_url: DEFAULT_SENTIMENT_URL.to_string(),
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            predictor_url: DEFAULT_PREDICTOR_URL.to_string(),
        }
    }
}

impl AdvisorConfig {
    /// Create a new configuration builder
    pub fn builder() -> AdvisorConfigBuilder {
        AdvisorConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(AdvisorError::Config(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.cache_ttl_news.is_zero() {
            return Err(AdvisorError::Config(
                "cache_ttl_news must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for AdvisorConfig
#[derive(Debug, Default)]
pub struct AdvisorConfigBuilder {
    max_retries: Option<u32>,
    rate_limit_backoff: Option<Duration>,
    request_timeout: Option<Duration>,
    cache_ttl_news: Option<Duration>,
    alpha_vantage_api_key: Option<String>,
    news_api_key: Option<String>,
    hf_api_key: Option<String>,
    alpha_vantage_rate_limit: Option<u32>,
    news_rate_limit: Option<u32>,
    yahoo_base_url: Option<String>,
    alpha_vantage_base_url: Option<String>,
    news_base_url: Option<String>,
    sentiment_url: Option<String>,
    inference_url: Option<String>,
    predictor_url: Option<String>,
}

impl AdvisorConfigBuilder {
    /// Set maximum retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set the fixed rate-limit backoff duration
    pub fn rate_limit_backoff(mut self, duration: Duration) -> Self {
        self.rate_limit_backoff = Some(duration);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set cache TTL for news summaries
    pub fn cache_ttl_news(mut self, duration: Duration) -> Self {
        self.cache_ttl_news = Some(duration);
        self
    }

    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set NewsAPI key
    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    /// Set Hugging Face API key
    pub fn hf_api_key(mut self, key: impl Into<String>) -> Self {
        self.hf_api_key = Some(key.into());
        self
    }

    /// Set the Alpha Vantage requests-per-minute quota
    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    /// Set the NewsAPI requests-per-minute quota
    pub fn news_rate_limit(mut self, per_minute: u32) -> Self {
        self.news_rate_limit = Some(per_minute);
        self
    }

    /// Set the Yahoo Finance base URL
    pub fn yahoo_base_url(mut self, url: impl Into<String>) -> Self {
        self.yahoo_base_url = Some(url.into());
        self
    }

    /// Set the Alpha Vantage base URL
    pub fn alpha_vantage_base_url(mut self, url: impl Into<String>) -> Self {
        self.alpha_vantage_base_url = Some(url.into());
        self
    }

    /// Set the NewsAPI base URL
    pub fn news_base_url(mut self, url: impl Into<String>) -> Self {
        self.news_base_url = Some(url.into());
        self
    }

    /// Set the sentiment classifier endpoint
    pub fn sentiment_url(mut self, url: impl Into<String>) -> Self {
        self.sentiment_url = Some(url.into());
        self
    }

    /// Set the generative model endpoint
    pub fn inference_url(mut self, url: impl Into<String>) -> Self {
        self.inference_url = Some(url.into());
        self
    }

    /// Set the price-prediction endpoint
    pub fn predictor_url(mut self, url: impl Into<String>) -> Self {
        self.predictor_url = Some(url.into());
        self
    }

    /// Load provider API keys from the environment
    ///
    /// Reads `ALPHA_VANTAGE_API_KEY`, `NEWS_API_KEY` and `HF_API_KEY`;
    /// absent variables leave the corresponding key unset.
    pub fn with_env_keys(mut self) -> Self {
        if let Ok(key) = std::env::var("ALPHA_VANTAGE_API_KEY") {
            self.alpha_vantage_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("NEWS_API_KEY") {
            self.news_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("HF_API_KEY") {
            self.hf_api_key = Some(key);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AdvisorConfig> {
        let defaults = AdvisorConfig::default();

        let config = AdvisorConfig {
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            rate_limit_backoff: self.rate_limit_backoff.unwrap_or(defaults.rate_limit_backoff),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            cache_ttl_news: self.cache_ttl_news.unwrap_or(defaults.cache_ttl_news),
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            news_api_key: self.news_api_key,
            hf_api_key: self.hf_api_key,
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
            news_rate_limit: self.news_rate_limit.unwrap_or(defaults.news_rate_limit),
            yahoo_base_url: self.yahoo_base_url.unwrap_or(defaults.yahoo_base_url),
            alpha_vantage_base_url: self
                .alpha_vantage_base_url
                .unwrap_or(defaults.alpha_vantage_base_url),
            news_base_url: self.news_base_url.unwrap_or(defaults.news_base_url),
            sentiment_url: self.sentiment_url.unwrap_or(defaults.sentiment_url),
            inference_url: self.inference_url.unwrap_or(defaults.inference_url),
            predictor_url: self.predictor_url.unwrap_or(defaults.predictor_url),
        };

        config.validate()?;
        Ok(config)
    }
}
