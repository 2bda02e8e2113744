//! Provider seams consumed by the orchestrator
//!
//! Each remote dependency is a trait object so the pipeline can be composed
//! from the concrete api clients in production and from mocks in tests.

use crate::api::yahoo::Bar;
use crate::api::Fundamentals;
use crate::error::Result;
use async_trait::async_trait;

/// Source of daily price history and latest quotes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Most recent available closing price for a symbol
    async fn latest_close(&self, symbol: &str) -> Result<f64>;

    /// Daily bars covering the trailing `days` window
    async fn daily_history(&self, symbol: &str, days: i64) -> Result<Vec<Bar>>;
}

/// Source of recent article headlines
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Newest headlines matching a query term, newest first
    async fn top_headlines(&self, query: &str, limit: usize) -> Result<Vec<String>>;
}

/// Source of scalar fundamentals
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FundamentalsSource: Send + Sync {
    /// Fundamentals snapshot for a symbol
    async fn overview(&self, symbol: &str) -> Result<Fundamentals>;
}

/// Remote sentiment classifier
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify a text block, returning a sentiment label
    async fn classify(&self, text: &str) -> Result<String>;
}

/// Remote generative model
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the prompt
    async fn generate(&self, prompt: &str) -> Result<String>;
}
