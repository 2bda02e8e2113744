//! Stock advisory pipeline
//!
//! This crate ingests daily price series for a stock symbol, derives a
//! standard set of technical indicators, gathers supplementary
//! fundamentals/news/sentiment from third-party sources, and synthesizes a
//! structured Buy/Sell/Hold recommendation from model-generated prose. It
//! includes:
//!
//! - Pure indicator computation (SMA, EMA, RSI, MACD)
//! - Resilient data aggregation with bounded retry/backoff and TTL caching
//! - Fail-open fundamentals and news summaries
//! - A two-tier recommendation extractor over free-form generated text
//! - An orchestrator sequencing the end-to-end advisory flow
//!
//! # Architecture
//!
//! The orchestrator (`Advisor`) is the only component that knows the call
//! order and the partial-failure policy: the price fetch is the single fatal
//! step, every other dependency degrades to a documented neutral default.
//! Remote dependencies sit behind provider traits so the pipeline can be
//! composed from the real API clients or from mocks.
//!
//! # Example
//!
//! ```rust,ignore
//! use advisor_core::{Advisor, AdvisorConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AdvisorConfig::builder().with_env_keys().build()?;
//!     let advisor = Advisor::from_config(&config)?;
//!
//!     let advice = advisor.advise("AAPL", None).await?;
//!     println!("{}", advice.decision);
//!
//!     Ok(())
//! }
//! ```

pub mod advisor;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod indicators;
pub mod insights;
pub mod prompts;
pub mod provider;

// Re-export main types for convenience
pub use advisor::{Advice, Advisor, MarketSnapshot, NEUTRAL_SENTIMENT};
pub use api::{Bar, Fundamentals};
pub use config::AdvisorConfig;
pub use error::{AdvisorError, Result};
pub use extract::{extract, Decision, Recommendation};
pub use fetch::RetryPolicy;
pub use indicators::IndicatorSet;
pub use insights::{InsightsClient, NO_RECENT_NEWS};
