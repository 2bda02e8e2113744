//! Fail-open access to supplementary market data
//!
//! Fundamentals and news are context, not critical-path data: every failure
//! here degrades to a documented neutral value instead of aborting the
//! request. The degrade defaults are declared as constants in one place so
//! the policy stays auditable.

use crate::api::Fundamentals;
use crate::cache::InsightsCache;
use crate::error::AdvisorError;
use crate::fetch::RetryPolicy;
use crate::provider::{FundamentalsSource, NewsSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Sentinel news block used when no headlines are available
pub const NO_RECENT_NEWS: &str = "No recent news available.";

/// Number of headlines folded into the news summary
pub const HEADLINE_COUNT: usize = 3;

/// Retry-wrapped, cache-backed client for fundamentals and news
pub struct InsightsClient {
    news: Arc<dyn NewsSource>,
    fundamentals: Arc<dyn FundamentalsSource>,
    retry: RetryPolicy,
    news_cache: InsightsCache<String>,
}

impl InsightsClient {
    /// Create a new insights client
    pub fn new(
        news: Arc<dyn NewsSource>,
        fundamentals: Arc<dyn FundamentalsSource>,
        retry: RetryPolicy,
        news_ttl: Duration,
    ) -> Self {
        Self {
            news,
            fundamentals,
            retry,
            news_cache: InsightsCache::new(news_ttl),
        }
    }

    /// Fundamentals snapshot for a symbol; never fails to the caller.
    ///
    /// Any unrecoverable error yields the all-zero neutral record, with the
    /// cause logged.
    pub async fn fundamentals(&self, symbol: &str) -> Fundamentals {
        let source = Arc::clone(&self.fundamentals);
        let result = self
            .retry
            .execute("fundamentals", || {
                let source = Arc::clone(&source);
                let symbol = symbol.to_string();
                async move { source.overview(&symbol).await }
            })
            .await;

        match result {
            Ok(fundamentals) => fundamentals,
            Err(e) => {
                warn!("Falling back to neutral fundamentals for {symbol}: {e}");
                Fundamentals::neutral()
            }
        }
    }

    /// Recent-news summary for a symbol; never fails to the caller.
    ///
    /// The three newest headlines are joined into one text block and cached
    /// under the symbol. The sentinel is returned on failure or an empty
    /// result set but never cached, so a recovered feed repopulates on the
    /// next call.
    pub async fn news_summary(&self, symbol: &str) -> String {
        let key = symbol.to_uppercase();

        let result = self
            .news_cache
            .get_or_fetch(&key, || async {
                let news = Arc::clone(&self.news);
                let headlines = self
                    .retry
                    .execute("news", || {
                        let news = Arc::clone(&news);
                        let query = key.clone();
                        async move { news.top_headlines(&query, HEADLINE_COUNT).await }
                    })
                    .await?;

                if headlines.is_empty() {
                    return Err(AdvisorError::DataUnavailable {
                        symbol: key.clone(),
                        reason: "no articles returned".to_string(),
                    });
                }

                Ok(headlines
                    .iter()
                    .map(|headline| format!("- {headline}"))
                    .collect::<Vec<_>>()
                    .join("\n"))
            })
            .await;

        match result {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Falling back to news sentinel for {symbol}: {e}");
                NO_RECENT_NEWS.to_string()
            }
        }
    }
}
