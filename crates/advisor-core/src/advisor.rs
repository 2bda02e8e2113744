//! End-to-end advisory orchestration
//!
//! The only component that knows the call order and the partial-failure
//! policy: the price fetch is the single fatal step, every other step
//! degrades to its documented default. Steps are awaited strictly
//! sequentially; suspension happens only at the network boundaries.

use crate::api::yahoo::Bar;
use crate::api::{
    AlphaVantageClient, Fundamentals, InferenceClient, NewsApiClient, SentimentClient,
    YahooChartClient,
};
use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, Result};
use crate::extract::{extract, Decision};
use crate::fetch::RetryPolicy;
use crate::indicators::IndicatorSet;
use crate::insights::InsightsClient;
use crate::prompts::PromptLibrary;
use crate::provider::{PriceProvider, SentimentClassifier, TextGenerator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Sentiment label substituted when the classifier is unavailable
pub const NEUTRAL_SENTIMENT: &str = "Neutral";

/// Combined payload for one advisory request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advice {
    pub symbol: String,
    pub price: f64,
    #[serde(rename = "newsText")]
    pub news_text: String,
    pub sentiment: String,
    pub decision: Decision,
}

/// Price history enriched with indicators and fundamentals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub indicators: IndicatorSet,
    pub fundamentals: Fundamentals,
}

/// The aggregation orchestrator
pub struct Advisor {
    price: Arc<dyn PriceProvider>,
    sentiment: Arc<dyn SentimentClassifier>,
    generator: Arc<dyn TextGenerator>,
    insights: InsightsClient,
    prompts: PromptLibrary,
    retry: RetryPolicy,
}

impl Advisor {
    /// Compose an advisor from explicit providers (dependency injection)
    pub fn new(
        price: Arc<dyn PriceProvider>,
        sentiment: Arc<dyn SentimentClassifier>,
        generator: Arc<dyn TextGenerator>,
        insights: InsightsClient,
        retry: RetryPolicy,
    ) -> Result<Self> {
        Ok(Self {
            price,
            sentiment,
            generator,
            insights,
            prompts: PromptLibrary::new()?,
            retry,
        })
    }

    /// Compose an advisor backed by the real provider clients
    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        config.validate()?;

        let retry = RetryPolicy::new(config.max_retries, config.rate_limit_backoff);

        let price = Arc::new(YahooChartClient::new(
            &config.yahoo_base_url,
            config.request_timeout,
        )?);
        let news = Arc::new(NewsApiClient::new(
            config.news_api_key.clone().unwrap_or_default(),
            &config.news_base_url,
            config.news_rate_limit,
            config.request_timeout,
        )?);
        let fundamentals = Arc::new(AlphaVantageClient::new(
            config.alpha_vantage_api_key.clone().unwrap_or_default(),
            &config.alpha_vantage_base_url,
            config.alpha_vantage_rate_limit,
            config.request_timeout,
        )?);
        let sentiment = Arc::new(SentimentClient::new(
            &config.sentiment_url,
            config.request_timeout,
        )?);
        let generator = Arc::new(InferenceClient::new(
            &config.inference_url,
            config.hf_api_key.clone(),
            config.request_timeout,
        )?);

        let insights =
            InsightsClient::new(news, fundamentals, retry.clone(), config.cache_ttl_news);

        Self::new(price, sentiment, generator, insights, retry)
    }

    /// Build a recommendation for one symbol.
    ///
    /// Sequence: price (fatal on failure) → news (best-effort) → sentiment
    /// (neutral on failure) → prompt → model (degrades to `Unknown`) →
    /// extraction.
    pub async fn advise(&self, symbol: &str, question: Option<&str>) -> Result<Advice> {
        let symbol = symbol.trim().to_uppercase();
        info!("Building advice for {symbol}");

        // Price is the only hard-required input.
        let price_provider = Arc::clone(&self.price);
        let price = self
            .retry
            .execute("latest price", || {
                let provider = Arc::clone(&price_provider);
                let symbol = symbol.clone();
                async move { provider.latest_close(&symbol).await }
            })
            .await?;

        let news_text = self.insights.news_summary(&symbol).await;

        let sentiment = match self.sentiment.classify(&news_text).await {
            Ok(label) => label,
            Err(e) => {
                warn!("Falling back to neutral sentiment for {symbol}: {e}");
                NEUTRAL_SENTIMENT.to_string()
            }
        };

        let prompt = self
            .prompts
            .analyst(&symbol, price, &sentiment, &news_text, question)?;

        let generated = match self.generator.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Model call failed for {symbol}, degrading to defaults: {e}");
                String::new()
            }
        };

        let decision = extract(&generated);
        debug!("Decision for {symbol}: {:?}", decision.action);

        Ok(Advice {
            symbol,
            price,
            news_text,
            sentiment,
            decision,
        })
    }

    /// Fetch daily history and enrich it with indicators and fundamentals
    pub async fn snapshot(&self, symbol: &str, days: i64) -> Result<MarketSnapshot> {
        let symbol = symbol.trim().to_uppercase();
        info!("Building market snapshot for {symbol} over {days} days");

        let provider = Arc::clone(&self.price);
        let bars = self
            .retry
            .execute("price history", || {
                let provider = Arc::clone(&provider);
                let symbol = symbol.clone();
                async move { provider.daily_history(&symbol, days).await }
            })
            .await?;

        if bars.is_empty() {
            return Err(AdvisorError::DataUnavailable {
                symbol,
                reason: "no bars in requested range".to_string(),
            });
        }

        let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
        let indicators = IndicatorSet::compute(&closes);
        let fundamentals = self.insights.fundamentals(&symbol).await;

        Ok(MarketSnapshot {
            symbol,
            bars,
            indicators,
            fundamentals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Recommendation;
    use crate::insights::NO_RECENT_NEWS;
    use crate::provider::{
        MockFundamentalsSource, MockNewsSource, MockPriceProvider, MockSentimentClassifier,
        MockTextGenerator,
    };
    use chrono::NaiveDate;
    use std::time::Duration;

    struct Mocks {
        price: MockPriceProvider,
        news: MockNewsSource,
        fundamentals: MockFundamentalsSource,
        sentiment: MockSentimentClassifier,
        generator: MockTextGenerator,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                price: MockPriceProvider::new(),
                news: MockNewsSource::new(),
                fundamentals: MockFundamentalsSource::new(),
                sentiment: MockSentimentClassifier::new(),
                generator: MockTextGenerator::new(),
            }
        }

        fn into_advisor(self) -> Advisor {
            let insights = InsightsClient::new(
                Arc::new(self.news),
                Arc::new(self.fundamentals),
                RetryPolicy::fast(),
                Duration::from_secs(60),
            );
            Advisor::new(
                Arc::new(self.price),
                Arc::new(self.sentiment),
                Arc::new(self.generator),
                insights,
                RetryPolicy::fast(),
            )
            .unwrap()
        }
    }

    fn sample_bars(count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64);
                let close = 100.0 + i as f64;
                Bar {
                    date,
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000_000,
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn test_advise_happy_path() {
        let mut mocks = Mocks::new();
        mocks
            .price
            .expect_latest_close()
            .times(1)
            .returning(|_| Ok(189.95));
        mocks
            .news
            .expect_top_headlines()
            .times(1)
            .returning(|_, _| Ok(vec!["Apple unveils new chip".to_string()]));
        mocks
            .sentiment
            .expect_classify()
            .times(1)
            .returning(|_| Ok("Positive".to_string()));
        mocks.generator.expect_generate().times(1).returning(|_| {
            Ok("**Recommendation:** Buy\n\n**Explanation:** Strong fundamentals.".to_string())
        });

        let advisor = mocks.into_advisor();
        let advice = advisor.advise("aapl", None).await.unwrap();

        assert_eq!(advice.symbol, "AAPL");
        assert_eq!(advice.price, 189.95);
        assert_eq!(advice.news_text, "- Apple unveils new chip");
        assert_eq!(advice.sentiment, "Positive");
        assert_eq!(advice.decision.action, Recommendation::Buy);
        assert_eq!(advice.decision.explanation, "Strong fundamentals.");
    }

    #[tokio::test]
    async fn test_advise_news_failure_degrades_to_sentinel() {
        let mut mocks = Mocks::new();
        mocks
            .price
            .expect_latest_close()
            .returning(|_| Ok(189.95));
        mocks
            .news
            .expect_top_headlines()
            .returning(|_, _| Err(AdvisorError::Api("HTTP 500".to_string())));
        mocks
            .sentiment
            .expect_classify()
            .withf(|text| text == NO_RECENT_NEWS)
            .returning(|_| Ok("Neutral".to_string()));
        mocks
            .generator
            .expect_generate()
            .returning(|_| Ok("Recommendation: Hold\nExplanation: Nothing new.".to_string()));

        let advisor = mocks.into_advisor();
        let advice = advisor.advise("AAPL", None).await.unwrap();

        // The request still succeeds with the sentinel news block.
        assert_eq!(advice.news_text, NO_RECENT_NEWS);
        assert_eq!(advice.decision.action, Recommendation::Hold);
    }

    #[tokio::test]
    async fn test_advise_price_failure_is_fatal() {
        let mut mocks = Mocks::new();
        mocks
            .price
            .expect_latest_close()
            .times(1)
            .returning(|_| Err(AdvisorError::NotFound("BADSYM".to_string())));
        // No other provider may be touched once the price step fails.

        let advisor = mocks.into_advisor();
        let err = advisor.advise("BADSYM", None).await.unwrap_err();
        assert!(matches!(err, AdvisorError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_advise_sentiment_failure_defaults_to_neutral() {
        let mut mocks = Mocks::new();
        mocks
            .price
            .expect_latest_close()
            .returning(|_| Ok(42.0));
        mocks
            .news
            .expect_top_headlines()
            .returning(|_, _| Ok(vec!["Quiet quarter".to_string()]));
        mocks
            .sentiment
            .expect_classify()
            .returning(|_| Err(AdvisorError::Api("HTTP 502".to_string())));
        mocks
            .generator
            .expect_generate()
            .withf(|prompt| prompt.contains("**Market Sentiment:** Neutral"))
            .returning(|_| Ok("Recommendation: Hold\nExplanation: Flat.".to_string()));

        let advisor = mocks.into_advisor();
        let advice = advisor.advise("MSFT", None).await.unwrap();
        assert_eq!(advice.sentiment, NEUTRAL_SENTIMENT);
    }

    #[tokio::test]
    async fn test_advise_model_failure_degrades_to_unknown() {
        let mut mocks = Mocks::new();
        mocks
            .price
            .expect_latest_close()
            .returning(|_| Ok(42.0));
        mocks
            .news
            .expect_top_headlines()
            .returning(|_, _| Ok(vec!["Quiet quarter".to_string()]));
        mocks
            .sentiment
            .expect_classify()
            .returning(|_| Ok("Neutral".to_string()));
        mocks
            .generator
            .expect_generate()
            .returning(|_| Err(AdvisorError::Model("model offline".to_string())));

        let advisor = mocks.into_advisor();
        let advice = advisor.advise("MSFT", None).await.unwrap();

        assert_eq!(advice.decision.action, Recommendation::Unknown);
        assert_eq!(advice.decision.explanation, "No explanation provided");
    }

    #[tokio::test]
    async fn test_advise_passes_question_into_prompt() {
        let mut mocks = Mocks::new();
        mocks
            .price
            .expect_latest_close()
            .returning(|_| Ok(42.0));
        mocks
            .news
            .expect_top_headlines()
            .returning(|_, _| Ok(vec!["Quiet quarter".to_string()]));
        mocks
            .sentiment
            .expect_classify()
            .returning(|_| Ok("Neutral".to_string()));
        mocks
            .generator
            .expect_generate()
            .withf(|prompt| prompt.contains("Is now a good entry point?"))
            .returning(|_| Ok("Recommendation: Buy\nExplanation: Yes.".to_string()));

        let advisor = mocks.into_advisor();
        let advice = advisor
            .advise("MSFT", Some("Is now a good entry point?"))
            .await
            .unwrap();
        assert_eq!(advice.decision.action, Recommendation::Buy);
    }

    #[tokio::test]
    async fn test_snapshot_aligns_indicators_with_bars() {
        let mut mocks = Mocks::new();
        mocks
            .price
            .expect_daily_history()
            .times(1)
            .returning(|_, _| Ok(sample_bars(30)));
        mocks
            .fundamentals
            .expect_overview()
            .returning(|_| Ok(Fundamentals::neutral()));

        let advisor = mocks.into_advisor();
        let snapshot = advisor.snapshot("tsla", 30).await.unwrap();

        assert_eq!(snapshot.symbol, "TSLA");
        assert_eq!(snapshot.bars.len(), 30);
        assert_eq!(snapshot.indicators.len(), 30);
        assert!(snapshot.indicators.sma[..14].iter().all(Option::is_none));
    }

    #[tokio::test]
    async fn test_snapshot_empty_history_is_data_unavailable() {
        let mut mocks = Mocks::new();
        mocks
            .price
            .expect_daily_history()
            .returning(|_, _| Ok(Vec::new()));

        let advisor = mocks.into_advisor();
        let err = advisor.snapshot("TSLA", 30).await.unwrap_err();
        assert!(matches!(err, AdvisorError::DataUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_snapshot_fundamentals_failure_degrades_to_neutral() {
        let mut mocks = Mocks::new();
        mocks
            .price
            .expect_daily_history()
            .returning(|_, _| Ok(sample_bars(20)));
        mocks
            .fundamentals
            .expect_overview()
            .returning(|_| Err(AdvisorError::Api("HTTP 503".to_string())));

        let advisor = mocks.into_advisor();
        let snapshot = advisor.snapshot("TSLA", 20).await.unwrap();
        assert_eq!(snapshot.fundamentals, Fundamentals::neutral());
    }
}
