//! Yahoo Finance chart API client
//!
//! Talks to the v8 chart endpoint directly so rate-limit (429) and
//! not-found (404) signals stay visible to the retry layer.

use crate::error::{AdvisorError, Result};
use crate::provider::PriceProvider;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// The chart endpoint rejects requests without a browser user agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const PROVIDER: &str = "Yahoo Finance";

/// One daily price bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Yahoo Finance chart API client
#[derive(Debug, Clone)]
pub struct YahooChartClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Option<Chart>,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

// Yahoo pads the quote arrays with nulls on missing bars.
#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

impl YahooChartClient {
    /// Create a new chart client
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch daily bars between two instants
    pub async fn fetch_daily(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("interval", "1d".to_string()),
                ("period1", start.timestamp().to_string()),
                ("period2", end.timestamp().to_string()),
            ])
            .send()
            .await?;

        check_status(response.status(), symbol)?;

        let payload: ChartResponse = response.json().await?;
        bars_from_chart(symbol, payload)
    }

    /// Fetch the most recent available closing price
    pub async fn fetch_latest_close(&self, symbol: &str) -> Result<f64> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let response = self.client.get(&url).send().await?;

        check_status(response.status(), symbol)?;

        let payload: ChartResponse = response.json().await?;
        let bars = bars_from_chart(symbol, payload)?;

        bars.last()
            .map(|bar| bar.close)
            .ok_or_else(|| AdvisorError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no closing price in chart response".to_string(),
            })
    }
}

fn check_status(status: StatusCode, symbol: &str) -> Result<()> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AdvisorError::RateLimited {
            provider: PROVIDER.to_string(),
        });
    }
    if status == StatusCode::NOT_FOUND {
        return Err(AdvisorError::NotFound(symbol.to_string()));
    }
    if !status.is_success() {
        return Err(AdvisorError::Api(format!(
            "{PROVIDER} returned HTTP {status} for {symbol}"
        )));
    }
    Ok(())
}

/// Assemble bars from a chart payload.
///
/// Bars without a close are skipped (gaps are tolerated, never filled);
/// missing open/high/low fall back to the close and missing volume to 0.
fn bars_from_chart(symbol: &str, payload: ChartResponse) -> Result<Vec<Bar>> {
    let unavailable = |reason: &str| AdvisorError::DataUnavailable {
        symbol: symbol.to_string(),
        reason: reason.to_string(),
    };

    let result = payload
        .chart
        .and_then(|c| c.result)
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| unavailable("no chart data in response"))?;

    let quote = result
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .ok_or_else(|| unavailable("no quote data in response"))?;

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(close) = quote.close.get(i).copied().flatten() else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };

        let field = |values: &[Option<f64>]| values.get(i).copied().flatten().unwrap_or(close);

        bars.push(Bar {
            date,
            open: field(&quote.open),
            high: field(&quote.high),
            low: field(&quote.low),
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        });
    }

    Ok(bars)
}

#[async_trait]
impl PriceProvider for YahooChartClient {
    async fn latest_close(&self, symbol: &str) -> Result<f64> {
        self.fetch_latest_close(symbol).await
    }

    async fn daily_history(&self, symbol: &str, days: i64) -> Result<Vec<Bar>> {
        let end = Utc::now();
        let start = end - chrono::Duration::days(days);
        self.fetch_daily(symbol, start, end).await
    }
}
