//! Price-prediction service client
//!
//! Proxies a feature-window matrix to the hosted prediction model. The model
//! expects exactly 150 rows of 10 features; a malformed window is rejected
//! locally before any network traffic.

use crate::error::{AdvisorError, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Required number of rows in a prediction window
pub const PREDICTOR_WINDOW: usize = 150;

/// Required number of features per row
pub const PREDICTOR_FEATURES: usize = 10;

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    stock_symbol: &'a str,
    prices: &'a [Vec<f64>],
}

/// Hosted price-prediction model client
#[derive(Debug, Clone)]
pub struct PredictorClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl PredictorClient {
    /// Create a new predictor client
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

    /// Request a prediction for a feature window
    ///
    /// The remote payload is passed through untouched; interpreting it is
    /// the caller's concern.
    pub async fn predict(&self, symbol: &str, window: &[Vec<f64>]) -> Result<serde_json::Value> {
        validate_window(window)?;

        let mut request = self.client.post(&self.url).json(&PredictRequest {
            stock_symbol: symbol,
            prices: window,
        });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::Api(format!(
                "prediction service returned HTTP {status} for {symbol}"
            )));
        }

        Ok(response.json().await?)
    }
}

fn validate_window(window: &[Vec<f64>]) -> Result<()> {
    if window.len() != PREDICTOR_WINDOW {
        return Err(AdvisorError::InvalidInput(format!(
            "expected {PREDICTOR_WINDOW} rows, got {}",
            window.len()
        )));
    }

    if let Some(row) = window.iter().find(|row| row.len() != PREDICTOR_FEATURES) {
        return Err(AdvisorError::InvalidInput(format!(
            "expected {PREDICTOR_FEATURES} features per row, got {}",
            row.len()
        )));
    }

    Ok(())
}
