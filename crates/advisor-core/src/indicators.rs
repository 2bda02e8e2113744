//! Technical indicator engine
//!
//! Pure, stateless functions over a sequence of closing prices. No I/O and
//! no state beyond the inputs: callers fetch and sanitize the series, the
//! engine only computes. Non-finite inputs propagate arithmetically.
//!
//! Warm-up entries are `None`, never zero: a missing value and a zero value
//! mean different things to downstream consumers, and `None` serializes as
//! JSON `null` in the snapshot payload.

use serde::{Deserialize, Serialize};

/// Default look-back period for SMA/EMA/RSI
pub const DEFAULT_PERIOD: usize = 14;

/// Short EMA period for MACD
pub const MACD_SHORT_PERIOD: usize = 12;

/// Long EMA period for MACD
pub const MACD_LONG_PERIOD: usize = 26;

/// Smoothing period for the MACD signal line
pub const MACD_SIGNAL_PERIOD: usize = 9;

/// Simple moving average over the trailing window `[i - period, i)`.
///
/// The window ends one bar before the current index: `sma[i]` is the mean of
/// the `period` closes strictly preceding `i`, so the current bar never
/// contributes to its own average (no look-ahead). Entries with fewer than
/// `period` preceding bars are `None`.
pub fn sma(series: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; series.len()];
    }

    (0..series.len())
        .map(|i| {
            if i >= period {
                let window = &series[i - period..i];
                Some(window.iter().sum::<f64>() / period as f64)
            } else {
                None
            }
        })
        .collect()
}

/// Exponential moving average with smoothing factor `k = 2 / (period + 1)`.
///
/// Seeded with the first close (`ema[0] == series[0]`) and defined at every
/// index, so unlike [`sma`] and [`rsi`] there is no warm-up gap. Downstream
/// consumers rely on EMA as the always-available fallback; the asymmetry is
/// intentional.
pub fn ema(series: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());

    for (i, &value) in series.iter().enumerate() {
        if i == 0 {
            out.push(value);
        } else {
            out.push(value * k + out[i - 1] * (1.0 - k));
        }
    }

    out
}

/// Relative Strength Index over average gain/loss of the trailing window.
///
/// Gains and losses are per-step deltas (the delta series is one shorter
/// than the input). A window with zero average loss is capped at `RS = 100`
/// rather than following the infinite-RS identity to RSI = 100. The first
/// `period` entries are `None`; output length always equals input length.
pub fn rsi(series: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = series.len();
    let mut out = vec![None; n];
    if period == 0 || n <= period {
        return out;
    }

    let mut gains = Vec::with_capacity(n - 1);
    let mut losses = Vec::with_capacity(n - 1);
    for pair in series.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    for i in period..n {
        let avg_gain = gains[i - period..i].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[i - period..i].iter().sum::<f64>() / period as f64;

        let rs = if avg_loss == 0.0 { 100.0 } else { avg_gain / avg_loss };
        out[i] = Some(100.0 - 100.0 / (1.0 + rs));
    }

    out
}

/// MACD line and signal line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Macd {
    /// `ema(short) - ema(long)` per index
    pub line: Vec<f64>,
    /// EMA of the MACD line
    pub signal: Vec<f64>,
}

/// Moving average convergence/divergence.
///
/// `line[i] == ema(series, short)[i] - ema(series, long)[i]` exactly; the
/// signal line is the EMA of the MACD line. Both inherit EMA's no-warm-up
/// property and are defined at every index.
pub fn macd(series: &[f64], short_period: usize, long_period: usize, signal_period: usize) -> Macd {
    let short_ema = ema(series, short_period);
    let long_ema = ema(series, long_period);

    let line: Vec<f64> = short_ema
        .iter()
        .zip(long_ema.iter())
        .map(|(short, long)| short - long)
        .collect();
    let signal = ema(&line, signal_period);

    Macd { line, signal }
}

/// The standard indicator set, aligned index-for-index with the input closes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    #[serde(rename = "SMA_14")]
    pub sma: Vec<Option<f64>>,
    #[serde(rename = "EMA_14")]
    pub ema: Vec<f64>,
    #[serde(rename = "RSI_14")]
    pub rsi: Vec<Option<f64>>,
    #[serde(rename = "MACD")]
    pub macd: Vec<f64>,
    #[serde(rename = "Signal_Line")]
    pub signal: Vec<f64>,
}

impl IndicatorSet {
    /// Compute the standard set: 14-period SMA/EMA/RSI and 12/26/9 MACD.
    ///
    /// An empty input yields empty sequences for every indicator, not an
    /// error.
    pub fn compute(closes: &[f64]) -> Self {
        Self::with_period(closes, DEFAULT_PERIOD)
    }

    /// Compute the set with a custom SMA/EMA/RSI period
    pub fn with_period(closes: &[f64], period: usize) -> Self {
        let Macd { line, signal } = macd(
            closes,
            MACD_SHORT_PERIOD,
            MACD_LONG_PERIOD,
            MACD_SIGNAL_PERIOD,
        );

        Self {
            sma: sma(closes, period),
            ema: ema(closes, period),
            rsi: rsi(closes, period),
            macd: line,
            signal,
        }
    }

    /// Number of entries in each indicator sequence
    pub fn len(&self) -> usize {
        self.ema.len()
    }

    /// Check whether the set was computed from an empty series
    pub fn is_empty(&self) -> bool {
        self.ema.is_empty()
    }
}
