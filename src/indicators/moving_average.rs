// =============================================================================
// Moving Averages
// =============================================================================
//
// Two families live here:
//
// * Window means — the arithmetic mean of a sliding window.  `trailing_mean`
//   gives the latest one, `sliding_mean` the full "valid" convolution series
//   (one value per complete window).  The trend and MACD legs default to this.
//
// * Recursive EMA —
//     multiplier = 2 / (period + 1)
//     EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//   seeded with the SMA of the first `period` closes.  Selected with
//   `MovingAverageKind::Exponential`.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::market_data::require_len;

/// Which averaging the trend and MACD legs use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovingAverageKind {
    /// Simple sliding-window mean.
    #[default]
    WindowMean,
    /// Recursive exponential average.
    Exponential,
}

impl MovingAverageKind {
    /// Full series for `window`, one value per close from index `window - 1`.
    pub fn series(self, closes: &[f64], window: usize, indicator: &'static str) -> Result<Vec<f64>> {
        if window == 0 {
            return Err(AnalysisError::InvalidPeriod { indicator });
        }
        require_len(indicator, window, closes.len())?;
        Ok(match self {
            Self::WindowMean => sliding_mean(closes, window),
            Self::Exponential => calculate_ema(closes, window),
        })
    }

    /// Latest value for `window`.
    pub fn latest(self, closes: &[f64], window: usize, indicator: &'static str) -> Result<f64> {
        let series = self.series(closes, window, indicator)?;
        Ok(series[series.len() - 1])
    }
}

/// Arithmetic mean of the last `window` values.
///
/// Returns `None` when `window` is zero or exceeds the input length.
pub fn trailing_mean(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    let tail = &values[values.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}

/// Mean of every complete window of `window` values ("valid" convolution with
/// a flat kernel).  Output length is `values.len() - window + 1`.
pub fn sliding_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    let w = window as f64;
    values
        .windows(window)
        .map(|chunk| chunk.iter().sum::<f64>() / w)
        .collect()
}

/// Compute the EMA series for the given `closes` slice and look-back `period`.
///
/// Returns an empty `Vec` when the input is too short or the period is zero.
/// Each output element corresponds to a close starting at index `period - 1`.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period + 1) as f64;

    // Seed: SMA of the first `period` values.
    let sma: f64 = closes[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(closes.len() - period + 1);
    result.push(sma);

    let mut prev_ema = sma;
    for &close in &closes[period..] {
        let ema = close * multiplier + prev_ema * (1.0 - multiplier);
        result.push(ema);
        prev_ema = ema;
    }

    result
}
