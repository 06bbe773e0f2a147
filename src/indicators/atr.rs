// =============================================================================
// Average True Range (ATR) and volatility tier
// =============================================================================
//
// True Range for each bar after the first:
//   TR = max(high, prevClose) - min(low, prevClose)
//
// ATR is the arithmetic mean of the most recent `period` TR values.
//
// Volatility tier from ratio = ATR / price * 100:
//   ratio < 1.5  => low
//   ratio < 3.0  => medium
//   otherwise    => high
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::market_data::SeriesView;
use crate::types::VolatilityTier;

pub const DEFAULT_ATR_PERIOD: usize = 14;

/// Upper bound (exclusive) of the `low` tier, in percent of price.
pub const LOW_VOLATILITY_MAX_PCT: f64 = 1.5;
/// Upper bound (exclusive) of the `medium` tier, in percent of price.
pub const MEDIUM_VOLATILITY_MAX_PCT: f64 = 3.0;

/// ATR relative to price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityReading {
    pub ratio_pct: f64,
    pub tier: VolatilityTier,
}

/// True range of every bar after the first, oldest first.
pub fn true_ranges(series: &SeriesView) -> Vec<f64> {
    let highs = series.highs();
    let lows = series.lows();
    let closes = series.closes();

    (1..series.len())
        .map(|i| {
            let prev_close = closes[i - 1];
            highs[i].max(prev_close) - lows[i].min(prev_close)
        })
        .collect()
}

/// Mean of the last `period` true ranges.
///
/// Requires at least `period + 1` bars.
pub fn calculate_atr(series: &SeriesView, period: usize) -> Result<f64> {
    if period == 0 {
        return Err(AnalysisError::InvalidPeriod { indicator: "ATR" });
    }
    series.require("ATR", period + 1)?;

    let tr = true_ranges(series);
    let recent = &tr[tr.len() - period..];
    Ok(recent.iter().sum::<f64>() / period as f64)
}

/// Classify `atr` relative to `price`.
///
/// A non-positive price has no meaningful ratio and is reported as
/// `DegenerateInput`.
pub fn volatility_tier(atr: f64, price: f64) -> Result<VolatilityReading> {
    if price <= 0.0 {
        return Err(AnalysisError::DegenerateInput {
            indicator: "volatility",
            reason: "non-positive price",
            fallback: 0.0,
        });
    }

    let ratio_pct = atr / price * 100.0;
    let tier = if ratio_pct < LOW_VOLATILITY_MAX_PCT {
        VolatilityTier::Low
    } else if ratio_pct < MEDIUM_VOLATILITY_MAX_PCT {
        VolatilityTier::Medium
    } else {
        VolatilityTier::High
    };

    Ok(VolatilityReading { ratio_pct, tier })
}
