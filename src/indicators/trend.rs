// =============================================================================
// Trend — short vs. long average
// =============================================================================
//
// The "EMA50 / EMA200" pair.  With the default `WindowMean` kind these are the
// trailing means of the last 50 and 200 closes.  Bullish and golden cross when
// the short average is strictly above the long one; bearish / death cross
// otherwise (ties included).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::indicators::moving_average::MovingAverageKind;
use crate::types::{CrossSignal, Trend};

pub const DEFAULT_SHORT_WINDOW: usize = 50;
pub const DEFAULT_LONG_WINDOW: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReading {
    pub short_average: f64,
    pub long_average: f64,
    pub trend: Trend,
    pub cross: CrossSignal,
}

/// Compare the latest short and long averages of `closes`.
///
/// Requires at least `long` closes.
pub fn calculate_trend(
    closes: &[f64],
    short: usize,
    long: usize,
    kind: MovingAverageKind,
) -> Result<TrendReading> {
    let long_average = kind.latest(closes, long, "EMA long window")?;
    let short_average = kind.latest(closes, short, "EMA short window")?;

    let bullish = short_average > long_average;
    Ok(TrendReading {
        short_average,
        long_average,
        trend: if bullish { Trend::Bullish } else { Trend::Bearish },
        cross: if bullish {
            CrossSignal::GoldenCross
        } else {
            CrossSignal::DeathCross
        },
    })
}
