// =============================================================================
// Stochastic RSI
// =============================================================================
//
// RSI's own position inside its min-max range:
//
//   StochRSI = (RSI_now - min(RSI)) / (max(RSI) - min(RSI)) * 100
//
// The RSI series is built by recomputing RSI over every trailing window of
// `period + 1` closes, so each point is a seed-only RSI of the same length.
// A flat RSI series has no range and is reported as degenerate.

use crate::error::{AnalysisError, Result};
use crate::indicators::rsi::calculate_rsi;
use crate::market_data::require_len;

pub const DEFAULT_STOCH_RSI_PERIOD: usize = 14;

/// Neutral value used when the RSI series has no range.
pub const FLAT_STOCH_RSI: f64 = 50.0;

/// RSI of every sliding window of `period + 1` closes, oldest first.
pub fn windowed_rsi_series(closes: &[f64], period: usize) -> Result<Vec<f64>> {
    if period == 0 {
        return Err(AnalysisError::InvalidPeriod {
            indicator: "StochRSI",
        });
    }
    closes
        .windows(period + 1)
        .map(|window| calculate_rsi(window, period))
        .collect()
}

/// Most recent Stochastic RSI value in [0, 100].
///
/// # Errors
/// - `InsufficientData` when fewer than `2 * period` closes are supplied.
/// - `DegenerateInput` (fallback [`FLAT_STOCH_RSI`]) when every RSI in the
///   series is equal.
pub fn calculate_stoch_rsi(closes: &[f64], period: usize) -> Result<f64> {
    if period == 0 {
        return Err(AnalysisError::InvalidPeriod {
            indicator: "StochRSI",
        });
    }
    require_len("StochRSI", 2 * period, closes.len())?;

    let series = windowed_rsi_series(closes, period)?;
    let now = series[series.len() - 1];
    let (min, max) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let range = max - min;
    if range == 0.0 {
        return Err(AnalysisError::DegenerateInput {
            indicator: "StochRSI",
            reason: "flat RSI series",
            fallback: FLAT_STOCH_RSI,
        });
    }

    Ok(((now - min) / range * 100.0).clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.05)
            .collect()
    }

    #[test]
    fn needs_twice_the_period() {
        let err = calculate_stoch_rsi(&wave(27), 14).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientData {
                indicator: "StochRSI",
                required: 28,
                actual: 27,
            }
        );
        assert!(calculate_stoch_rsi(&wave(28), 14).is_ok());
    }

    #[test]
    fn window_series_length() {
        let series = windowed_rsi_series(&wave(30), 14).unwrap();
        assert_eq!(series.len(), 30 - 14);
    }

    #[test]
    fn stays_in_range() {
        for n in [28, 40, 75, 120] {
            let v = calculate_stoch_rsi(&wave(n), 14).unwrap();
            assert!((0.0..=100.0).contains(&v), "StochRSI {v} out of range");
        }
    }

    #[test]
    fn flat_series_is_degenerate() {
        // Monotonic rise => every window RSI is 100 => no range.
        let closes: Vec<f64> = (1..=40).map(|x| x as f64).collect();
        assert_eq!(
            calculate_stoch_rsi(&closes, 14),
            Err(AnalysisError::DegenerateInput {
                indicator: "StochRSI",
                reason: "flat RSI series",
                fallback: FLAT_STOCH_RSI,
            })
        );
    }

    #[test]
    fn latest_extreme_hits_bounds() {
        // Long flat stretch with small wiggles, then a hard sell-off at the end
        // drives the latest window RSI to the series minimum.
        let mut closes = wave(40);
        for i in 0..14 {
            closes.push(95.0 - i as f64 * 2.0);
        }
        let v = calculate_stoch_rsi(&closes, 14).unwrap();
        assert!(v.abs() < 1e-10, "expected 0, got {v}");
    }
}
