// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Seed average gain / average loss with the SMA of the first `period`
//          gains / losses.
// Step 3 — Apply Wilder's smoothing:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Zero average loss is a degenerate branch: 100 when there were gains, 50
// when there was no movement at all.
// =============================================================================

use crate::error::{AnalysisError, OrFallback, Result};
use crate::market_data::require_len;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Compute the full RSI series for the given `closes` and `period`.
///
/// The returned vector has one RSI value for each close starting at index
/// `period` (the first `period` closes are consumed to seed the averages).
///
/// # Errors
/// - `InvalidPeriod` when `period == 0`.
/// - `InsufficientData` when `closes.len() < period + 1`.
pub fn calculate_rsi_series(closes: &[f64], period: usize) -> Result<Vec<f64>> {
    if period == 0 {
        return Err(AnalysisError::InvalidPeriod { indicator: "RSI" });
    }
    require_len("RSI", period + 1, closes.len())?;

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    // --- Seed averages with SMA of first `period` deltas ---------------------
    let (sum_gain, sum_loss) = deltas[..period].iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
        if d > 0.0 {
            (g + d, l)
        } else {
            (g, l + d.abs())
        }
    });

    let period_f = period as f64;
    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;

    let mut result = Vec::with_capacity(deltas.len() - period + 1);
    result.push(rsi_from_averages(avg_gain, avg_loss).or_fallback()?);

    // --- Wilder's smoothing for subsequent values ----------------------------
    for &delta in &deltas[period..] {
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);

        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;

        result.push(rsi_from_averages(avg_gain, avg_loss).or_fallback()?);
    }

    Ok(result)
}

/// Most recent RSI value.  Requires at least `period + 1` closes.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Result<f64> {
    let series = calculate_rsi_series(closes, period)?;
    // The series always holds at least the seed value.
    Ok(series[series.len() - 1])
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Zero average loss is reported as `DegenerateInput` with fallback 100
/// (gains only) or 50 (no movement).
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Result<f64> {
    if avg_loss == 0.0 {
        let (reason, fallback) = if avg_gain == 0.0 {
            ("no price movement", 50.0)
        } else {
            ("zero average loss", 100.0)
        };
        return Err(AnalysisError::DegenerateInput {
            indicator: "RSI",
            reason,
            fallback,
        });
    }

    let rs = avg_gain / avg_loss;
    Ok((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
}
