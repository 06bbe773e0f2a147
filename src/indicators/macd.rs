// =============================================================================
// MACD histogram
// =============================================================================
//
//   fast   = MA(closes, fast)          (default 12)
//   slow   = MA(closes, slow)          (default 26)
//   macd   = fast - slow               aligned on the trailing overlap
//   signal = MA(macd, signal)          (default 9)
//   hist   = macd - signal             latest value reported
//
// "MA" is the sliding-window mean by default, or a recursive EMA when the
// caller selects `MovingAverageKind::Exponential`.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::indicators::moving_average::MovingAverageKind;
use crate::market_data::require_len;

pub const DEFAULT_MACD_WINDOWS: [usize; 3] = [12, 26, 9];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Latest MACD line, signal line and histogram.
///
/// Requires at least `slow + signal` closes.
pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
    kind: MovingAverageKind,
) -> Result<MacdReading> {
    if fast == 0 || slow == 0 || signal == 0 {
        return Err(AnalysisError::InvalidPeriod { indicator: "MACD" });
    }
    require_len("MACD", slow + signal, closes.len())?;

    let fast_series = kind.series(closes, fast, "MACD")?;
    let slow_series = kind.series(closes, slow, "MACD")?;

    // Both series end at the latest close; align on the shorter tail.
    let overlap = fast_series.len().min(slow_series.len());
    let fast_tail = &fast_series[fast_series.len() - overlap..];
    let slow_tail = &slow_series[slow_series.len() - overlap..];
    let macd_line: Vec<f64> = fast_tail
        .iter()
        .zip(slow_tail)
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = kind.series(&macd_line, signal, "MACD")?;

    let macd = macd_line[macd_line.len() - 1];
    let signal_value = signal_line[signal_line.len() - 1];

    Ok(MacdReading {
        macd,
        signal: signal_value,
        histogram: macd - signal_value,
    })
}
