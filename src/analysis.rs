// =============================================================================
// Analysis — one parameterised pipeline from series to recommendation
// =============================================================================
//
// Pipeline:
//   1. RSI, trend averages, ATR and candle pattern (required)
//   2. MACD histogram and Stochastic RSI (optional: skipped when the series is
//      too short or degenerate for them)
//   3. Threshold classification of every value
//   4. Fusion with the configured strategy
//   5. Volatility tier from ATR / price
//
// The function holds no state between calls; identical input yields an
// identical `Recommendation`.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::indicators::atr::{calculate_atr, volatility_tier, VolatilityReading, DEFAULT_ATR_PERIOD};
use crate::indicators::macd::{calculate_macd, MacdReading, DEFAULT_MACD_WINDOWS};
use crate::indicators::moving_average::MovingAverageKind;
use crate::indicators::pattern::detect_candle_pattern;
use crate::indicators::rsi::{calculate_rsi, DEFAULT_RSI_PERIOD};
use crate::indicators::stoch_rsi::{calculate_stoch_rsi, DEFAULT_STOCH_RSI_PERIOD};
use crate::indicators::trend::{calculate_trend, TrendReading, DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use crate::market_data::SeriesView;
use crate::signals::classify::{cross_signal, macd_signal, rsi_signal, stoch_rsi_signal};
use crate::signals::{FusionResult, FusionStrategyKind, IndicatorSignals};
use crate::types::{CandlePattern, Signal};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_rsi_period() -> usize {
    DEFAULT_RSI_PERIOD
}

fn default_ma_windows() -> [usize; 2] {
    [DEFAULT_SHORT_WINDOW, DEFAULT_LONG_WINDOW]
}

fn default_macd_windows() -> [usize; 3] {
    DEFAULT_MACD_WINDOWS
}

fn default_atr_period() -> usize {
    DEFAULT_ATR_PERIOD
}

fn default_stoch_rsi_period() -> usize {
    DEFAULT_STOCH_RSI_PERIOD
}

// =============================================================================
// AnalysisConfig
// =============================================================================

/// Indicator windows and fusion policy for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Short and long trend windows.
    #[serde(default = "default_ma_windows")]
    pub ma_windows: [usize; 2],

    /// MACD fast, slow and signal windows.
    #[serde(default = "default_macd_windows")]
    pub macd_windows: [usize; 3],

    #[serde(default = "default_atr_period")]
    pub atr_period: usize,

    #[serde(default = "default_stoch_rsi_period")]
    pub stoch_rsi_period: usize,

    #[serde(default)]
    pub fusion_strategy: FusionStrategyKind,

    /// Averaging used by the trend windows and MACD legs.
    #[serde(default)]
    pub moving_average: MovingAverageKind,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            ma_windows: default_ma_windows(),
            macd_windows: default_macd_windows(),
            atr_period: default_atr_period(),
            stoch_rsi_period: default_stoch_rsi_period(),
            fusion_strategy: FusionStrategyKind::default(),
            moving_average: MovingAverageKind::default(),
        }
    }
}

impl AnalysisConfig {
    /// Bars needed for every required indicator to succeed.
    pub fn min_bars(&self) -> usize {
        let [short, long] = self.ma_windows;
        (self.rsi_period + 1)
            .max(short)
            .max(long)
            .max(self.atr_period + 1)
    }
}

// =============================================================================
// Recommendation
// =============================================================================

/// Every computed value plus the fused verdict for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub price: f64,
    pub rsi: f64,
    pub rsi_signal: Signal,
    pub trend: TrendReading,
    pub cross_signal: Signal,
    pub macd: Option<MacdReading>,
    pub macd_signal: Option<Signal>,
    pub stoch_rsi: Option<f64>,
    pub stoch_rsi_signal: Option<Signal>,
    pub atr: f64,
    pub volatility: Option<VolatilityReading>,
    pub pattern: CandlePattern,
    pub fusion: FusionResult,
}

/// Run every indicator over `series` and fuse the signals.
///
/// # Errors
/// - `InsufficientData` when the series is shorter than RSI, trend or ATR need.
/// - `InvalidPeriod` when a configured window is zero.
pub fn analyze(series: &SeriesView, config: &AnalysisConfig) -> Result<Recommendation> {
    let closes = series.closes();
    let price = series.last_close().ok_or(AnalysisError::InsufficientData {
        indicator: "analysis",
        required: config.min_bars(),
        actual: 0,
    })?;

    // ── 1. Required indicators ───────────────────────────────────────────
    let rsi = calculate_rsi(closes, config.rsi_period)?;
    let [short, long] = config.ma_windows;
    let trend = calculate_trend(closes, short, long, config.moving_average)?;
    let atr = calculate_atr(series, config.atr_period)?;
    let pattern = detect_candle_pattern(series)?;

    // ── 2. Optional indicators ───────────────────────────────────────────
    let [fast, slow, signal] = config.macd_windows;
    let macd = optional(calculate_macd(closes, fast, slow, signal, config.moving_average))?;
    let stoch_rsi = optional(calculate_stoch_rsi(closes, config.stoch_rsi_period))?;

    // ── 3. Classification ────────────────────────────────────────────────
    let signals = IndicatorSignals {
        rsi: rsi_signal(rsi),
        cross: cross_signal(trend.cross),
        macd: macd.map(|m| macd_signal(m.histogram)),
        stoch_rsi: stoch_rsi.map(stoch_rsi_signal),
    };

    // ── 4. Fusion ────────────────────────────────────────────────────────
    let fusion = config.fusion_strategy.strategy().fuse(&signals);

    // ── 5. Volatility ────────────────────────────────────────────────────
    let volatility = optional(volatility_tier(atr, price))?;

    debug!(
        price,
        rsi,
        atr,
        pattern = %pattern,
        verdict = %fusion.signal,
        score = fusion.score,
        "analysis complete"
    );

    Ok(Recommendation {
        price,
        rsi,
        rsi_signal: signals.rsi,
        trend,
        cross_signal: signals.cross,
        macd,
        macd_signal: signals.macd,
        stoch_rsi,
        stoch_rsi_signal: signals.stoch_rsi,
        atr,
        volatility,
        pattern,
        fusion,
    })
}

/// Map too-short or degenerate results to `None`; keep other errors.
fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e @ AnalysisError::InsufficientData { .. })
        | Err(e @ AnalysisError::DegenerateInput { .. }) => {
            debug!(error = %e, "optional indicator skipped");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bar, CrossSignal, FusedSignal, Trend, VolatilityTier};

    /// Oscillating uptrend with realistic bar shapes.
    fn uptrend(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let close = 100.0 + i as f64 * 0.5 + (i as f64 * 0.8).sin() * 2.0;
                let open = close - 0.4;
                Bar::new(open, close + 1.0, open - 1.0, close)
            })
            .collect()
    }

    fn view(bars: &[Bar]) -> SeriesView {
        SeriesView::from_bars(bars).unwrap()
    }

    #[test]
    fn default_config_matches_standard_windows() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.rsi_period, 14);
        assert_eq!(cfg.ma_windows, [50, 200]);
        assert_eq!(cfg.macd_windows, [12, 26, 9]);
        assert_eq!(cfg.atr_period, 14);
        assert_eq!(cfg.stoch_rsi_period, 14);
        assert_eq!(cfg.fusion_strategy, FusionStrategyKind::Scored);
        assert_eq!(cfg.moving_average, MovingAverageKind::WindowMean);
        assert_eq!(cfg.min_bars(), 200);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let cfg: AnalysisConfig =
            serde_json::from_str(r#"{ "fusion_strategy": "paired", "ma_windows": [20, 60] }"#)
                .unwrap();
        assert_eq!(cfg.fusion_strategy, FusionStrategyKind::Paired);
        assert_eq!(cfg.ma_windows, [20, 60]);
        assert_eq!(cfg.rsi_period, 14);
        assert_eq!(cfg.moving_average, MovingAverageKind::WindowMean);
    }

    #[test]
    fn uptrend_end_to_end() {
        let rec = analyze(&view(&uptrend(220)), &AnalysisConfig::default()).unwrap();
        assert!((0.0..=100.0).contains(&rec.rsi));
        assert_eq!(rec.trend.trend, Trend::Bullish);
        assert_eq!(rec.trend.cross, CrossSignal::GoldenCross);
        assert_eq!(rec.cross_signal, Signal::Buy);
        assert!(rec.macd.is_some());
        assert!(rec.atr > 0.0);
        assert_eq!(rec.volatility.unwrap().tier, VolatilityTier::Low);
        assert_eq!(rec.fusion.strategy, FusionStrategyKind::Scored);
        let last = uptrend(220)[219];
        assert_eq!(rec.price, last.close);
    }

    #[test]
    fn analyze_is_idempotent() {
        let series = view(&uptrend(210));
        let cfg = AnalysisConfig::default();
        assert_eq!(analyze(&series, &cfg).unwrap(), analyze(&series, &cfg).unwrap());
    }

    #[test]
    fn short_series_reports_trend_window() {
        let err = analyze(&view(&uptrend(120)), &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData {
                required: 200,
                actual: 120,
                ..
            }
        ));
    }

    #[test]
    fn empty_series_is_insufficient() {
        let err = analyze(&view(&[]), &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { actual: 0, .. }));
    }

    #[test]
    fn optional_indicators_skip_on_small_windows() {
        // 20 bars: enough for RSI(14), trend [5, 10], ATR(14); not for MACD
        // (35) or StochRSI (28).
        let cfg = AnalysisConfig {
            ma_windows: [5, 10],
            ..AnalysisConfig::default()
        };
        let rec = analyze(&view(&uptrend(20)), &cfg).unwrap();
        assert!(rec.macd.is_none());
        assert!(rec.macd_signal.is_none());
        assert!(rec.stoch_rsi.is_none());
        assert_eq!(rec.fusion.contributions.len(), 1);
    }

    #[test]
    fn flat_rsi_series_drops_stoch_rsi() {
        // Accelerating rise: every window RSI is 100, MACD histogram positive.
        let bars: Vec<Bar> = (0..60)
            .map(|i| {
                let x = i as f64;
                let c = 100.0 + x + 0.02 * x * x;
                Bar::new(c - 0.5, c + 0.5, c - 1.0, c)
            })
            .collect();
        let cfg = AnalysisConfig {
            ma_windows: [10, 50],
            ..AnalysisConfig::default()
        };
        let rec = analyze(&view(&bars), &cfg).unwrap();
        assert!((rec.rsi - 100.0).abs() < 1e-10);
        assert_eq!(rec.rsi_signal, Signal::Sell);
        assert!(rec.stoch_rsi.is_none());
        assert_eq!(rec.macd_signal, Some(Signal::Buy));
        assert_eq!(rec.fusion.score, 0);
        assert_eq!(rec.fusion.signal, FusedSignal::Mixed);
    }

    #[test]
    fn paired_strategy_uses_cross() {
        let cfg = AnalysisConfig {
            fusion_strategy: FusionStrategyKind::Paired,
            ..AnalysisConfig::default()
        };
        let rec = analyze(&view(&uptrend(220)), &cfg).unwrap();
        assert_eq!(rec.fusion.strategy, FusionStrategyKind::Paired);
        let names: Vec<&str> = rec.fusion.contributions.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["rsi", "cross"]);
    }

    #[test]
    fn zero_period_is_rejected() {
        let cfg = AnalysisConfig {
            rsi_period: 0,
            ..AnalysisConfig::default()
        };
        let err = analyze(&view(&uptrend(220)), &cfg).unwrap_err();
        assert_eq!(err, AnalysisError::InvalidPeriod { indicator: "RSI" });
    }
}
