// =============================================================================
// SeriesView — validated, read-only OHLC(V) columns
// =============================================================================
//
// Bars are validated once at construction: every value must be finite and
// `low <= high`.  Opens/closes outside the high/low range are tolerated (some
// feeds report them) and only logged.  After construction the series is
// immutable and every indicator reads it through the column accessors.

use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::types::Bar;

/// Parallel open/high/low/close (and optional volume) columns, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesView {
    opens: Vec<f64>,
    highs: Vec<f64>,
    lows: Vec<f64>,
    closes: Vec<f64>,
    volumes: Option<Vec<f64>>,
}

impl SeriesView {
    /// Build a view from bars in chronological order.
    ///
    /// Volumes are kept only when every bar carries one.
    pub fn from_bars(bars: &[Bar]) -> Result<Self> {
        for (index, bar) in bars.iter().enumerate() {
            validate_bar(index, bar)?;
        }

        let volumes = bars
            .iter()
            .map(|b| b.volume)
            .collect::<Option<Vec<f64>>>();

        Ok(Self {
            opens: bars.iter().map(|b| b.open).collect(),
            highs: bars.iter().map(|b| b.high).collect(),
            lows: bars.iter().map(|b| b.low).collect(),
            closes: bars.iter().map(|b| b.close).collect(),
            volumes,
        })
    }

    /// Build a view from separate columns.  All columns must have the length
    /// of `closes`.
    pub fn from_columns(
        opens: Vec<f64>,
        highs: Vec<f64>,
        lows: Vec<f64>,
        closes: Vec<f64>,
        volumes: Option<Vec<f64>>,
    ) -> Result<Self> {
        let expected = closes.len();
        check_len("opens", expected, opens.len())?;
        check_len("highs", expected, highs.len())?;
        check_len("lows", expected, lows.len())?;
        if let Some(v) = &volumes {
            check_len("volumes", expected, v.len())?;
        }

        for i in 0..expected {
            let bar = Bar {
                open: opens[i],
                high: highs[i],
                low: lows[i],
                close: closes[i],
                volume: volumes.as_ref().map(|v| v[i]),
                timestamp: None,
            };
            validate_bar(i, &bar)?;
        }

        Ok(Self {
            opens,
            highs,
            lows,
            closes,
            volumes,
        })
    }

    pub fn opens(&self) -> &[f64] {
        &self.opens
    }

    pub fn highs(&self) -> &[f64] {
        &self.highs
    }

    pub fn lows(&self) -> &[f64] {
        &self.lows
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn volumes(&self) -> Option<&[f64]> {
        self.volumes.as_deref()
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Most recent close, if any.
    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }

    /// Fail with `InsufficientData` unless at least `required` bars exist.
    pub fn require(&self, indicator: &'static str, required: usize) -> Result<()> {
        require_len(indicator, required, self.len())
    }
}

/// Shared length guard for indicators that work on raw slices.
pub fn require_len(indicator: &'static str, required: usize, actual: usize) -> Result<()> {
    if actual < required {
        return Err(AnalysisError::InsufficientData {
            indicator,
            required,
            actual,
        });
    }
    Ok(())
}

fn check_len(column: &'static str, expected: usize, actual: usize) -> Result<()> {
    if actual != expected {
        return Err(AnalysisError::LengthMismatch {
            column,
            expected,
            actual,
        });
    }
    Ok(())
}

fn validate_bar(index: usize, bar: &Bar) -> Result<()> {
    let fields = [
        ("open", bar.open),
        ("high", bar.high),
        ("low", bar.low),
        ("close", bar.close),
        ("volume", bar.volume.unwrap_or(0.0)),
    ];
    if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
        return Err(AnalysisError::MalformedBar {
            index,
            reason: format!("{name} is not finite ({value})"),
        });
    }

    if bar.low > bar.high {
        return Err(AnalysisError::MalformedBar {
            index,
            reason: format!("low {} above high {}", bar.low, bar.high),
        });
    }

    let body_outside = |v: f64| v < bar.low || v > bar.high;
    if body_outside(bar.open) || body_outside(bar.close) {
        debug!(index, ?bar, "open/close outside high-low range, tolerated");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let base = 100.0 + i as f64;
                Bar::new(base, base + 2.0, base - 2.0, base + 1.0)
            })
            .collect()
    }

    #[test]
    fn from_bars_splits_columns() {
        let view = SeriesView::from_bars(&bars(3)).unwrap();
        assert_eq!(view.len(), 3);
        assert_eq!(view.opens(), &[100.0, 101.0, 102.0]);
        assert_eq!(view.highs(), &[102.0, 103.0, 104.0]);
        assert_eq!(view.lows(), &[98.0, 99.0, 100.0]);
        assert_eq!(view.closes(), &[101.0, 102.0, 103.0]);
        assert!(view.volumes().is_none());
        assert_eq!(view.last_close(), Some(103.0));
    }

    #[test]
    fn volumes_kept_when_every_bar_has_one() {
        let mut input = bars(2);
        input[0].volume = Some(10.0);
        input[1].volume = Some(20.0);
        let view = SeriesView::from_bars(&input).unwrap();
        assert_eq!(view.volumes(), Some(&[10.0, 20.0][..]));

        input[1].volume = None;
        let view = SeriesView::from_bars(&input).unwrap();
        assert!(view.volumes().is_none());
    }

    #[test]
    fn rejects_low_above_high() {
        let mut input = bars(3);
        input[1].low = 200.0;
        let err = SeriesView::from_bars(&input).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedBar { index: 1, .. }));
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut input = bars(3);
        input[2].close = f64::NAN;
        let err = SeriesView::from_bars(&input).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedBar { index: 2, .. }));

        let mut input = bars(2);
        input[0].volume = Some(f64::INFINITY);
        assert!(SeriesView::from_bars(&input).is_err());
    }

    #[test]
    fn tolerates_close_outside_range() {
        let bar = Bar::new(100.0, 101.0, 99.0, 105.0);
        assert!(SeriesView::from_bars(&[bar]).is_ok());
    }

    #[test]
    fn from_columns_checks_lengths() {
        let err = SeriesView::from_columns(
            vec![1.0, 2.0],
            vec![2.0, 3.0],
            vec![0.5],
            vec![1.5, 2.5],
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::LengthMismatch {
                column: "lows",
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn require_reports_required_and_actual() {
        let view = SeriesView::from_bars(&bars(9)).unwrap();
        let err = view.require("RSI", 15).unwrap_err();
        assert_eq!(err.to_string(), "RSI requires >= 15 closes, got 9");
        assert!(view.require("RSI", 9).is_ok());
    }
}
