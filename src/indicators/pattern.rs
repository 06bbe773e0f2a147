// =============================================================================
// Candle pattern classifier
// =============================================================================
//
// Looks at the last bar (and the one before it for engulfing patterns).  The
// checks run in a fixed order and the first match wins:
//
//   1. Doji               |open - close| <= 0.1 * range
//   2. Shooting Star      body < 0.3 * range, upper > 2 * body, lower < body
//   3. Hammer             body < 0.3 * range, lower > 2 * body, upper < body
//   4. Bullish Engulfing  green bar whose body covers the previous red body
//   5. Bearish Engulfing  red bar whose body covers the previous green body
//   6. No pattern
//
// With a single bar only checks 1-3 run.

use crate::error::Result;
use crate::market_data::SeriesView;
use crate::types::CandlePattern;

const DOJI_BODY_RATIO: f64 = 0.1;
const SMALL_BODY_RATIO: f64 = 0.3;
const SHADOW_TO_BODY: f64 = 2.0;

/// Geometry of one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candle {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl Candle {
    fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    fn range(&self) -> f64 {
        self.high - self.low
    }

    fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Classify the pattern formed by the most recent bar(s) of `series`.
pub fn detect_candle_pattern(series: &SeriesView) -> Result<CandlePattern> {
    series.require("candle pattern", 1)?;

    let at = |i: usize| Candle {
        open: series.opens()[i],
        high: series.highs()[i],
        low: series.lows()[i],
        close: series.closes()[i],
    };
    let n = series.len();
    let last = at(n - 1);
    let prev = (n >= 2).then(|| at(n - 2));

    Ok(classify(&last, prev.as_ref()))
}

fn classify(last: &Candle, prev: Option<&Candle>) -> CandlePattern {
    let body = last.body();
    let range = last.range();
    let upper = last.upper_shadow();
    let lower = last.lower_shadow();
    let small_body = body < range * SMALL_BODY_RATIO;

    if body <= range * DOJI_BODY_RATIO {
        return CandlePattern::Doji;
    }
    if small_body && upper > body * SHADOW_TO_BODY && lower < body {
        return CandlePattern::ShootingStar;
    }
    if small_body && lower > body * SHADOW_TO_BODY && upper < body {
        return CandlePattern::Hammer;
    }

    if let Some(prev) = prev {
        if last.is_bullish()
            && prev.is_bearish()
            && last.close > prev.open
            && last.open < prev.close
        {
            return CandlePattern::BullishEngulfing;
        }
        if last.is_bearish()
            && prev.is_bullish()
            && last.open > prev.close
            && last.close < prev.open
        {
            return CandlePattern::BearishEngulfing;
        }
    }

    CandlePattern::NoPattern
}
