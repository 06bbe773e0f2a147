// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators behind a
// recommendation.  Every public function returns `Result<T>` so callers are
// forced to handle insufficient-data and numerical-edge-case scenarios.

pub mod atr;
pub mod macd;
pub mod moving_average;
pub mod pattern;
pub mod rsi;
pub mod stoch_rsi;
pub mod trend;
