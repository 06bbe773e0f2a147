// =============================================================================
// Shared types used across the analysis engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// One OHLC(V) observation for a fixed time interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Bar open time, milliseconds since the UNIX epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume: None,
            timestamp: None,
        }
    }
}

/// Categorical reading of a single indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

impl Signal {
    /// +1 for buy, -1 for sell, 0 for neutral.
    pub fn direction(self) -> i32 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
            Self::Neutral => 0,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Sell => write!(f, "Sell"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Final fused verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FusedSignal {
    StrongBuy,
    WeakBuy,
    Mixed,
    WeakSell,
    StrongSell,
}

impl std::fmt::Display for FusedSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "Strong Buy"),
            Self::WeakBuy => write!(f, "Weak Buy"),
            Self::Mixed => write!(f, "Mixed"),
            Self::WeakSell => write!(f, "Weak Sell"),
            Self::StrongSell => write!(f, "Strong Sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Bearish => write!(f, "Bearish"),
        }
    }
}

/// Relative position of the short and long trend averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossSignal {
    GoldenCross,
    DeathCross,
}

impl std::fmt::Display for CrossSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoldenCross => write!(f, "Golden Cross"),
            Self::DeathCross => write!(f, "Death Cross"),
        }
    }
}

/// Volatility risk tier derived from ATR as a percentage of price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityTier {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for VolatilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Single/two-candle geometric pattern on the most recent bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandlePattern {
    Doji,
    ShootingStar,
    Hammer,
    BullishEngulfing,
    BearishEngulfing,
    NoPattern,
}

impl std::fmt::Display for CandlePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Doji => write!(f, "Doji"),
            Self::ShootingStar => write!(f, "Shooting Star"),
            Self::Hammer => write!(f, "Hammer"),
            Self::BullishEngulfing => write!(f, "Bullish Engulfing"),
            Self::BearishEngulfing => write!(f, "Bearish Engulfing"),
            Self::NoPattern => write!(f, "No clear pattern"),
        }
    }
}
