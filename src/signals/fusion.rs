// =============================================================================
// Signal fusion — categorical signals -> final recommendation
// =============================================================================
//
// Two interchangeable policies:
//
// * Scored: +1 per Buy, -1 per Sell over the available subset of
//   {RSI, MACD, StochRSI}.  score >= 2 => StrongBuy, <= -2 => StrongSell,
//   anything else Mixed.
//
// * Paired: RSI signal x trend-cross signal, exact case match.
//     Buy  + Buy   => StrongBuy        Sell + Sell  => StrongSell
//     Neutral+Buy  => WeakBuy          Neutral+Sell => WeakSell
//     otherwise    => Mixed

use serde::{Deserialize, Serialize};

use crate::types::{FusedSignal, Signal};

/// Categorical signals available for one analysis.  `None` means the
/// indicator could not be computed for this series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSignals {
    pub rsi: Signal,
    pub cross: Signal,
    pub macd: Option<Signal>,
    pub stoch_rsi: Option<Signal>,
}

/// The contribution of a single signal to the final score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalContribution {
    pub name: String,
    pub signal: Signal,
    pub contribution: i32,
}

/// Result of a fusion policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionResult {
    pub strategy: FusionStrategyKind,
    pub signal: FusedSignal,
    pub score: i32,
    pub contributions: Vec<SignalContribution>,
}

/// A policy that turns per-indicator signals into one verdict.
pub trait FusionStrategy {
    fn kind(&self) -> FusionStrategyKind;
    fn fuse(&self, signals: &IndicatorSignals) -> FusionResult;
}

/// Selectable fusion policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FusionStrategyKind {
    #[default]
    Scored,
    Paired,
}

impl FusionStrategyKind {
    pub fn strategy(self) -> Box<dyn FusionStrategy + Send + Sync> {
        match self {
            Self::Scored => Box::new(ScoredFusion::default()),
            Self::Paired => Box::new(PairedFusion),
        }
    }
}

impl std::fmt::Display for FusionStrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scored => write!(f, "scored"),
            Self::Paired => write!(f, "paired"),
        }
    }
}

impl std::str::FromStr for FusionStrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scored" => Ok(Self::Scored),
            "paired" => Ok(Self::Paired),
            other => Err(format!("unknown fusion strategy '{other}'")),
        }
    }
}

fn contribution(name: &str, signal: Signal) -> SignalContribution {
    SignalContribution {
        name: name.to_string(),
        signal,
        contribution: signal.direction(),
    }
}

// =============================================================================
// Scored
// =============================================================================

/// Sums signal directions over RSI, MACD and StochRSI.
#[derive(Debug, Clone, Copy)]
pub struct ScoredFusion {
    /// Minimum absolute score for a strong verdict.
    pub strong_threshold: i32,
}

impl Default for ScoredFusion {
    fn default() -> Self {
        Self {
            strong_threshold: 2,
        }
    }
}

impl FusionStrategy for ScoredFusion {
    fn kind(&self) -> FusionStrategyKind {
        FusionStrategyKind::Scored
    }

    fn fuse(&self, signals: &IndicatorSignals) -> FusionResult {
        let mut contributions = vec![contribution("rsi", signals.rsi)];
        if let Some(macd) = signals.macd {
            contributions.push(contribution("macd", macd));
        }
        if let Some(stoch) = signals.stoch_rsi {
            contributions.push(contribution("stoch_rsi", stoch));
        }

        let score: i32 = contributions.iter().map(|c| c.contribution).sum();
        let signal = if score >= self.strong_threshold {
            FusedSignal::StrongBuy
        } else if score <= -self.strong_threshold {
            FusedSignal::StrongSell
        } else {
            FusedSignal::Mixed
        };

        FusionResult {
            strategy: self.kind(),
            signal,
            score,
            contributions,
        }
    }
}

// =============================================================================
// Paired
// =============================================================================

/// Matches the RSI signal against the trend-cross signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairedFusion;

impl FusionStrategy for PairedFusion {
    fn kind(&self) -> FusionStrategyKind {
        FusionStrategyKind::Paired
    }

    fn fuse(&self, signals: &IndicatorSignals) -> FusionResult {
        let contributions = vec![
            contribution("rsi", signals.rsi),
            contribution("cross", signals.cross),
        ];
        let score = contributions.iter().map(|c| c.contribution).sum();

        let signal = match (signals.rsi, signals.cross) {
            (Signal::Buy, Signal::Buy) => FusedSignal::StrongBuy,
            (Signal::Sell, Signal::Sell) => FusedSignal::StrongSell,
            (Signal::Neutral, Signal::Buy) => FusedSignal::WeakBuy,
            (Signal::Neutral, Signal::Sell) => FusedSignal::WeakSell,
            _ => FusedSignal::Mixed,
        };

        FusionResult {
            strategy: self.kind(),
            signal,
            score,
            contributions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(rsi: Signal, cross: Signal, macd: Option<Signal>, stoch: Option<Signal>) -> IndicatorSignals {
        IndicatorSignals {
            rsi,
            cross,
            macd,
            stoch_rsi: stoch,
        }
    }

    #[test]
    fn scored_strong_buy() {
        let s = signals(Signal::Buy, Signal::Sell, Some(Signal::Buy), Some(Signal::Neutral));
        let r = ScoredFusion::default().fuse(&s);
        assert_eq!(r.score, 2);
        assert_eq!(r.signal, FusedSignal::StrongBuy);
        assert_eq!(r.contributions.len(), 3);
    }

    #[test]
    fn scored_strong_sell() {
        let s = signals(Signal::Sell, Signal::Buy, Some(Signal::Sell), Some(Signal::Sell));
        let r = ScoredFusion::default().fuse(&s);
        assert_eq!(r.score, -3);
        assert_eq!(r.signal, FusedSignal::StrongSell);
    }

    #[test]
    fn scored_ignores_cross_and_missing_signals() {
        let s = signals(Signal::Buy, Signal::Buy, None, None);
        let r = ScoredFusion::default().fuse(&s);
        assert_eq!(r.score, 1);
        assert_eq!(r.signal, FusedSignal::Mixed);
        assert_eq!(r.contributions.len(), 1);
    }

    #[test]
    fn paired_case_table() {
        let cases = [
            (Signal::Buy, Signal::Buy, FusedSignal::StrongBuy),
            (Signal::Sell, Signal::Sell, FusedSignal::StrongSell),
            (Signal::Neutral, Signal::Buy, FusedSignal::WeakBuy),
            (Signal::Neutral, Signal::Sell, FusedSignal::WeakSell),
            (Signal::Buy, Signal::Sell, FusedSignal::Mixed),
            (Signal::Sell, Signal::Buy, FusedSignal::Mixed),
        ];
        for (rsi, cross, expected) in cases {
            let r = PairedFusion.fuse(&signals(rsi, cross, Some(Signal::Sell), None));
            assert_eq!(r.signal, expected, "rsi={rsi} cross={cross}");
            assert_eq!(r.strategy, FusionStrategyKind::Paired);
        }
    }

    #[test]
    fn kind_parses_and_dispatches() {
        assert_eq!("Paired".parse::<FusionStrategyKind>(), Ok(FusionStrategyKind::Paired));
        assert!("weighted".parse::<FusionStrategyKind>().is_err());
        assert_eq!(FusionStrategyKind::Scored.strategy().kind(), FusionStrategyKind::Scored);
        assert_eq!(FusionStrategyKind::Paired.strategy().kind(), FusionStrategyKind::Paired);
    }
}
