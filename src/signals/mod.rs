// =============================================================================
// Signals Module
// =============================================================================
//
// - Threshold classification of raw indicator values
// - Fusion of the per-indicator signals into one recommendation

pub mod classify;
pub mod fusion;

pub use fusion::{
    FusionResult, FusionStrategy, FusionStrategyKind, IndicatorSignals, PairedFusion,
    ScoredFusion, SignalContribution,
};
