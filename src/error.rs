// =============================================================================
// Analysis errors
// =============================================================================
//
// Every failure inside the engine is deterministic for a given input, so there
// is no transient/fatal split here.  Degenerate numeric conditions carry the
// fallback value the indicator falls back to.

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Series shorter than the minimum window an indicator needs.
    #[error("{indicator} requires >= {required} closes, got {actual}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        actual: usize,
    },

    /// A computation would divide by zero; `fallback` is the defined value.
    #[error("{indicator}: {reason} (fallback {fallback})")]
    DegenerateInput {
        indicator: &'static str,
        reason: &'static str,
        fallback: f64,
    },

    /// A bar with non-finite values or `low > high`.
    #[error("malformed bar at index {index}: {reason}")]
    MalformedBar { index: usize, reason: String },

    /// A zero look-back window.
    #[error("{indicator} period must be positive")]
    InvalidPeriod { indicator: &'static str },

    /// Parallel OHLC(V) columns of different lengths.
    #[error("column {column} has {actual} values, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Resolve a `DegenerateInput` error into its fallback value.
pub trait OrFallback {
    fn or_fallback(self) -> Result<f64>;
}

impl OrFallback for Result<f64> {
    fn or_fallback(self) -> Result<f64> {
        match self {
            Err(AnalysisError::DegenerateInput {
                indicator,
                reason,
                fallback,
            }) => {
                debug!(indicator, reason, fallback, "degenerate input, using fallback");
                Ok(fallback)
            }
            other => other,
        }
    }
}
