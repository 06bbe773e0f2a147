// =============================================================================
// kline-analyst — indicator engine and the service around it
// =============================================================================
//
// The engine (`market_data`, `indicators`, `signals`, `analysis`) is pure,
// synchronous computation over one supplied series.  The remaining modules
// fetch that series, render the reply, and serve it over HTTP.

pub mod analysis;
pub mod api;
pub mod app_state;
pub mod bybit;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod pipeline;
pub mod report;
pub mod runtime_config;
pub mod signals;
pub mod types;

pub use analysis::{analyze, AnalysisConfig, Recommendation};
pub use error::{AnalysisError, Result};
pub use market_data::SeriesView;
