// =============================================================================
// Pipeline — user token to per-symbol reports
// =============================================================================
//
// For each resolved symbol:
//   1. Fetch klines (with the smaller-limit retry)
//   2. Validate them into a SeriesView
//   3. Analyse
//   4. On a too-short series, fall back to a price-only reply using the last
//      close; on an empty series, fall back to the ticker's last price
//   5. Render the reply text
// =============================================================================

use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::{analyze, AnalysisConfig, Recommendation};
use crate::app_state::AppState;
use crate::error::AnalysisError;
use crate::market_data::SeriesView;
use crate::report;

/// Outcome category of one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Ok,
    PriceOnly,
    NoData,
    Error,
}

/// Reply for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    pub text: String,
}

/// Expand a user token into exchange symbols.
///
/// `ETH` is quoted in both the quote asset and BTC; any other token only in
/// the quote asset.  Blank input yields no symbols.
pub fn resolve_symbols(token: &str, quote_asset: &str) -> Vec<String> {
    let token = token.trim().to_uppercase();
    if token.is_empty() {
        return Vec::new();
    }
    if token == "ETH" {
        return vec![format!("ETH{quote_asset}"), "ETHBTC".to_string()];
    }
    vec![format!("{token}{quote_asset}")]
}

/// Run the full pipeline for one symbol.  Never fails: every failure becomes
/// a report with the matching status.
pub async fn evaluate_symbol(
    state: &AppState,
    symbol: &str,
    analysis: &AnalysisConfig,
) -> SymbolReport {
    let cfg = &state.config;
    let interval = cfg.kline_interval.as_str();

    let bars = match state
        .client
        .get_klines_with_fallback(symbol, interval, cfg.kline_limit, cfg.fallback_kline_limit)
        .await
    {
        Ok(bars) => bars,
        Err(e) => {
            warn!(symbol, error = %e, "kline fetch failed");
            return error_report(symbol, &format!("{e:#}"));
        }
    };

    if bars.is_empty() {
        return match state.client.get_last_price(symbol).await {
            Ok(price) => price_only_report(symbol, interval, price, "no kline data"),
            Err(e) => {
                warn!(symbol, error = %e, "ticker fallback failed");
                SymbolReport {
                    symbol: symbol.to_string(),
                    status: ReportStatus::NoData,
                    price: None,
                    recommendation: None,
                    text: report::format_no_data(symbol),
                }
            }
        };
    }

    let series = match SeriesView::from_bars(&bars) {
        Ok(series) => series,
        Err(e) => {
            warn!(symbol, error = %e, "rejected kline data");
            return error_report(symbol, &e.to_string());
        }
    };

    match analyze(&series, analysis) {
        Ok(rec) => {
            info!(
                symbol,
                verdict = %rec.fusion.signal,
                score = rec.fusion.score,
                "analysis produced"
            );
            SymbolReport {
                symbol: symbol.to_string(),
                status: ReportStatus::Ok,
                price: Some(rec.price),
                text: report::format_recommendation(symbol, interval, analysis, &rec),
                recommendation: Some(rec),
            }
        }
        Err(e @ AnalysisError::InsufficientData { .. }) => {
            info!(symbol, error = %e, "series too short, price-only reply");
            match series.last_close() {
                Some(price) => price_only_report(symbol, interval, price, &e.to_string()),
                None => error_report(symbol, &e.to_string()),
            }
        }
        Err(e) => {
            warn!(symbol, error = %e, "analysis failed");
            error_report(symbol, &e.to_string())
        }
    }
}

fn price_only_report(symbol: &str, interval: &str, price: f64, reason: &str) -> SymbolReport {
    SymbolReport {
        symbol: symbol.to_string(),
        status: ReportStatus::PriceOnly,
        price: Some(price),
        recommendation: None,
        text: report::format_price_only(symbol, interval, price, reason),
    }
}

fn error_report(symbol: &str, error: &str) -> SymbolReport {
    SymbolReport {
        symbol: symbol.to_string(),
        status: ReportStatus::Error,
        price: None,
        recommendation: None,
        text: report::format_error(symbol, error),
    }
}
