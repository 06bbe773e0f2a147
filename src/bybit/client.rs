// =============================================================================
// Bybit REST API Client — public market-data endpoints
// =============================================================================
//
// Only unsigned spot endpoints are used:
//   GET /v5/market/kline    OHLCV rows, newest first
//   GET /v5/market/tickers  last traded price (price-only fallback)
//
// Every value in a kline row is a JSON string:
//   [startTime, open, high, low, close, volume, turnover]
// =============================================================================

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::types::Bar;

const SPOT: &str = "spot";

/// Bybit v5 response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    result: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
struct KlineResult {
    #[serde(default)]
    list: Vec<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct TickerResult {
    #[serde(default)]
    list: Vec<TickerEntry>,
}

#[derive(Debug, Deserialize)]
struct TickerEntry {
    symbol: String,
    #[serde(rename = "lastPrice")]
    last_price: String,
}

/// Bybit public REST client.
#[derive(Clone)]
pub struct BybitClient {
    base_url: String,
    client: reqwest::Client,
}

impl BybitClient {
    /// Create a client against `base_url` (e.g. `https://api.bybit.com`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %base_url, "BybitClient initialised");

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------------------------------------------------------
    // Market data
    // -------------------------------------------------------------------------

    /// GET /v5/market/kline — bars oldest first.
    #[instrument(skip(self), name = "bybit::get_klines")]
    pub async fn get_klines(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Bar>> {
        let query = [
            ("category", SPOT.to_string()),
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ];
        let result: KlineResult = self.get_result("/v5/market/kline", &query).await?;
        let bars = parse_kline_rows(&result.list)?;
        debug!(symbol, count = bars.len(), "klines retrieved");
        Ok(bars)
    }

    /// Fetch `limit` bars; when that returns nothing, retry once with
    /// `fallback_limit`.
    pub async fn get_klines_with_fallback(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
        fallback_limit: u32,
    ) -> Result<Vec<Bar>> {
        let bars = self.get_klines(symbol, interval, limit).await?;
        if !bars.is_empty() || fallback_limit == limit {
            return Ok(bars);
        }
        warn!(symbol, limit, fallback_limit, "empty kline list, retrying with smaller limit");
        self.get_klines(symbol, interval, fallback_limit).await
    }

    /// GET /v5/market/tickers — last traded price.
    #[instrument(skip(self), name = "bybit::get_last_price")]
    pub async fn get_last_price(&self, symbol: &str) -> Result<f64> {
        let query = [("category", SPOT.to_string()), ("symbol", symbol.to_string())];
        let result: TickerResult = self.get_result("/v5/market/tickers", &query).await?;
        parse_last_price(&result, symbol)
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    async fn get_result<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let url = format!("{}{}", self.base_url, path);

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {path} request failed"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("failed to read {path} response body"))?;

        if !status.is_success() {
            anyhow::bail!("Bybit GET {path} returned {status}: {body}");
        }

        unwrap_envelope(&body, path)
    }
}

impl std::fmt::Debug for BybitClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BybitClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Decode a v5 envelope, failing on a non-zero `retCode`.
fn unwrap_envelope<T>(body: &str, path: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let envelope: Envelope<T> = serde_json::from_str(body)
        .with_context(|| format!("failed to parse {path} response"))?;

    if envelope.ret_code != 0 {
        anyhow::bail!(
            "Bybit GET {path} error {}: {}",
            envelope.ret_code,
            envelope.ret_msg
        );
    }

    Ok(envelope.result.unwrap_or_default())
}

/// Convert raw kline rows into bars sorted oldest first.
fn parse_kline_rows(rows: &[Vec<String>]) -> Result<Vec<Bar>> {
    let mut bars = rows
        .iter()
        .enumerate()
        .map(|(i, row)| parse_kline_row(row).with_context(|| format!("bad kline row {i}")))
        .collect::<Result<Vec<Bar>>>()?;

    bars.sort_by_key(|b| b.timestamp.unwrap_or_default());
    Ok(bars)
}

fn parse_kline_row(row: &[String]) -> Result<Bar> {
    if row.len() < 5 {
        anyhow::bail!("expected at least 5 fields, got {}", row.len());
    }
    let timestamp = row[0]
        .parse::<i64>()
        .with_context(|| format!("failed to parse start time '{}'", row[0]))?;
    let volume = row.get(5).map(|v| parse_str_f64(v, "volume")).transpose()?;

    Ok(Bar {
        open: parse_str_f64(&row[1], "open")?,
        high: parse_str_f64(&row[2], "high")?,
        low: parse_str_f64(&row[3], "low")?,
        close: parse_str_f64(&row[4], "close")?,
        volume,
        timestamp: Some(timestamp),
    })
}

fn parse_last_price(result: &TickerResult, symbol: &str) -> Result<f64> {
    let entry = result
        .list
        .iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
        .with_context(|| format!("symbol {symbol} not found in tickers response"))?;
    parse_str_f64(&entry.last_price, "lastPrice")
}

/// Bybit sends numeric values as JSON strings.
fn parse_str_f64(s: &str, name: &str) -> Result<f64> {
    s.parse::<f64>()
        .with_context(|| format!("failed to parse {name} as f64: {s}"))
}
