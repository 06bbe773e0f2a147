// =============================================================================
// Report — human-readable reply text
// =============================================================================
//
// Renders a `Recommendation` (or a degraded reply) into the chat-style text
// block sent back to the user.  Pure string formatting; no I/O.

use std::fmt::Write as _;

use crate::analysis::{AnalysisConfig, Recommendation};
use crate::types::{CrossSignal, Signal, Trend};

/// Display label for a Bybit interval code ("D" => "1D", "240" => "4H").
pub fn interval_label(interval: &str) -> String {
    match interval {
        "D" | "W" | "M" => format!("1{interval}"),
        other => match other.parse::<u32>() {
            Ok(minutes) if minutes >= 60 && minutes % 60 == 0 => format!("{}H", minutes / 60),
            Ok(minutes) => format!("{minutes}m"),
            Err(_) => other.to_string(),
        },
    }
}

fn signal_line(signal: Signal) -> &'static str {
    match signal {
        Signal::Buy => "🟢 Buy Signal",
        Signal::Sell => "🔴 Sell Signal",
        Signal::Neutral => "⚪ No Signal",
    }
}

fn trend_label(trend: Trend) -> &'static str {
    match trend {
        Trend::Bullish => "✅ Bullish",
        Trend::Bearish => "🚨 Bearish",
    }
}

fn cross_label(cross: CrossSignal) -> &'static str {
    match cross {
        CrossSignal::GoldenCross => "✅ Golden Cross",
        CrossSignal::DeathCross => "🔻 Death Cross",
    }
}

/// Full report for a successful analysis.
pub fn format_recommendation(
    symbol: &str,
    interval: &str,
    config: &AnalysisConfig,
    rec: &Recommendation,
) -> String {
    let mut msg = String::new();
    let [fast, slow, signal] = config.macd_windows;

    // Writing into a String cannot fail.
    let _ = writeln!(msg, "🔍 {symbol} [{}]", interval_label(interval));
    let _ = writeln!(msg, "💰 Price: ${:.2}", rec.price);
    let _ = writeln!(msg, "📊 RSI({}): {:.2}", config.rsi_period, rec.rsi);
    let _ = writeln!(msg, "📈 EMA Trend: {}", trend_label(rec.trend.trend));
    let _ = writeln!(msg, "🪹 EMA Signal: {}", cross_label(rec.trend.cross));

    match rec.macd {
        Some(m) => {
            let _ = writeln!(msg, "📉 MACD({fast},{slow},{signal}) hist: {:.4}", m.histogram);
        }
        None => {
            let _ = writeln!(msg, "📉 MACD({fast},{slow},{signal}): n/a");
        }
    }
    match rec.stoch_rsi {
        Some(v) => {
            let _ = writeln!(msg, "🎚 Stoch RSI({}): {v:.2}", config.stoch_rsi_period);
        }
        None => {
            let _ = writeln!(msg, "🎚 Stoch RSI({}): n/a", config.stoch_rsi_period);
        }
    }
    match rec.volatility {
        Some(v) => {
            let _ = writeln!(
                msg,
                "🌊 ATR({}): {:.4} ({:.2}%, {} volatility)",
                config.atr_period, rec.atr, v.ratio_pct, v.tier
            );
        }
        None => {
            let _ = writeln!(msg, "🌊 ATR({}): {:.4}", config.atr_period, rec.atr);
        }
    }

    let _ = writeln!(msg, "🔯 Candle: {}", rec.pattern);
    let _ = writeln!(msg, "📌 Recommendation:");
    let _ = writeln!(msg, "{}", signal_line(rec.rsi_signal));
    let _ = writeln!(msg, "{}", signal_line(rec.cross_signal));
    let _ = write!(
        msg,
        "🧭 Verdict ({}): {} (score {:+})",
        rec.fusion.strategy, rec.fusion.signal, rec.fusion.score
    );

    msg
}

/// Degraded reply when only the last price is known.
pub fn format_price_only(symbol: &str, interval: &str, price: f64, reason: &str) -> String {
    format!(
        "🔍 {symbol} [{}]\n💰 Price: ${price:.2}\nℹ️ Indicators unavailable: {reason}",
        interval_label(interval)
    )
}

pub fn format_no_data(symbol: &str) -> String {
    format!("⚠️ No data available for {symbol}")
}

pub fn format_error(symbol: &str, error: &str) -> String {
    format!("⚠️ Error fetching {symbol}: {error}")
}
