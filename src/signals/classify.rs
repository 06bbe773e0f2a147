// =============================================================================
// Indicator value -> categorical signal
// =============================================================================
//
//   RSI        < 30 => Buy,  > 70 => Sell, else Neutral
//   Cross      golden => Buy, death => Sell        (never neutral)
//   MACD hist  > 0 => Buy, else Sell                (never neutral)
//   StochRSI   < 20 => Buy,  > 80 => Sell, else Neutral

use crate::types::{CrossSignal, Signal};

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const STOCH_RSI_OVERSOLD: f64 = 20.0;
pub const STOCH_RSI_OVERBOUGHT: f64 = 80.0;

pub fn rsi_signal(rsi: f64) -> Signal {
    band_signal(rsi, RSI_OVERSOLD, RSI_OVERBOUGHT)
}

pub fn stoch_rsi_signal(stoch_rsi: f64) -> Signal {
    band_signal(stoch_rsi, STOCH_RSI_OVERSOLD, STOCH_RSI_OVERBOUGHT)
}

pub fn cross_signal(cross: CrossSignal) -> Signal {
    match cross {
        CrossSignal::GoldenCross => Signal::Buy,
        CrossSignal::DeathCross => Signal::Sell,
    }
}

pub fn macd_signal(histogram: f64) -> Signal {
    if histogram > 0.0 {
        Signal::Buy
    } else {
        Signal::Sell
    }
}

fn band_signal(value: f64, oversold: f64, overbought: f64) -> Signal {
    if value < oversold {
        Signal::Buy
    } else if value > overbought {
        Signal::Sell
    } else {
        Signal::Neutral
    }
}
