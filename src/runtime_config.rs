// =============================================================================
// Runtime Configuration — service settings with atomic save
// =============================================================================
//
// Everything the service needs besides the analysis windows: where to listen,
// where to fetch klines from, and how many.  All fields carry serde defaults
// so that adding new fields never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::AnalysisConfig;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_bybit_base_url() -> String {
    "https://api.bybit.com".to_string()
}

fn default_kline_interval() -> String {
    "D".to_string()
}

fn default_kline_limit() -> u32 {
    200
}

fn default_fallback_kline_limit() -> u32 {
    50
}

fn default_quote_asset() -> String {
    "USDT".to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Socket address of the HTTP server.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Bybit REST base URL.
    #[serde(default = "default_bybit_base_url")]
    pub bybit_base_url: String,

    /// Kline interval in Bybit notation ("D", "240", "60", ...).
    #[serde(default = "default_kline_interval")]
    pub kline_interval: String,

    /// Bars requested per symbol.
    #[serde(default = "default_kline_limit")]
    pub kline_limit: u32,

    /// Bars requested on the retry when the first request returns nothing.
    #[serde(default = "default_fallback_kline_limit")]
    pub fallback_kline_limit: u32,

    /// Quote asset appended to bare tokens ("BTC" => "BTCUSDT").
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,

    /// Indicator windows and fusion policy.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            bybit_base_url: default_bybit_base_url(),
            kline_interval: default_kline_interval(),
            kline_limit: default_kline_limit(),
            fallback_kline_limit: default_fallback_kline_limit(),
            quote_asset: default_quote_asset(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            interval = %config.kline_interval,
            strategy = %config.analysis.fusion_strategy,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Apply `ANALYST_BIND_ADDR` / `BYBIT_BASE_URL` style overrides.
    ///
    /// `lookup` is `std::env::var` in production.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("ANALYST_BIND_ADDR").filter(|s| !s.trim().is_empty()) {
            self.bind_addr = addr.trim().to_string();
        }
        if let Some(url) = lookup("BYBIT_BASE_URL").filter(|s| !s.trim().is_empty()) {
            self.bybit_base_url = url.trim().trim_end_matches('/').to_string();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::FusionStrategyKind;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.bybit_base_url, "https://api.bybit.com");
        assert_eq!(cfg.kline_interval, "D");
        assert_eq!(cfg.kline_limit, 200);
        assert_eq!(cfg.fallback_kline_limit, 50);
        assert_eq!(cfg.quote_asset, "USDT");
        assert_eq!(cfg.analysis, AnalysisConfig::default());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.kline_limit, 200);
        assert_eq!(cfg.analysis.rsi_period, 14);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "kline_interval": "240", "analysis": { "fusion_strategy": "paired" } }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.kline_interval, "240");
        assert_eq!(cfg.analysis.fusion_strategy, FusionStrategyKind::Paired);
        assert_eq!(cfg.analysis.ma_windows, [50, 200]);
        assert_eq!(cfg.quote_asset, "USDT");
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("kline-analyst-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("runtime_config.json");

        let mut cfg = RuntimeConfig::default();
        cfg.kline_limit = 500;
        cfg.save(&path).unwrap();

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded.kline_limit, 500);
        assert!(!path.with_extension("json.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_missing_file_is_error() {
        assert!(RuntimeConfig::load("/definitely/not/here.json").is_err());
    }

    #[test]
    fn overrides_replace_and_trim() {
        let mut cfg = RuntimeConfig::default();
        cfg.apply_overrides(|key| match key {
            "ANALYST_BIND_ADDR" => Some("127.0.0.1:9000".to_string()),
            "BYBIT_BASE_URL" => Some("https://api-testnet.bybit.com/".to_string()),
            _ => None,
        });
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.bybit_base_url, "https://api-testnet.bybit.com");

        let mut cfg = RuntimeConfig::default();
        cfg.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
    }
}
