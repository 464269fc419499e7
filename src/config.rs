//! Operator configuration
//!
//! Loaded once at startup from `config.toml` in the data directory (missing
//! file means defaults), with credentials taken from the environment so they
//! never land on disk:
//! - `GEMINI_API_KEY` — remote reasoning provider
//! - `ONE_INCH_API_KEY` — swap quote provider

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use crate::logger::{self, LogTag};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub collector: CollectorConfig,
    pub signals: SignalsConfig,
    pub swap: SwapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// CoinGecko coin ids tracked by the poll loop
    pub tracked_coins: Vec<String>,
    /// Seconds between poll ticks
    pub poll_interval_secs: u64,
    /// Seconds to wait after a rate-limit or fetch failure
    pub backoff_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalsConfig {
    /// How many recent samples feed one analysis request (12 ≈ 1h at
    /// 5-minute granularity)
    pub history_window: u32,
    /// Gemini model used for structured trend analysis
    pub model: String,
    /// Upper bound on the remote call, seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapConfig {
    /// EVM chain id for 1inch quotes (1 = Ethereum mainnet)
    pub chain_id: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collector: CollectorConfig::default(),
            signals: SignalsConfig::default(),
            swap: SwapConfig::default(),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            tracked_coins: vec![
                "bitcoin".to_string(),
                "ethereum".to_string(),
                "binancecoin".to_string(),
                "solana".to_string(),
                "cardano".to_string(),
            ],
            poll_interval_secs: 60,
            backoff_secs: 20,
        }
    }
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            history_window: 12,
            model: "gemini-flash-latest".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self { chain_id: 1 }
    }
}

impl Config {
    /// Load from a TOML file, falling back to defaults when the file is
    /// missing. A malformed file is an error, not a silent default.
    pub fn load_from_file(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        Ok(config)
    }
}

// =============================================================================
// GLOBAL ACCESS
// =============================================================================

static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

/// Install the loaded configuration. Call once at startup.
pub fn set_config(config: Config) {
    if let Ok(mut guard) = CONFIG.write() {
        *guard = config;
    }
}

/// Read access to the active configuration
pub fn with_config<T>(f: impl FnOnce(&Config) -> T) -> T {
    match CONFIG.read() {
        Ok(guard) => f(&guard),
        Err(poisoned) => f(&poisoned.into_inner()),
    }
}

/// Load config.toml from the data directory and install it
pub fn init() -> anyhow::Result<()> {
    let path = crate::paths::config_path();
    let config = Config::load_from_file(&path)?;
    logger::debug(
        LogTag::System,
        &format!(
            "Config loaded: {} tracked coins, poll every {}s",
            config.collector.tracked_coins.len(),
            config.collector.poll_interval_secs
        ),
    );
    set_config(config);
    Ok(())
}

// =============================================================================
// CREDENTIALS (environment only)
// =============================================================================

/// Remote reasoning provider credential
pub fn gemini_api_key() -> Option<String> {
    std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty())
}

/// Swap quote provider credential
pub fn oneinch_api_key() -> Option<String> {
    std::env::var("ONE_INCH_API_KEY").ok().filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.collector.tracked_coins.len(), 5);
        assert_eq!(config.collector.poll_interval_secs, 60);
        assert_eq!(config.signals.history_window, 12);
        assert_eq!(config.swap.chain_id, 1);
    }

    #[test]
    fn test_config_round_trip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[collector]"));
        assert!(toml_str.contains("[signals]"));
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.signals.model, config.signals.model);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: Config = toml::from_str("[collector]\npoll_interval_secs = 30\n").unwrap();
        assert_eq!(parsed.collector.poll_interval_secs, 30);
        assert_eq!(parsed.collector.backoff_secs, 20);
        assert_eq!(parsed.signals.history_window, 12);
    }
}
