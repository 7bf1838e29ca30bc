//! Configuration loading from TOML files with environment overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::curve::CurveConfig;
use crate::orchestrator::OrchestratorConfig;
use crate::scanner::{ClassifierConfig, ScannerConfig};
use crate::vanity::{GrinderConfig, VanityConfig};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RPC endpoint configuration
    pub rpc: RpcConfig,

    /// Fee payer wallet
    pub wallet: WalletConfig,

    /// Trade sizing, fees and submission
    #[serde(default)]
    pub trading: TradingConfig,

    /// Vanity mint address supply
    #[serde(default)]
    pub vanity: VanitySection,

    /// Token discovery and classification
    #[serde(default)]
    pub scanner: ScannerSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// RPC endpoint URL
    pub endpoint: String,

    /// Max attempts per read before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial retry backoff in milliseconds
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Backoff ceiling in milliseconds
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Path to the fee payer keypair file
    pub keypair_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Base slippage tolerance (basis points), scaled up with price impact
    #[serde(default = "default_base_slippage")]
    pub base_slippage_bps: u16,

    /// Compute unit limit on priority-fee transactions
    #[serde(default = "default_cu_limit")]
    pub compute_unit_limit: u32,

    /// Priority fee per tier, micro-lamports per compute unit
    #[serde(default = "default_cu_price_default")]
    pub cu_price_default: u64,
    #[serde(default = "default_cu_price_fast")]
    pub cu_price_fast: u64,
    #[serde(default = "default_cu_price_turbo")]
    pub cu_price_turbo: u64,

    /// Flat relay tip in lamports; zero disables the tip transfer
    #[serde(default)]
    pub tip_lamports: u64,

    /// Tip recipient address, required when tip_lamports > 0
    #[serde(default)]
    pub tip_recipient: Option<String>,

    /// Submission timeout in seconds before the outcome is reported unknown
    #[serde(default = "default_submit_timeout")]
    pub submit_timeout_secs: u64,

    /// Fraction of a virtual reserve a single trade may move
    #[serde(default = "default_trade_fraction")]
    pub trade_fraction: f64,

    /// Margin applied to the hard limit for the recommended size
    #[serde(default = "default_safety_margin")]
    pub safety_margin: f64,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            base_slippage_bps: default_base_slippage(),
            compute_unit_limit: default_cu_limit(),
            cu_price_default: default_cu_price_default(),
            cu_price_fast: default_cu_price_fast(),
            cu_price_turbo: default_cu_price_turbo(),
            tip_lamports: 0,
            tip_recipient: None,
            submit_timeout_secs: default_submit_timeout(),
            trade_fraction: default_trade_fraction(),
            safety_margin: default_safety_margin(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VanitySection {
    /// Prefer vanity mint addresses over random ones
    #[serde(default)]
    pub enabled: bool,

    /// Target base58 suffix, matched case-insensitively
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Path to a pre-generated keypair pool file
    #[serde(default)]
    pub pool_path: Option<String>,

    /// Seconds to wait for the pool to load before falling through
    #[serde(default = "default_pool_load_timeout")]
    pub pool_load_timeout_secs: u64,

    /// Grind on demand when the pool is exhausted
    #[serde(default = "default_true")]
    pub grind_fallback: bool,

    /// Parallel grind workers
    #[serde(default = "default_grind_workers")]
    pub grind_workers: usize,

    /// Total grind attempts before Exhausted
    #[serde(default = "default_grind_max_attempts")]
    pub grind_max_attempts: u64,
}

impl Default for VanitySection {
    fn default() -> Self {
        Self {
            enabled: false,
            suffix: default_suffix(),
            pool_path: None,
            pool_load_timeout_secs: default_pool_load_timeout(),
            grind_fallback: default_true(),
            grind_workers: default_grind_workers(),
            grind_max_attempts: default_grind_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerSection {
    /// Snapshot TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Sampling window behind volume and momentum, seconds
    #[serde(default = "default_window_span")]
    pub window_span_secs: u64,

    /// Recent program signatures pulled per refresh
    #[serde(default = "default_signature_scan_limit")]
    pub signature_scan_limit: usize,

    /// Entries per served view
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Market cap (SOL) entering the graduating watch band
    #[serde(default = "default_watch_threshold")]
    pub watch_threshold_sol: f64,

    /// Market cap (SOL) at which the curve completes
    #[serde(default = "default_graduation_threshold")]
    pub graduation_threshold_sol: f64,
}

impl Default for ScannerSection {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            window_span_secs: default_window_span(),
            signature_scan_limit: default_signature_scan_limit(),
            top_n: default_top_n(),
            watch_threshold_sol: default_watch_threshold(),
            graduation_threshold_sol: default_graduation_threshold(),
        }
    }
}

// Default value functions
fn default_max_attempts() -> u32 { 4 }
fn default_backoff_base_ms() -> u64 { 200 }
fn default_backoff_max_ms() -> u64 { 5_000 }
fn default_base_slippage() -> u16 { 500 }
fn default_cu_limit() -> u32 { 250_000 }
fn default_cu_price_default() -> u64 { 100_000 }
fn default_cu_price_fast() -> u64 { 500_000 }
fn default_cu_price_turbo() -> u64 { 2_000_000 }
fn default_submit_timeout() -> u64 { 30 }
fn default_trade_fraction() -> f64 { 0.12 }
fn default_safety_margin() -> f64 { 0.90 }
fn default_suffix() -> String { "pump".to_string() }
fn default_pool_load_timeout() -> u64 { 10 }
fn default_grind_workers() -> usize { 4 }
fn default_grind_max_attempts() -> u64 { 50_000_000 }
fn default_cache_ttl() -> u64 { 30 }
fn default_window_span() -> u64 { 300 }
fn default_signature_scan_limit() -> usize { 100 }
fn default_top_n() -> usize { 50 }
fn default_watch_threshold() -> f64 { 200.0 }
fn default_graduation_threshold() -> f64 { 340.0 }
fn default_true() -> bool { true }

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after sourcing a .env file, so `${VAR}`-style
    /// expansion in the shell and env-declared overrides both work
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_file(path)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rpc.endpoint.is_empty() {
            anyhow::bail!("rpc.endpoint must not be empty");
        }
        if !(0.0..=1.0).contains(&self.trading.trade_fraction) {
            anyhow::bail!(
                "trading.trade_fraction must be in 0..=1, got {}",
                self.trading.trade_fraction
            );
        }
        if !(0.0..=1.0).contains(&self.trading.safety_margin) {
            anyhow::bail!(
                "trading.safety_margin must be in 0..=1, got {}",
                self.trading.safety_margin
            );
        }
        if self.trading.tip_lamports > 0 && self.trading.tip_recipient.is_none() {
            anyhow::bail!("trading.tip_recipient is required when tip_lamports > 0");
        }
        if let Some(recipient) = &self.trading.tip_recipient {
            recipient
                .parse::<Pubkey>()
                .map_err(|e| anyhow::anyhow!("trading.tip_recipient: {e}"))?;
        }
        if self.scanner.watch_threshold_sol >= self.scanner.graduation_threshold_sol {
            anyhow::bail!(
                "scanner.watch_threshold_sol must be below graduation_threshold_sol"
            );
        }
        Ok(())
    }

    pub fn orchestrator_config(&self) -> anyhow::Result<OrchestratorConfig> {
        let tip_recipient = self
            .trading
            .tip_recipient
            .as_ref()
            .map(|s| s.parse::<Pubkey>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("trading.tip_recipient: {e}"))?;
        Ok(OrchestratorConfig {
            compute_unit_limit: self.trading.compute_unit_limit,
            cu_price_default: self.trading.cu_price_default,
            cu_price_fast: self.trading.cu_price_fast,
            cu_price_turbo: self.trading.cu_price_turbo,
            tip_lamports: self.trading.tip_lamports,
            tip_recipient,
            base_slippage_bps: self.trading.base_slippage_bps,
            submit_timeout: Duration::from_secs(self.trading.submit_timeout_secs),
            curve: CurveConfig {
                trade_fraction: self.trading.trade_fraction,
                safety_margin: self.trading.safety_margin,
            },
        })
    }

    pub fn vanity_config(&self) -> VanityConfig {
        VanityConfig {
            enabled: self.vanity.enabled,
            suffix: self.vanity.suffix.clone(),
            grind_fallback: self.vanity.grind_fallback,
            pool_load_timeout: Duration::from_secs(self.vanity.pool_load_timeout_secs),
            grinder: GrinderConfig {
                workers: self.vanity.grind_workers,
                max_attempts: self.vanity.grind_max_attempts,
                ..GrinderConfig::default()
            },
        }
    }

    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            cache_ttl: Duration::from_secs(self.scanner.cache_ttl_secs),
            window_span: Duration::from_secs(self.scanner.window_span_secs),
            signature_scan_limit: self.scanner.signature_scan_limit,
            classifier: ClassifierConfig {
                top_n: self.scanner.top_n,
                watch_threshold_sol: self.scanner.watch_threshold_sol,
                graduation_threshold_sol: self.scanner.graduation_threshold_sol,
            },
            ..ScannerConfig::default()
        }
    }
}
