//! Vanity mint address supply.
//!
//! Three tiers: a pre-generated pool, an on-demand grinder, and plain
//! random keypairs as the last resort. `VanityService` walks them in
//! that order, so callers always get a mint keypair even when neither
//! vanity source can deliver one.

mod errors;
mod grinder;
mod pool;

pub use errors::VanityError;
pub use grinder::{GrindProgress, GrinderConfig, VanityGrinder};
pub use pool::VanityPool;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use solana_sdk::signature::Keypair;
use tracing::{debug, warn};

/// A keypair whose address carries the requested suffix.
#[derive(Debug)]
pub struct VanityKeypair {
    pub keypair: Keypair,
    pub suffix: String,
}

/// Where a mint keypair came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintSource {
    Pool,
    Grinder,
    Random,
}

pub struct MintKeypair {
    pub keypair: Keypair,
    pub source: MintSource,
}

#[derive(Debug, Clone)]
pub struct VanityConfig {
    pub enabled: bool,
    pub suffix: String,
    /// Grind on demand when the pool is exhausted.
    pub grind_fallback: bool,
    pub pool_load_timeout: Duration,
    pub grinder: GrinderConfig,
}

impl Default for VanityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            suffix: "pump".to_string(),
            grind_fallback: true,
            pool_load_timeout: Duration::from_secs(10),
            grinder: GrinderConfig::default(),
        }
    }
}

pub struct VanityService {
    config: VanityConfig,
    pool: Option<VanityPool>,
    grinder: VanityGrinder,
}

impl VanityService {
    pub fn new(config: VanityConfig, pool: Option<VanityPool>) -> Self {
        let grinder = VanityGrinder::new(config.grinder.clone());
        Self {
            config,
            pool,
            grinder,
        }
    }

    /// Produce a mint keypair, preferring pool over grinder over random.
    /// Never fails: every vanity miss degrades to the next tier.
    pub async fn next_mint(&self, cancel: Arc<AtomicBool>) -> MintKeypair {
        if !self.config.enabled {
            return MintKeypair {
                keypair: Keypair::new(),
                source: MintSource::Random,
            };
        }

        if let Some(pool) = &self.pool {
            pool.wait_for_loaded(self.config.pool_load_timeout).await;
            if let Some(hit) = pool.acquire().await {
                debug!(suffix = %hit.suffix, "mint keypair drawn from pool");
                return MintKeypair {
                    keypair: hit.keypair,
                    source: MintSource::Pool,
                };
            }
        }

        if self.config.grind_fallback {
            match self.grinder.grind(&self.config.suffix, cancel, None).await {
                Ok(hit) => {
                    return MintKeypair {
                        keypair: hit.keypair,
                        source: MintSource::Grinder,
                    };
                }
                Err(e) => {
                    warn!(error = %e, "vanity grind failed, using random mint");
                }
            }
        }

        MintKeypair {
            keypair: Keypair::new(),
            source: MintSource::Random,
        }
    }
}
