//! Ledger scanning and token classification.
//!
//! `TokenDirectory` rebuilds a snapshot of tracked tokens on a TTL
//! cadence: recent program signatures seed the working set with newly
//! active mints, a size-filtered scan supplies the curve accounts, and
//! the graduated-pool accounts cover tokens past the curve. The three
//! served views (trending, recent, graduating) classify that snapshot;
//! a reader hitting a stale cache pays for exactly one refresh.

pub mod cache;
pub mod classifier;
pub mod errors;
pub mod records;

pub use cache::{Clock, ManualClock, SystemClock, ViewCache};
pub use classifier::{ClassifierConfig, GraduatingEntry};
pub use errors::ScannerError;
pub use records::TrackedMints;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use solana_sdk::pubkey::Pubkey;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::chain::{ChainReader, SignatureRecord};
use crate::constants::{accounts, layout};
use crate::curve::{self, BondingCurveState, PoolState};
use crate::pda;
use crate::types::{TokenEvent, TokenRecord};

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub cache_ttl: Duration,
    /// Span of the per-mint sampling window behind volume and momentum.
    pub window_span: Duration,
    pub max_samples: usize,
    /// How many recent program signatures to pull per refresh.
    pub signature_scan_limit: usize,
    pub classifier: ClassifierConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(30),
            window_span: Duration::from_secs(300),
            max_samples: 32,
            signature_scan_limit: 100,
            classifier: ClassifierConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Curve,
    Graduating,
    Graduated,
}

pub struct TokenDirectory {
    chain: Arc<dyn ChainReader>,
    config: ScannerConfig,
    clock: Arc<dyn Clock>,
    tracked: TrackedMints,
    watchlist: parking_lot::RwLock<HashSet<Pubkey>>,
    seen_signatures: parking_lot::RwLock<HashSet<String>>,
    stages: DashMap<Pubkey, Stage>,
    snapshot: ViewCache<Arc<Vec<TokenRecord>>>,
    events: broadcast::Sender<TokenEvent>,
}

impl TokenDirectory {
    pub fn new(chain: Arc<dyn ChainReader>, config: ScannerConfig, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(256);
        let snapshot = ViewCache::new(config.cache_ttl, Arc::clone(&clock));
        let tracked = TrackedMints::new(config.window_span, config.max_samples);
        Self {
            chain,
            config,
            clock,
            tracked,
            watchlist: parking_lot::RwLock::new(HashSet::new()),
            seen_signatures: parking_lot::RwLock::new(HashSet::new()),
            stages: DashMap::new(),
            snapshot,
            events,
        }
    }

    /// Add a mint to the working set. Idempotent.
    pub fn track_mint(&self, mint: Pubkey) {
        self.watchlist.write().insert(mint);
    }

    pub fn untrack_mint(&self, mint: &Pubkey) {
        self.watchlist.write().remove(mint);
        self.tracked.forget(mint);
        self.stages.remove(mint);
    }

    pub fn tracked_count(&self) -> usize {
        self.watchlist.read().len()
    }

    /// Classification update feed. At-least-once delivery; slow consumers
    /// lose the oldest events.
    pub fn subscribe(&self) -> broadcast::Receiver<TokenEvent> {
        self.events.subscribe()
    }

    pub async fn trending(&self) -> Result<Vec<TokenRecord>, ScannerError> {
        let snapshot = self.current_snapshot().await?;
        Ok(classifier::trending(&snapshot, &self.config.classifier))
    }

    pub async fn recent(&self) -> Result<Vec<TokenRecord>, ScannerError> {
        let snapshot = self.current_snapshot().await?;
        Ok(classifier::recent(&snapshot, &self.config.classifier))
    }

    pub async fn graduating(&self) -> Result<Vec<GraduatingEntry>, ScannerError> {
        let snapshot = self.current_snapshot().await?;
        Ok(classifier::graduating(
            &snapshot,
            &self.config.classifier,
            self.config.window_span,
        ))
    }

    /// Drop the cached snapshot so the next view request rescans.
    pub async fn invalidate(&self) {
        self.snapshot.invalidate().await;
    }

    async fn current_snapshot(&self) -> Result<Arc<Vec<TokenRecord>>, ScannerError> {
        self.snapshot
            .get_or_refresh(|| async { self.rebuild_snapshot().await.map(Arc::new) })
            .await
    }

    async fn rebuild_snapshot(&self) -> Result<Vec<TokenRecord>, ScannerError> {
        let signatures = self
            .chain
            .get_recent_signatures(&accounts::PUMP_PROGRAM, self.config.signature_scan_limit)
            .await?;
        debug!(count = signatures.len(), "program activity scan");
        self.discover_from_signatures(&signatures).await;

        let mints: Vec<Pubkey> = self.watchlist.read().iter().copied().collect();
        if mints.is_empty() {
            return Ok(Vec::new());
        }

        let curve_accounts: HashMap<Pubkey, Vec<u8>> = self
            .chain
            .get_program_accounts_by_size(
                &accounts::PUMP_PROGRAM,
                layout::BONDING_CURVE_ACCOUNT_LEN as u64,
            )
            .await?
            .into_iter()
            .map(|(address, account)| (address, account.data))
            .collect();

        let pools_by_mint: HashMap<Pubkey, (Pubkey, PoolState)> = self
            .chain
            .get_program_accounts_by_size(
                &accounts::PUMP_AMM_PROGRAM,
                layout::POOL_ACCOUNT_LEN as u64,
            )
            .await?
            .into_iter()
            .filter_map(|(address, account)| {
                PoolState::decode(&account.data)
                    .map(|pool| (pool.base_mint, (address, pool)))
                    .ok()
            })
            .collect();

        let mut out = Vec::with_capacity(mints.len());
        for mint in mints {
            match self
                .build_record(&mint, &curve_accounts, &pools_by_mint)
                .await
            {
                Ok(Some(record)) => out.push(record),
                Ok(None) => {}
                Err(e) => warn!(mint = %mint, error = %e, "skipping mint this cycle"),
            }
        }
        Ok(out)
    }

    /// Grow the working set from recent program activity. Every program
    /// instruction references both the mint and its bonding-curve PDA, so
    /// a key whose derived curve address is also in the transaction's key
    /// list is a mint.
    async fn discover_from_signatures(&self, signatures: &[SignatureRecord]) {
        for record in signatures {
            if record.err {
                continue;
            }
            if !self.seen_signatures.write().insert(record.signature.clone()) {
                continue;
            }
            let keys = match self.chain.get_transaction_accounts(&record.signature).await {
                Ok(keys) => keys,
                Err(e) => {
                    debug!(signature = %record.signature, error = %e, "transaction fetch failed");
                    // retry this signature next cycle
                    self.seen_signatures.write().remove(&record.signature);
                    continue;
                }
            };
            for key in &keys {
                if self.watchlist.read().contains(key) {
                    continue;
                }
                let Ok((curve_address, _)) = pda::bonding_curve(key) else {
                    continue;
                };
                if keys.contains(&curve_address) {
                    debug!(mint = %key, "discovered mint from program activity");
                    self.watchlist.write().insert(*key);
                }
            }
        }

        // The scan only ever returns the newest signatures, so anything
        // no longer in it will not come back.
        let current: HashSet<&str> =
            signatures.iter().map(|r| r.signature.as_str()).collect();
        self.seen_signatures
            .write()
            .retain(|s| current.contains(s.as_str()));
    }

    async fn build_record(
        &self,
        mint: &Pubkey,
        curve_accounts: &HashMap<Pubkey, Vec<u8>>,
        pools_by_mint: &HashMap<Pubkey, (Pubkey, PoolState)>,
    ) -> Result<Option<TokenRecord>, ScannerError> {
        let (name, symbol) = self.fetch_metadata(mint).await;

        if let Some((pool_address, pool)) = pools_by_mint.get(mint) {
            let base = self
                .chain
                .get_account(&pool.pool_base_token_account)
                .await?;
            let quote = self
                .chain
                .get_account(&pool.pool_quote_token_account)
                .await?;
            let base_amount = curve::decode_token_account_amount(&base.data)?;
            let quote_lamports = curve::decode_token_account_amount(&quote.data)?;

            let price = curve::pool_price_sol(base_amount, quote_lamports)?;
            let stats = self.tracked.observe(
                *mint,
                self.clock.now(),
                Utc::now(),
                price,
                quote_lamports,
            );
            self.transition(*mint, Stage::Graduated);

            let record = records::pool_record(
                *mint,
                pool.coin_creator,
                *pool_address,
                base_amount,
                quote_lamports,
                &stats,
                name,
                symbol,
            )?;
            return Ok(Some(record));
        }

        let (curve_address, _) = pda::bonding_curve(mint)?;
        let Some(data) = curve_accounts.get(&curve_address) else {
            debug!(mint = %mint, "no curve account yet");
            return Ok(None);
        };
        let state = BondingCurveState::decode(data)?;
        if state.complete {
            // Curve done, pool not visible yet. Announce and wait for the
            // pool to show up next cycle.
            self.transition(*mint, Stage::Graduated);
            return Ok(None);
        }

        let price = curve::price_sol(&state)?;
        let stats = self.tracked.observe(
            *mint,
            self.clock.now(),
            Utc::now(),
            price,
            state.real_sol_reserves,
        );
        if stats.newly_seen {
            let _ = self.events.send(TokenEvent::Created { mint: *mint });
        }

        let record = records::curve_record(*mint, &state, &stats, name, symbol, curve_address)?;
        if record.market_cap_sol > self.config.classifier.watch_threshold_sol
            && record.market_cap_sol < self.config.classifier.graduation_threshold_sol
        {
            self.transition(*mint, Stage::Graduating);
        }
        Ok(Some(record))
    }

    async fn fetch_metadata(&self, mint: &Pubkey) -> (Option<String>, Option<String>) {
        let Ok((metadata, _)) = pda::metadata(mint) else {
            return (None, None);
        };
        match self.chain.get_account(&metadata).await {
            Ok(account) => records::decode_metadata_strings(&account.data),
            Err(_) => (None, None),
        }
    }

    /// Emit the event for a forward stage change; repeat observations of
    /// the same stage stay silent.
    fn transition(&self, mint: Pubkey, next: Stage) {
        let previous = self.stages.insert(mint, next);
        if previous == Some(next) {
            return;
        }
        let event = match next {
            Stage::Curve => return,
            Stage::Graduating => TokenEvent::Graduating { mint },
            Stage::Graduated => TokenEvent::Graduated { mint },
        };
        let _ = self.events.send(event);
    }
}
