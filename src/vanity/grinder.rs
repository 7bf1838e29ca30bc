//! On-demand vanity address grinding.
//!
//! Keypair derivation is pure CPU work, so search workers run on the
//! blocking pool while an async supervisor aggregates results. Only one
//! search runs at a time; a second call while one is in flight returns
//! `SearchInProgress` instead of queueing.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use solana_sdk::signature::{keypair_from_seed, Keypair, Signer};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::errors::VanityError;
use super::VanityKeypair;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchState {
    Idle,
    Searching,
}

/// Progress snapshot emitted periodically while a search runs.
#[derive(Debug, Clone, Copy)]
pub struct GrindProgress {
    pub attempts: u64,
}

#[derive(Debug, Clone)]
pub struct GrinderConfig {
    /// Parallel workers on the blocking pool.
    pub workers: usize,
    /// Total attempts across all workers before giving up.
    pub max_attempts: u64,
    /// How often workers re-check the shared stop flags.
    pub check_interval: u64,
}

impl Default for GrinderConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_attempts: 50_000_000,
            check_interval: 4_096,
        }
    }
}

pub struct VanityGrinder {
    config: GrinderConfig,
    state: Arc<Mutex<SearchState>>,
}

impl VanityGrinder {
    pub fn new(config: GrinderConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(SearchState::Idle)),
        }
    }

    /// Search for a keypair whose base58 address ends with `suffix`
    /// (case-insensitive). `cancel` is polled cooperatively; a cancelled
    /// search settles within one check interval per worker.
    ///
    /// Outcome precedence when flags race: cancellation wins over a find,
    /// a find wins over exhaustion.
    pub async fn grind(
        &self,
        suffix: &str,
        cancel: Arc<AtomicBool>,
        progress: Option<mpsc::Sender<GrindProgress>>,
    ) -> Result<VanityKeypair, VanityError> {
        validate_suffix(suffix)?;

        {
            let mut state = self.state.lock();
            if *state == SearchState::Searching {
                return Err(VanityError::SearchInProgress);
            }
            *state = SearchState::Searching;
        }
        let state = Arc::clone(&self.state);
        let _reset = scopeguard::guard(state, |state| {
            *state.lock() = SearchState::Idle;
        });

        let found = Arc::new(AtomicBool::new(false));
        let attempts = Arc::new(AtomicU64::new(0));
        let needle = suffix.to_ascii_lowercase();
        let per_worker = self.config.max_attempts.div_ceil(self.config.workers as u64);

        let mut handles = Vec::with_capacity(self.config.workers);
        for _ in 0..self.config.workers {
            let needle = needle.clone();
            let cancel = Arc::clone(&cancel);
            let found = Arc::clone(&found);
            let attempts = Arc::clone(&attempts);
            let check_interval = self.config.check_interval;
            handles.push(tokio::task::spawn_blocking(move || {
                grind_worker(&needle, per_worker, check_interval, &cancel, &found, &attempts)
            }));
        }

        let reporter = progress.map(|tx| {
            let attempts = Arc::clone(&attempts);
            let done = Arc::clone(&found);
            let cancel = Arc::clone(&cancel);
            tokio::spawn(async move {
                let mut tick = tokio::time::interval(Duration::from_secs(1));
                loop {
                    tick.tick().await;
                    if done.load(Ordering::Relaxed) || cancel.load(Ordering::Relaxed) {
                        break;
                    }
                    let snapshot = GrindProgress {
                        attempts: attempts.load(Ordering::Relaxed),
                    };
                    if tx.send(snapshot).await.is_err() {
                        break;
                    }
                }
            })
        });

        let mut hit: Option<Keypair> = None;
        let mut worker_failure: Option<VanityError> = None;
        for handle in handles {
            match handle.await {
                Ok(Some(keypair)) => {
                    hit.get_or_insert(keypair);
                }
                Ok(None) => {}
                Err(e) => {
                    worker_failure.get_or_insert(VanityError::Worker(e.to_string()));
                }
            }
        }
        if let Some(reporter) = reporter {
            reporter.abort();
        }

        let total = attempts.load(Ordering::Relaxed);
        if cancel.load(Ordering::Relaxed) {
            debug!(attempts = total, "vanity search cancelled");
            return Err(VanityError::Cancelled);
        }
        match hit {
            Some(keypair) => {
                info!(address = %keypair.pubkey(), attempts = total, "vanity search hit");
                Ok(VanityKeypair {
                    keypair,
                    suffix: suffix.to_string(),
                })
            }
            None => match worker_failure {
                Some(failure) => Err(failure),
                None => Err(VanityError::Exhausted { attempts: total }),
            },
        }
    }
}

fn validate_suffix(suffix: &str) -> Result<(), VanityError> {
    if suffix.is_empty() || suffix.len() > 6 {
        return Err(VanityError::InvalidSuffix(format!(
            "suffix length must be 1..=6, got {}",
            suffix.len()
        )));
    }
    if let Err(e) = bs58::decode(suffix).into_vec() {
        return Err(VanityError::InvalidSuffix(e.to_string()));
    }
    Ok(())
}

fn grind_worker(
    needle: &str,
    budget: u64,
    check_interval: u64,
    cancel: &AtomicBool,
    found: &AtomicBool,
    attempts: &AtomicU64,
) -> Option<Keypair> {
    let mut rng = StdRng::from_entropy();
    let mut seed = [0u8; 32];
    let mut done = 0u64;
    while done < budget {
        if done % check_interval == 0
            && (cancel.load(Ordering::Relaxed) || found.load(Ordering::Relaxed))
        {
            return None;
        }
        rng.fill_bytes(&mut seed);
        done += 1;
        attempts.fetch_add(1, Ordering::Relaxed);

        let Ok(keypair) = keypair_from_seed(&seed) else {
            continue;
        };
        if keypair
            .pubkey()
            .to_string()
            .to_ascii_lowercase()
            .ends_with(needle)
        {
            found.store(true, Ordering::Relaxed);
            return Some(keypair);
        }
    }
    None
}
