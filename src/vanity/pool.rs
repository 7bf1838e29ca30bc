//! Pre-generated vanity keypair pool.
//!
//! The pool file is a JSON array of 64-byte keypair arrays (the standard
//! CLI keypair format, one per entry). Loading happens in the background;
//! callers can bound how long they wait for it. A load failure degrades
//! the pool to empty instead of failing the caller - the grinder is the
//! fallback, not an error path.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use solana_sdk::signature::{Keypair, Signer};
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use super::VanityKeypair;

pub struct VanityPool {
    entries: Arc<Mutex<Vec<Keypair>>>,
    suffix: String,
    loaded: watch::Receiver<bool>,
}

impl VanityPool {
    /// Start loading `path` in the background and return immediately.
    pub fn spawn_load(path: PathBuf, suffix: String) -> Self {
        let entries = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = watch::channel(false);

        let task_entries = Arc::clone(&entries);
        let task_suffix = suffix.clone();
        tokio::spawn(async move {
            match load_keypairs(&path, &task_suffix).await {
                Ok(keypairs) => {
                    let count = keypairs.len();
                    *task_entries.lock().await = keypairs;
                    info!(count, suffix = %task_suffix, "vanity pool loaded");
                }
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "vanity pool load failed, pool stays empty");
                }
            }
            let _ = tx.send(true);
        });

        Self {
            entries,
            suffix,
            loaded: rx,
        }
    }

    /// Build a pool directly from keypairs. Entries not matching `suffix`
    /// are dropped.
    pub fn from_keypairs(keypairs: Vec<Keypair>, suffix: String) -> Self {
        let matching: Vec<Keypair> = keypairs
            .into_iter()
            .filter(|kp| matches_suffix(kp, &suffix))
            .collect();
        let (tx, rx) = watch::channel(true);
        drop(tx);
        Self {
            entries: Arc::new(Mutex::new(matching)),
            suffix,
            loaded: rx,
        }
    }

    /// Wait until the background load settles, up to `timeout`. Returns
    /// whether the pool finished loading in time.
    pub async fn wait_for_loaded(&self, timeout: Duration) -> bool {
        let mut rx = self.loaded.clone();
        if *rx.borrow() {
            return true;
        }
        tokio::time::timeout(timeout, async {
            while !*rx.borrow_and_update() {
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .is_ok()
    }

    /// Pop one keypair. Each entry is consumable exactly once; `None`
    /// signals exhaustion, telling the caller to fall back to the grinder.
    pub async fn acquire(&self) -> Option<VanityKeypair> {
        let keypair = self.entries.lock().await.pop()?;
        Some(VanityKeypair {
            keypair,
            suffix: self.suffix.clone(),
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn matches_suffix(keypair: &Keypair, suffix: &str) -> bool {
    keypair
        .pubkey()
        .to_string()
        .to_ascii_lowercase()
        .ends_with(&suffix.to_ascii_lowercase())
}

async fn load_keypairs(path: &PathBuf, suffix: &str) -> anyhow::Result<Vec<Keypair>> {
    let raw = tokio::fs::read(path).await?;
    let arrays: Vec<Vec<u8>> = serde_json::from_slice(&raw)?;

    let mut keypairs = Vec::with_capacity(arrays.len());
    for (index, bytes) in arrays.into_iter().enumerate() {
        if bytes.len() != 64 {
            anyhow::bail!("entry {index}: expected 64 bytes, got {}", bytes.len());
        }
        let keypair = Keypair::try_from(bytes.as_slice())
            .map_err(|e| anyhow::anyhow!("entry {index}: {e}"))?;
        if matches_suffix(&keypair, suffix) {
            keypairs.push(keypair);
        } else {
            warn!(index, "pool entry does not match configured suffix, skipping");
        }
    }
    Ok(keypairs)
}
