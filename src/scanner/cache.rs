//! Single-flight TTL cache.
//!
//! The slot mutex is held across the refresh future, so when N callers
//! race on a stale cache exactly one performs the refresh and the rest
//! block on the lock and read its result. Time is injected through
//! `Clock` so tests can age the cache without sleeping.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests.
pub struct ManualClock {
    now: parking_lot::Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: parking_lot::Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

struct Slot<T> {
    value: T,
    refreshed_at: Instant,
}

pub struct ViewCache<T> {
    slot: Mutex<Option<Slot<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> ViewCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
            clock,
        }
    }

    /// Return the cached value, refreshing first when it is absent or
    /// older than the TTL. Concurrent callers on a stale cache trigger at
    /// most one `refresh` call.
    pub async fn get_or_refresh<E, F, Fut>(&self, refresh: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(existing) = slot.as_ref() {
            if self.clock.now().duration_since(existing.refreshed_at) <= self.ttl {
                return Ok(existing.value.clone());
            }
        }

        let value = refresh().await?;
        *slot = Some(Slot {
            value: value.clone(),
            refreshed_at: self.clock.now(),
        });
        Ok(value)
    }

    /// Cached value regardless of age, if one exists.
    pub async fn peek(&self) -> Option<T> {
        let slot = self.slot.lock().await;
        slot.as_ref().map(|s| s.value.clone())
    }

    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}
