//! Pure classification of token records into the served views.
//!
//! No I/O and no shared state: every function maps an input slice to a
//! fresh ordering, so classifying the same snapshot twice yields the
//! same result.

use std::cmp::Ordering;
use std::time::Duration;

use crate::types::TokenRecord;

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub top_n: usize,
    /// Market cap (SOL) at which a token enters the graduating watch band.
    pub watch_threshold_sol: f64,
    /// Market cap (SOL) at which the curve completes and the token moves
    /// to the pool.
    pub graduation_threshold_sol: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            top_n: 50,
            watch_threshold_sol: 200.0,
            graduation_threshold_sol: 340.0,
        }
    }
}

/// A token approaching graduation, annotated with how close it is and a
/// rough time-to-graduation extrapolated from window momentum.
#[derive(Debug, Clone)]
pub struct GraduatingEntry {
    pub record: TokenRecord,
    /// Position inside the watch band, 0 at the watch threshold and 100
    /// at graduation.
    pub progress_pct: f64,
    /// Linear extrapolation of recent market-cap growth; `None` when the
    /// token is flat, shrinking, or growing too slowly to extrapolate.
    pub eta: Option<Duration>,
}

fn by_f64_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Top-N by traded volume, ties broken by market cap.
pub fn trending(records: &[TokenRecord], config: &ClassifierConfig) -> Vec<TokenRecord> {
    let mut out: Vec<TokenRecord> = records.to_vec();
    out.sort_by(|a, b| {
        by_f64_desc(a.volume_sol, b.volume_sol)
            .then_with(|| by_f64_desc(a.market_cap_sol, b.market_cap_sol))
    });
    out.truncate(config.top_n);
    out
}

/// Top-N by creation time, newest first. Ties broken by mint so the
/// ordering is total.
pub fn recent(records: &[TokenRecord], config: &ClassifierConfig) -> Vec<TokenRecord> {
    let mut out: Vec<TokenRecord> = records.to_vec();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.mint.cmp(&b.mint)));
    out.truncate(config.top_n);
    out
}

/// Tokens whose market cap sits strictly inside the watch band, closest
/// to graduation first. Graduated tokens are excluded; they are past the
/// band, not in it.
pub fn graduating(
    records: &[TokenRecord],
    config: &ClassifierConfig,
    window_span: Duration,
) -> Vec<GraduatingEntry> {
    let band = config.graduation_threshold_sol - config.watch_threshold_sol;
    let mut out: Vec<GraduatingEntry> = records
        .iter()
        .filter(|r| {
            !r.is_pump_swap
                && r.market_cap_sol > config.watch_threshold_sol
                && r.market_cap_sol < config.graduation_threshold_sol
        })
        .map(|r| {
            let progress_pct = if band > 0.0 {
                (r.market_cap_sol - config.watch_threshold_sol) / band * 100.0
            } else {
                0.0
            };
            GraduatingEntry {
                eta: estimate_eta(r, config.graduation_threshold_sol, window_span),
                progress_pct,
                record: r.clone(),
            }
        })
        .collect();
    out.sort_by(|a, b| by_f64_desc(a.record.market_cap_sol, b.record.market_cap_sol));
    out.truncate(config.top_n);
    out
}

fn estimate_eta(
    record: &TokenRecord,
    graduation_threshold_sol: f64,
    window_span: Duration,
) -> Option<Duration> {
    if record.price_change_pct <= 0.0 || window_span.is_zero() {
        return None;
    }
    // Market cap scales linearly with price, so window price growth is
    // window market-cap growth.
    let growth_sol = record.market_cap_sol * record.price_change_pct / 100.0;
    let growth_per_sec = growth_sol / window_span.as_secs_f64();
    if growth_per_sec <= 0.0 {
        return None;
    }
    let remaining = graduation_threshold_sol - record.market_cap_sol;
    if remaining <= 0.0 {
        return Some(Duration::ZERO);
    }
    // A vanishingly small growth rate extrapolates to an ETA beyond
    // Duration's range; treat that the same as no momentum.
    Duration::try_from_secs_f64(remaining / growth_per_sec).ok()
}
