//! Per-mint observation windows and record assembly.
//!
//! Volume and price change are heuristics over a bounded window of
//! reserve snapshots taken at refresh cadence, not a replay of the
//! ledger. Creation time is the first-seen stamp: the instant this
//! scanner first observed the mint.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use solana_sdk::pubkey::Pubkey;

use crate::constants::units;
use crate::curve::{self, BondingCurveState, CurveError};
use crate::types::{TokenRecord, Venue};

#[derive(Debug, Clone, Copy)]
struct MintSample {
    at: Instant,
    price_sol: f64,
    real_sol_lamports: u64,
}

#[derive(Debug)]
struct MintWindow {
    first_seen: DateTime<Utc>,
    samples: VecDeque<MintSample>,
}

/// Momentum stats derived from a mint's observation window.
#[derive(Debug, Clone, Copy)]
pub struct WindowStats {
    pub created_at: DateTime<Utc>,
    pub volume_sol: f64,
    pub price_change_pct: f64,
    /// True the first time this mint is observed.
    pub newly_seen: bool,
}

pub struct TrackedMints {
    windows: DashMap<Pubkey, MintWindow>,
    window_span: Duration,
    max_samples: usize,
}

impl TrackedMints {
    pub fn new(window_span: Duration, max_samples: usize) -> Self {
        Self {
            windows: DashMap::new(),
            window_span,
            max_samples,
        }
    }

    /// Record one observation for `mint` and return stats over the
    /// retained window.
    pub fn observe(
        &self,
        mint: Pubkey,
        at: Instant,
        wall: DateTime<Utc>,
        price_sol: f64,
        real_sol_lamports: u64,
    ) -> WindowStats {
        let mut entry = self.windows.entry(mint).or_insert_with(|| MintWindow {
            first_seen: wall,
            samples: VecDeque::new(),
        });
        let newly_seen = entry.samples.is_empty();

        entry.samples.push_back(MintSample {
            at,
            price_sol,
            real_sol_lamports,
        });
        let horizon = at.checked_sub(self.window_span);
        while entry.samples.len() > self.max_samples
            || entry
                .samples
                .front()
                .zip(horizon)
                .map_or(false, |(s, h)| s.at < h)
        {
            entry.samples.pop_front();
        }

        // Volume proxy: total absolute SOL-reserve movement across samples
        let mut volume_lamports = 0u64;
        for pair in entry.samples.iter().zip(entry.samples.iter().skip(1)) {
            volume_lamports = volume_lamports
                .saturating_add(pair.1.real_sol_lamports.abs_diff(pair.0.real_sol_lamports));
        }

        let price_change_pct = match (entry.samples.front(), entry.samples.back()) {
            (Some(first), Some(last)) if first.price_sol > 0.0 => {
                (last.price_sol - first.price_sol) / first.price_sol * 100.0
            }
            _ => 0.0,
        };

        WindowStats {
            created_at: entry.first_seen,
            volume_sol: volume_lamports as f64 / units::LAMPORTS_PER_SOL as f64,
            price_change_pct,
            newly_seen,
        }
    }

    pub fn forget(&self, mint: &Pubkey) {
        self.windows.remove(mint);
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Assemble a record for a token still on its bonding curve.
pub fn curve_record(
    mint: Pubkey,
    state: &BondingCurveState,
    stats: &WindowStats,
    name: Option<String>,
    symbol: Option<String>,
    curve_address: Pubkey,
) -> Result<TokenRecord, CurveError> {
    Ok(TokenRecord {
        mint,
        name,
        symbol,
        creator: state.creator,
        created_at: stats.created_at,
        price_sol: curve::price_sol(state)?,
        market_cap_sol: curve::market_cap_sol(state)?,
        liquidity_sol: curve::liquidity_sol(state),
        volume_sol: stats.volume_sol,
        price_change_pct: stats.price_change_pct,
        venue: Venue::Curve(curve_address),
        is_pump_swap: false,
    })
}

/// Assemble a record for a graduated token trading on its pool.
#[allow(clippy::too_many_arguments)]
pub fn pool_record(
    mint: Pubkey,
    creator: Pubkey,
    pool_address: Pubkey,
    base_amount: u64,
    quote_lamports: u64,
    stats: &WindowStats,
    name: Option<String>,
    symbol: Option<String>,
) -> Result<TokenRecord, CurveError> {
    let price_sol = curve::pool_price_sol(base_amount, quote_lamports)?;
    let base_tokens = base_amount as f64 / units::TOKEN_BASE_UNITS as f64;
    Ok(TokenRecord {
        mint,
        name,
        symbol,
        creator,
        created_at: stats.created_at,
        price_sol,
        market_cap_sol: price_sol * base_tokens,
        liquidity_sol: quote_lamports as f64 / units::LAMPORTS_PER_SOL as f64,
        volume_sol: stats.volume_sol,
        price_change_pct: stats.price_change_pct,
        venue: Venue::Pool(pool_address),
        is_pump_swap: true,
    })
}

/// Best-effort decode of a token-metadata account's name and symbol. The
/// layout is key byte, update authority, mint, then length-prefixed
/// strings padded with NULs up to their declared length. Anything
/// malformed yields `None` rather than an error; metadata is cosmetic.
pub fn decode_metadata_strings(data: &[u8]) -> (Option<String>, Option<String>) {
    const STRINGS_OFFSET: usize = 1 + 32 + 32;

    fn read_string(data: &[u8], offset: usize) -> Option<(String, usize)> {
        let len_bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
        let len = u32::from_le_bytes(len_bytes) as usize;
        let raw = data.get(offset + 4..offset + 4 + len)?;
        let text = std::str::from_utf8(raw)
            .ok()?
            .trim_end_matches('\0')
            .trim()
            .to_string();
        Some((text, offset + 4 + len))
    }

    let Some((name, after_name)) = read_string(data, STRINGS_OFFSET) else {
        return (None, None);
    };
    let symbol = read_string(data, after_name).map(|(s, _)| s);

    let to_opt = |s: String| (!s.is_empty()).then_some(s);
    (to_opt(name), symbol.and_then(to_opt))
}
