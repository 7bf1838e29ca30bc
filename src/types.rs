//! Shared domain types used across subsystems.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Where a token currently trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Venue {
    /// Pre-graduation: priced by the bonding curve at this address
    Curve(Pubkey),
    /// Post-graduation: priced by the constant-product pool at this address
    Pool(Pubkey),
}

impl Venue {
    pub fn is_graduated(&self) -> bool {
        matches!(self, Venue::Pool(_))
    }
}

/// Denormalized, cache-only view of a token. Rebuilt every refresh cycle
/// from chain state; the chain stays authoritative.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub mint: Pubkey,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub creator: Pubkey,
    pub created_at: DateTime<Utc>,
    /// Spot price in SOL per whole token
    pub price_sol: f64,
    /// Market cap (price x total token reserves), in SOL
    pub market_cap_sol: f64,
    /// Real SOL locked in the venue, in SOL
    pub liquidity_sol: f64,
    /// Estimated traded volume over the sampling window, in SOL
    pub volume_sol: f64,
    /// Price change over the sampling window, percent
    pub price_change_pct: f64,
    pub venue: Venue,
    /// True once the token trades on the graduated pool
    pub is_pump_swap: bool,
}

/// Fee-priority tier attached to outgoing transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeedTier {
    #[default]
    Default,
    Fast,
    Turbo,
}

/// Outcome of a transaction submission attempt.
///
/// `Unknown` is deliberate: a submit that timed out may still land, so the
/// orchestrator never reports it as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Accepted by the node. Says nothing about confirmation.
    Submitted(solana_sdk::signature::Signature),
    /// Submitted but not acknowledged within the caller's timeout
    Unknown(solana_sdk::signature::Signature),
}

impl SubmissionStatus {
    pub fn signature(&self) -> &solana_sdk::signature::Signature {
        match self {
            SubmissionStatus::Submitted(sig) | SubmissionStatus::Unknown(sig) => sig,
        }
    }
}

/// Classification updates emitted by the scanner for UI subscribers.
/// Delivery is at-least-once; ordering across tiers is not guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenEvent {
    Created { mint: Pubkey },
    /// Market cap entered the watch band below the graduation threshold
    Graduating { mint: Pubkey },
    Graduated { mint: Pubkey },
}
