//! Error types for the vanity keypair subsystem.

use thiserror::Error;

/// Vanity search failures. Recoverable by the caller (shorter suffix,
/// retry, or falling back to a random address) - never retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VanityError {
    /// A search is already running on this subsystem instance; concurrent
    /// requests are rejected, not queued.
    #[error("a vanity search is already in progress")]
    SearchInProgress,

    /// The caller cancelled the search
    #[error("vanity search cancelled")]
    Cancelled,

    /// The per-worker attempt ceiling was reached without a match
    #[error("vanity search exhausted after {attempts} attempts")]
    Exhausted { attempts: u64 },

    /// The requested suffix can never match
    #[error("invalid vanity suffix: {0}")]
    InvalidSuffix(String),

    /// The pre-generated pool failed to load (degrades to empty)
    #[error("vanity pool load failed: {0}")]
    PoolLoad(String),

    /// A search worker panicked or was torn down mid-search
    #[error("vanity search worker failed: {0}")]
    Worker(String),
}

impl VanityError {
    pub fn is_retryable(&self) -> bool {
        false
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::SearchInProgress => "busy",
            Self::Cancelled => "cancelled",
            Self::Exhausted { .. } => "exhausted",
            Self::InvalidSuffix(_) => "validation",
            Self::PoolLoad(_) => "pool",
            Self::Worker(_) => "worker",
        }
    }
}
