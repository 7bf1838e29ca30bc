//! Error types for the curve model and account decoders.

use thiserror::Error;

use super::model::TradeLimits;

/// Errors produced by curve valuation, validation and decoding.
///
/// Everything here is deterministic given its inputs, so nothing in this
/// enum is ever retried internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// Malformed caller input, rejected before any curve math
    #[error("invalid trade input: {0}")]
    Invalid(String),

    /// The curve has completed; trading must route through the graduated pool
    #[error("bonding curve is complete; route trade through the graduated pool")]
    CurveComplete,

    /// Requested amount exceeds the hard per-trade limit. Carries the
    /// computed limits so callers can offer a corrective action.
    #[error("requested {requested} exceeds max trade size {max} (impact {price_impact_pct:.2}%)")]
    ExceedsMaxTrade {
        requested: f64,
        max: f64,
        price_impact_pct: f64,
        limits: TradeLimits,
    },

    /// Account blob does not match the expected on-chain layout
    #[error("account layout error: {0}")]
    Layout(String),

    /// Arithmetic overflow or a division that cannot be performed
    #[error("curve math error: {0}")]
    Math(String),
}

impl CurveError {
    /// Curve errors are pure computation failures; none are retryable.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Error category for logging and observability.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "validation",
            Self::CurveComplete => "curve_state",
            Self::ExceedsMaxTrade { .. } => "curve_state",
            Self::Layout(_) => "layout",
            Self::Math(_) => "math",
        }
    }

    pub fn layout(reason: impl Into<String>) -> Self {
        Self::Layout(reason.into())
    }

    pub fn math(reason: impl Into<String>) -> Self {
        Self::Math(reason.into())
    }
}
