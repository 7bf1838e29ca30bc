use thiserror::Error;

use crate::chain::ChainError;
use crate::curve::CurveError;
use crate::pda::DerivationError;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("decode error: {0}")]
    Decode(#[from] CurveError),

    #[error("derivation error: {0}")]
    Derivation(#[from] DerivationError),
}

impl ScannerError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Chain(e) => e.is_retryable(),
            Self::Decode(_) | Self::Derivation(_) => false,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::Chain(_) => "chain",
            Self::Decode(_) => "decode",
            Self::Derivation(_) => "derivation",
        }
    }
}
