use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::chain::ChainError;
use crate::curve::CurveError;
use crate::instructions::InstructionBuildError;
use crate::pda::DerivationError;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("curve error: {0}")]
    Curve(#[from] CurveError),

    #[error("instruction build error: {0}")]
    Build(#[from] InstructionBuildError),

    #[error("derivation error: {0}")]
    Derivation(#[from] DerivationError),

    #[error("no bonding curve found for mint {0}")]
    CurveNotFound(Pubkey),

    #[error("holder has no token account for mint {0}")]
    NoTokenBalance(Pubkey),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("invalid trade parameters: {0}")]
    InvalidParams(String),
}

impl OrchestratorError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Chain(e) => e.is_retryable(),
            _ => false,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::Chain(_) => "chain",
            Self::Curve(_) => "curve",
            Self::Build(_) | Self::Derivation(_) => "build",
            Self::CurveNotFound(_) | Self::NoTokenBalance(_) => "state",
            Self::Signing(_) => "signing",
            Self::InvalidParams(_) => "params",
        }
    }
}
