//! Error types for instruction building.

use thiserror::Error;

use crate::pda::DerivationError;

/// Instruction-building failures. These are caller or configuration
/// defects - deterministic, never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstructionBuildError {
    /// A required PDA could not be derived; implies the engine's layout
    /// assumptions have drifted from the deployed program.
    #[error("account derivation failed: {0}")]
    InvalidAccountDerivation(#[from] DerivationError),

    /// A string field exceeds the program's fixed buffer for it
    #[error("{field} is {len} bytes encoded, program accepts at most {max}")]
    EncodingOverflow {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// Argument serialization failed
    #[error("argument encoding failed: {0}")]
    Encode(String),
}

impl InstructionBuildError {
    pub fn is_retryable(&self) -> bool {
        false
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidAccountDerivation(_) => "derivation",
            Self::EncodingOverflow { .. } => "encoding",
            Self::Encode(_) => "encoding",
        }
    }
}
