//! Account Deriver: deterministic program-derived addresses.
//!
//! Pure functions, no I/O. Derivations must stay byte-identical to the
//! on-chain programs'; a failure here means the engine's layout assumptions
//! have drifted from the deployed program and is treated as fatal by
//! callers.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::constants::{accounts, seeds};

/// A derivation failure is a programming or configuration defect, never a
/// transient condition; callers do not retry it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerivationError {
    /// No valid off-curve address exists for these seeds
    #[error("no program address found for {context}")]
    Unresolvable { context: String },

    /// A caller-supplied bump produced an invalid (on-curve) address
    #[error("bump {bump} does not derive a valid address for {context}")]
    InvalidBump { context: String, bump: u8 },
}

/// Derive `(address, bump)` for arbitrary seeds under `program_id`.
pub fn derive(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8), DerivationError> {
    Pubkey::try_find_program_address(seeds, program_id).ok_or_else(|| {
        DerivationError::Unresolvable {
            context: format!("program {program_id}"),
        }
    })
}

/// Re-derive an address from seeds plus a caller-supplied bump.
pub fn derive_with_bump(
    seeds: &[&[u8]],
    bump: u8,
    program_id: &Pubkey,
) -> Result<Pubkey, DerivationError> {
    let mut full: Vec<&[u8]> = seeds.to_vec();
    let bump_seed = [bump];
    full.push(&bump_seed);
    Pubkey::create_program_address(&full, program_id).map_err(|_| DerivationError::InvalidBump {
        context: format!("program {program_id}"),
        bump,
    })
}

/// Global state PDA of the market program.
pub fn global_state() -> Result<(Pubkey, u8), DerivationError> {
    derive(&[seeds::GLOBAL_SEED], &accounts::PUMP_PROGRAM)
}

/// Bonding curve PDA for a mint.
pub fn bonding_curve(mint: &Pubkey) -> Result<(Pubkey, u8), DerivationError> {
    derive(
        &[seeds::BONDING_CURVE_SEED, mint.as_ref()],
        &accounts::PUMP_PROGRAM,
    )
}

/// Mint authority PDA of the market program.
pub fn mint_authority() -> Result<(Pubkey, u8), DerivationError> {
    derive(&[seeds::MINT_AUTHORITY_SEED], &accounts::PUMP_PROGRAM)
}

/// Creator fee vault PDA for a curve creator.
pub fn creator_vault(creator: &Pubkey) -> Result<(Pubkey, u8), DerivationError> {
    derive(
        &[seeds::CREATOR_VAULT_SEED, creator.as_ref()],
        &accounts::PUMP_PROGRAM,
    )
}

/// Metaplex metadata PDA for a mint.
pub fn metadata(mint: &Pubkey) -> Result<(Pubkey, u8), DerivationError> {
    derive(
        &[
            seeds::METADATA_SEED,
            accounts::MPL_TOKEN_METADATA.as_ref(),
            mint.as_ref(),
        ],
        &accounts::MPL_TOKEN_METADATA,
    )
}

/// Associated token address for `owner`/`mint` under the associated-account
/// program. Same derivation algorithm, fixed seed shape.
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    spl_associated_token_account::get_associated_token_address(owner, mint)
}
