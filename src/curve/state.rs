//! Strongly-typed decoders for the on-chain account layouts this engine
//! reads.
//!
//! Layouts are fixed by the deployed programs. Decoding is done with
//! explicit little-endian offsets after validating both the 8-byte account
//! discriminator and the minimum buffer length; undersized or unknown
//! accounts are rejected rather than best-effort parsed.

use solana_sdk::pubkey::Pubkey;

use crate::constants::{discriminators, layout};

use super::errors::CurveError;

fn read_u64(data: &[u8], offset: usize) -> Result<u64, CurveError> {
    let bytes: [u8; 8] = data
        .get(offset..offset + 8)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| CurveError::layout(format!("u64 read out of bounds at {offset}")))?;
    Ok(u64::from_le_bytes(bytes))
}

fn read_pubkey(data: &[u8], offset: usize) -> Result<Pubkey, CurveError> {
    let bytes: [u8; 32] = data
        .get(offset..offset + 32)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| CurveError::layout(format!("pubkey read out of bounds at {offset}")))?;
    Ok(Pubkey::new_from_array(bytes))
}

fn check_discriminator(data: &[u8], expected: &[u8; 8], name: &str) -> Result<(), CurveError> {
    match data.get(..8) {
        Some(head) if head == expected => Ok(()),
        Some(head) => Err(CurveError::layout(format!(
            "{name}: discriminator mismatch (got {head:?})"
        ))),
        None => Err(CurveError::layout(format!(
            "{name}: account too short for discriminator ({} bytes)",
            data.len()
        ))),
    }
}

/// State of one bonding curve. Mutated only by the on-chain program; this
/// engine reads it to price trades and propose transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondingCurveState {
    pub virtual_token_reserves: u64,
    pub virtual_sol_reserves: u64,
    pub real_token_reserves: u64,
    pub real_sol_reserves: u64,
    pub token_total_supply: u64,
    pub complete: bool,
    pub creator: Pubkey,
}

impl BondingCurveState {
    /// Decode from a raw account blob.
    ///
    /// Enforces the open-curve invariant: virtual reserves must be strictly
    /// positive while `complete == false`.
    pub fn decode(data: &[u8]) -> Result<Self, CurveError> {
        check_discriminator(data, &discriminators::BONDING_CURVE_ACCOUNT, "bonding curve")?;
        if data.len() < layout::BONDING_CURVE_ACCOUNT_LEN {
            return Err(CurveError::layout(format!(
                "bonding curve: {} bytes, need at least {}",
                data.len(),
                layout::BONDING_CURVE_ACCOUNT_LEN
            )));
        }

        let state = Self {
            virtual_token_reserves: read_u64(data, 8)?,
            virtual_sol_reserves: read_u64(data, 16)?,
            real_token_reserves: read_u64(data, 24)?,
            real_sol_reserves: read_u64(data, 32)?,
            token_total_supply: read_u64(data, 40)?,
            complete: data[48] != 0,
            creator: read_pubkey(data, 49)?,
        };

        if !state.complete
            && (state.virtual_sol_reserves == 0 || state.virtual_token_reserves == 0)
        {
            return Err(CurveError::layout(
                "bonding curve: zero virtual reserves on an open curve",
            ));
        }

        Ok(state)
    }

    /// Total SOL reserves (virtual + real), lamports.
    pub fn total_sol_reserves(&self) -> u128 {
        self.virtual_sol_reserves as u128 + self.real_sol_reserves as u128
    }

    /// Total token reserves (virtual + real), base units.
    pub fn total_token_reserves(&self) -> u128 {
        self.virtual_token_reserves as u128 + self.real_token_reserves as u128
    }
}

/// Global state of the market program. Only the prefix this engine needs
/// is decoded; the deployed account carries trailing fields we ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalState {
    pub initialized: bool,
    pub authority: Pubkey,
    pub fee_recipient: Pubkey,
    pub initial_virtual_token_reserves: u64,
    pub initial_virtual_sol_reserves: u64,
    pub initial_real_token_reserves: u64,
    pub token_total_supply: u64,
    pub fee_basis_points: u64,
}

impl GlobalState {
    pub fn decode(data: &[u8]) -> Result<Self, CurveError> {
        check_discriminator(data, &discriminators::GLOBAL_ACCOUNT, "global state")?;
        if data.len() < layout::GLOBAL_ACCOUNT_MIN_LEN {
            return Err(CurveError::layout(format!(
                "global state: {} bytes, need at least {}",
                data.len(),
                layout::GLOBAL_ACCOUNT_MIN_LEN
            )));
        }

        Ok(Self {
            initialized: data[8] != 0,
            authority: read_pubkey(data, 9)?,
            fee_recipient: read_pubkey(data, 41)?,
            initial_virtual_token_reserves: read_u64(data, 73)?,
            initial_virtual_sol_reserves: read_u64(data, 81)?,
            initial_real_token_reserves: read_u64(data, 89)?,
            token_total_supply: read_u64(data, 97)?,
            fee_basis_points: read_u64(data, 105)?,
        })
    }

    /// Pricing state of a curve that has just been created and not yet
    /// traded, as the program initializes it from this global state.
    pub fn initial_curve(&self, creator: Pubkey) -> BondingCurveState {
        BondingCurveState {
            virtual_token_reserves: self.initial_virtual_token_reserves,
            virtual_sol_reserves: self.initial_virtual_sol_reserves,
            real_token_reserves: self.initial_real_token_reserves,
            real_sol_reserves: 0,
            token_total_supply: self.token_total_supply,
            complete: false,
            creator,
        }
    }
}

/// A graduated constant-product pool. Read-only; reserves live in the two
/// referenced token accounts, not in this account itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolState {
    pub pool_bump: u8,
    pub index: u16,
    pub creator: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub lp_mint: Pubkey,
    pub pool_base_token_account: Pubkey,
    pub pool_quote_token_account: Pubkey,
    pub lp_supply: u64,
    pub coin_creator: Pubkey,
}

impl PoolState {
    pub fn decode(data: &[u8]) -> Result<Self, CurveError> {
        check_discriminator(data, &discriminators::POOL_ACCOUNT, "pool")?;
        if data.len() < layout::POOL_ACCOUNT_LEN {
            return Err(CurveError::layout(format!(
                "pool: {} bytes, need at least {}",
                data.len(),
                layout::POOL_ACCOUNT_LEN
            )));
        }

        let index: [u8; 2] = data[9..11]
            .try_into()
            .map_err(|_| CurveError::layout("pool: index read out of bounds"))?;

        Ok(Self {
            pool_bump: data[8],
            index: u16::from_le_bytes(index),
            creator: read_pubkey(data, 11)?,
            base_mint: read_pubkey(data, 43)?,
            quote_mint: read_pubkey(data, 75)?,
            lp_mint: read_pubkey(data, 107)?,
            pool_base_token_account: read_pubkey(data, 139)?,
            pool_quote_token_account: read_pubkey(data, 171)?,
            lp_supply: read_u64(data, 203)?,
            coin_creator: read_pubkey(data, 211)?,
        })
    }
}

/// Balance of an SPL token account. Only the amount field is needed; the
/// full 165-byte layout is still required so truncated blobs are rejected.
pub fn decode_token_account_amount(data: &[u8]) -> Result<u64, CurveError> {
    if data.len() < layout::TOKEN_ACCOUNT_LEN {
        return Err(CurveError::layout(format!(
            "token account: {} bytes, need {}",
            data.len(),
            layout::TOKEN_ACCOUNT_LEN
        )));
    }
    read_u64(data, 64)
}
