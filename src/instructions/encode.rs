//! Payload encoding: 8-byte operation discriminator followed by
//! borsh-serialized argument structs.
//!
//! Borsh gives the exact wire shape the program expects - field order is
//! the struct's declaration order and strings carry a 4-byte little-endian
//! length prefix - without hand-counted offsets.

use borsh::BorshSerialize;

use crate::constants::layout;

use super::errors::InstructionBuildError;

/// Arguments of the `create` operation. Declaration order is the wire
/// order.
#[derive(BorshSerialize, Debug, Clone)]
pub(super) struct CreateArgs {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub creator: [u8; 32],
}

/// Arguments of the `buy` operation: token amount and the max SOL the
/// buyer will pay (slippage bound).
#[derive(BorshSerialize, Debug, Clone, Copy)]
pub(super) struct BuyArgs {
    pub amount: u64,
    pub max_sol_cost: u64,
}

/// Arguments of the `sell` operation: token amount and the minimum SOL the
/// seller accepts (slippage bound).
#[derive(BorshSerialize, Debug, Clone, Copy)]
pub(super) struct SellArgs {
    pub amount: u64,
    pub min_sol_output: u64,
}

/// Serialize `args` behind its operation discriminator.
pub(super) fn encode_payload<T: BorshSerialize>(
    discriminator: &[u8; 8],
    args: &T,
) -> Result<Vec<u8>, InstructionBuildError> {
    let mut data = discriminator.to_vec();
    args.serialize(&mut data)
        .map_err(|e| InstructionBuildError::Encode(e.to_string()))?;
    Ok(data)
}

/// Reject string fields longer than the program's fixed buffers before any
/// bytes are produced.
pub(super) fn check_field_len(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), InstructionBuildError> {
    let len = value.len();
    if len > max {
        return Err(InstructionBuildError::EncodingOverflow { field, len, max });
    }
    Ok(())
}

pub(super) fn check_create_fields(
    name: &str,
    symbol: &str,
    uri: &str,
) -> Result<(), InstructionBuildError> {
    check_field_len("name", name, layout::MAX_NAME_LEN)?;
    check_field_len("symbol", symbol, layout::MAX_SYMBOL_LEN)?;
    check_field_len("uri", uri, layout::MAX_URI_LEN)?;
    Ok(())
}
