//! Builders for the market program's create / extend / buy / sell
//! instructions.
//!
//! Every account list below follows the deployed program's exact order.
//! Permuting it yields a transaction that is syntactically valid but
//! semantically wrong, so the orders are pinned by the tests at the bottom
//! of this file.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::constants::{accounts, discriminators};
use crate::pda;

use super::encode::{check_create_fields, encode_payload, BuyArgs, CreateArgs, SellArgs};
use super::errors::InstructionBuildError;

/// Caller-facing arguments of the `create` operation. The metadata URI is
/// expected to be already hosted; this engine performs no uploads.
#[derive(Debug, Clone)]
pub struct CreateTokenArgs {
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

/// Build the `create` instruction: mints the token and initializes its
/// bonding curve in one program call. The mint must co-sign.
pub fn build_create_instruction(
    creator: &Pubkey,
    mint: &Pubkey,
    args: &CreateTokenArgs,
) -> Result<Instruction, InstructionBuildError> {
    check_create_fields(&args.name, &args.symbol, &args.uri)?;

    let (bonding_curve, _) = pda::bonding_curve(mint)?;
    let (mint_authority, _) = pda::mint_authority()?;
    let (metadata, _) = pda::metadata(mint)?;
    let curve_vault = pda::associated_token_address(&bonding_curve, mint);

    let data = encode_payload(
        &discriminators::CREATE,
        &CreateArgs {
            name: args.name.clone(),
            symbol: args.symbol.clone(),
            uri: args.uri.clone(),
            creator: creator.to_bytes(),
        },
    )?;

    let account_metas = vec![
        AccountMeta::new(*mint, true),
        AccountMeta::new_readonly(mint_authority, false),
        AccountMeta::new(bonding_curve, false),
        AccountMeta::new(curve_vault, false),
        AccountMeta::new_readonly(accounts::GLOBAL_STATE, false),
        AccountMeta::new_readonly(accounts::MPL_TOKEN_METADATA, false),
        AccountMeta::new(metadata, false),
        AccountMeta::new(*creator, true),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(spl_associated_token_account::id(), false),
        AccountMeta::new_readonly(accounts::RENT, false),
        AccountMeta::new_readonly(accounts::EVENT_AUTHORITY, false),
        AccountMeta::new_readonly(accounts::PUMP_PROGRAM, false),
    ];

    Ok(Instruction {
        program_id: accounts::PUMP_PROGRAM,
        accounts: account_metas,
        data,
    })
}

/// Build the `extend_account` instruction, growing the curve account to
/// its current layout size. Discriminator only, no payload.
pub fn build_extend_account_instruction(
    mint: &Pubkey,
    user: &Pubkey,
) -> Result<Instruction, InstructionBuildError> {
    let (bonding_curve, _) = pda::bonding_curve(mint)?;

    let account_metas = vec![
        AccountMeta::new(bonding_curve, false),
        AccountMeta::new(*user, true),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(accounts::EVENT_AUTHORITY, false),
        AccountMeta::new_readonly(accounts::PUMP_PROGRAM, false),
    ];

    Ok(Instruction {
        program_id: accounts::PUMP_PROGRAM,
        accounts: account_metas,
        data: discriminators::EXTEND_ACCOUNT.to_vec(),
    })
}

/// Build the `buy` instruction. `amount` is the token quantity bought
/// (base units); `max_sol_cost` caps what the buyer pays (lamports).
pub fn build_buy_instruction(
    buyer: &Pubkey,
    mint: &Pubkey,
    curve_creator: &Pubkey,
    amount: u64,
    max_sol_cost: u64,
) -> Result<Instruction, InstructionBuildError> {
    let (bonding_curve, _) = pda::bonding_curve(mint)?;
    let (creator_vault, _) = pda::creator_vault(curve_creator)?;
    let curve_vault = pda::associated_token_address(&bonding_curve, mint);
    let buyer_ata = pda::associated_token_address(buyer, mint);

    let data = encode_payload(
        &discriminators::BUY,
        &BuyArgs {
            amount,
            max_sol_cost,
        },
    )?;

    let account_metas = vec![
        AccountMeta::new_readonly(accounts::GLOBAL_STATE, false),
        AccountMeta::new(accounts::FEE_RECIPIENT, false),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new(bonding_curve, false),
        AccountMeta::new(curve_vault, false),
        AccountMeta::new(buyer_ata, false),
        AccountMeta::new(*buyer, true),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new(creator_vault, false),
        AccountMeta::new_readonly(accounts::EVENT_AUTHORITY, false),
        AccountMeta::new_readonly(accounts::PUMP_PROGRAM, false),
    ];

    Ok(Instruction {
        program_id: accounts::PUMP_PROGRAM,
        accounts: account_metas,
        data,
    })
}

/// Build the `sell` instruction. `amount` is the token quantity sold
/// (base units); `min_sol_output` floors what the seller receives.
pub fn build_sell_instruction(
    seller: &Pubkey,
    mint: &Pubkey,
    curve_creator: &Pubkey,
    amount: u64,
    min_sol_output: u64,
) -> Result<Instruction, InstructionBuildError> {
    let (bonding_curve, _) = pda::bonding_curve(mint)?;
    let (creator_vault, _) = pda::creator_vault(curve_creator)?;
    let curve_vault = pda::associated_token_address(&bonding_curve, mint);
    let seller_ata = pda::associated_token_address(seller, mint);

    let data = encode_payload(
        &discriminators::SELL,
        &SellArgs {
            amount,
            min_sol_output,
        },
    )?;

    let account_metas = vec![
        AccountMeta::new_readonly(accounts::GLOBAL_STATE, false),
        AccountMeta::new(accounts::FEE_RECIPIENT, false),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new(bonding_curve, false),
        AccountMeta::new(curve_vault, false),
        AccountMeta::new(seller_ata, false),
        AccountMeta::new(*seller, true),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new(creator_vault, false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(accounts::EVENT_AUTHORITY, false),
        AccountMeta::new_readonly(accounts::PUMP_PROGRAM, false),
    ];

    Ok(Instruction {
        program_id: accounts::PUMP_PROGRAM,
        accounts: account_metas,
        data,
    })
}
