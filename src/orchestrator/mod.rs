//! Trade execution pipeline.
//!
//! `TradeOrchestrator` takes a trade intent (create, create-and-buy, buy,
//! sell), reads the on-chain state it needs, validates against the curve,
//! assembles a single transaction and submits it. One trade, one
//! transaction: the create-and-buy path packs the token creation and the
//! dev buy into the same atomic submission.

mod errors;
mod signer;

pub use errors::OrchestratorError;
pub use signer::{KeypairSigner, TransactionSigner};

use std::sync::Arc;
use std::time::Duration;

use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;
use spl_token::ID as TOKEN_PROGRAM_ID;
use tracing::{info, warn};

use crate::chain::{ChainError, ChainReader};
use crate::constants::{accounts, units};
use crate::curve::{
    self, decode_token_account_amount, BondingCurveState, CurveConfig, GlobalState,
};
use crate::instructions::{
    build_buy_instruction, build_create_instruction, build_extend_account_instruction,
    build_sell_instruction, CreateTokenArgs,
};
use crate::pda;
use crate::types::{SpeedTier, SubmissionStatus};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub compute_unit_limit: u32,
    /// Priority fee in micro-lamports per compute unit, per tier.
    pub cu_price_default: u64,
    pub cu_price_fast: u64,
    pub cu_price_turbo: u64,
    /// Optional flat validator tip appended as a plain transfer.
    pub tip_lamports: u64,
    pub tip_recipient: Option<Pubkey>,
    /// Base slippage before the price-impact step-up.
    pub base_slippage_bps: u16,
    /// How long to wait for submission before reporting the signature as
    /// unknown rather than failed.
    pub submit_timeout: Duration,
    pub curve: CurveConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            compute_unit_limit: 250_000,
            cu_price_default: 100_000,
            cu_price_fast: 500_000,
            cu_price_turbo: 2_000_000,
            tip_lamports: 0,
            tip_recipient: None,
            base_slippage_bps: 500,
            submit_timeout: Duration::from_secs(30),
            curve: CurveConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    fn cu_price(&self, tier: SpeedTier) -> u64 {
        match tier {
            SpeedTier::Default => self.cu_price_default,
            SpeedTier::Fast => self.cu_price_fast,
            SpeedTier::Turbo => self.cu_price_turbo,
        }
    }
}

/// Outcome of a trade submission, with the quote the transaction encoded.
#[derive(Debug)]
pub struct TradeOutcome {
    pub status: SubmissionStatus,
    pub mint: Pubkey,
    /// Token base units bought or sold; zero for a bare create.
    pub token_amount: u64,
    /// Lamport bound encoded into the instruction (max cost on buys, min
    /// output on sells).
    pub lamports_bound: u64,
}

pub struct TradeOrchestrator {
    chain: Arc<dyn ChainReader>,
    signer: Arc<dyn TransactionSigner>,
    config: OrchestratorConfig,
}

impl TradeOrchestrator {
    pub fn new(
        chain: Arc<dyn ChainReader>,
        signer: Arc<dyn TransactionSigner>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            chain,
            signer,
            config,
        }
    }

    /// Create a token with no initial position.
    pub async fn create_token(
        &self,
        mint: &Keypair,
        args: &CreateTokenArgs,
        tier: SpeedTier,
    ) -> Result<TradeOutcome, OrchestratorError> {
        let payer = self.signer.pubkey();
        let mint_pub = mint.pubkey();

        let mut ixs = self.budget_instructions(tier);
        self.push_tip(&mut ixs);
        ixs.push(build_create_instruction(&payer, &mint_pub, args)?);
        ixs.push(build_extend_account_instruction(&mint_pub, &payer)?);

        let status = self.sign_and_submit(ixs, &payer, Some(mint)).await?;
        info!(mint = %mint_pub, sig = %status.signature(), "token created");
        Ok(TradeOutcome {
            status,
            mint: mint_pub,
            token_amount: 0,
            lamports_bound: 0,
        })
    }

    /// Create a token and buy into it atomically. The buy is quoted
    /// against the curve's initial reserves since the curve does not exist
    /// until this transaction lands.
    pub async fn create_and_buy(
        &self,
        mint: &Keypair,
        args: &CreateTokenArgs,
        buy_sol: f64,
        tier: SpeedTier,
    ) -> Result<TradeOutcome, OrchestratorError> {
        let payer = self.signer.pubkey();
        let mint_pub = mint.pubkey();

        let global = self.fetch_global().await?;
        let state = global.initial_curve(payer);
        let validation = curve::validate_buy_amount(&state, &self.config.curve, buy_sol)?;
        if let Some(w) = &validation.warning {
            warn!(requested = w.requested, recommended = w.recommended, "buy above recommended size");
        }

        let sol_in = sol_to_lamports(buy_sol)?;
        let tokens_out = curve::quote_buy(&state, sol_in, global.fee_basis_points)?;
        let slippage = curve::recommended_slippage_bps(
            validation.limits.price_impact_pct,
            self.config.base_slippage_bps,
        );
        let max_cost = curve::max_sol_cost(sol_in, slippage);

        let mut ixs = self.budget_instructions(tier);
        self.push_tip(&mut ixs);
        ixs.push(build_create_instruction(&payer, &mint_pub, args)?);
        ixs.push(build_extend_account_instruction(&mint_pub, &payer)?);
        ixs.push(create_associated_token_account_idempotent(
            &payer,
            &payer,
            &mint_pub,
            &TOKEN_PROGRAM_ID,
        ));
        // On a fresh curve the creator is the payer itself
        ixs.push(build_buy_instruction(
            &payer, &mint_pub, &payer, tokens_out, max_cost,
        )?);

        let status = self.sign_and_submit(ixs, &payer, Some(mint)).await?;
        info!(mint = %mint_pub, sig = %status.signature(), tokens_out, "token created with dev buy");
        Ok(TradeOutcome {
            status,
            mint: mint_pub,
            token_amount: tokens_out,
            lamports_bound: max_cost,
        })
    }

    /// Buy `sol_amount` SOL worth of an existing curve token.
    pub async fn buy(
        &self,
        mint: &Pubkey,
        sol_amount: f64,
        tier: SpeedTier,
    ) -> Result<TradeOutcome, OrchestratorError> {
        let payer = self.signer.pubkey();

        let global = self.fetch_global().await?;
        let state = self.fetch_curve(mint).await?;
        let validation = curve::validate_buy_amount(&state, &self.config.curve, sol_amount)?;
        if let Some(w) = &validation.warning {
            warn!(requested = w.requested, recommended = w.recommended, "buy above recommended size");
        }

        let sol_in = sol_to_lamports(sol_amount)?;
        let tokens_out = curve::quote_buy(&state, sol_in, global.fee_basis_points)?;
        let slippage = curve::recommended_slippage_bps(
            validation.limits.price_impact_pct,
            self.config.base_slippage_bps,
        );
        let max_cost = curve::max_sol_cost(sol_in, slippage);

        let mut ixs = self.budget_instructions(tier);
        self.push_tip(&mut ixs);
        ixs.push(create_associated_token_account_idempotent(
            &payer,
            &payer,
            mint,
            &TOKEN_PROGRAM_ID,
        ));
        ixs.push(build_buy_instruction(
            &payer,
            mint,
            &state.creator,
            tokens_out,
            max_cost,
        )?);

        let status = self.sign_and_submit(ixs, &payer, None).await?;
        info!(mint = %mint, sig = %status.signature(), tokens_out, "buy submitted");
        Ok(TradeOutcome {
            status,
            mint: *mint,
            token_amount: tokens_out,
            lamports_bound: max_cost,
        })
    }

    /// Sell `amount` token base units, or the holder's entire balance when
    /// `amount` is `None`.
    pub async fn sell(
        &self,
        mint: &Pubkey,
        amount: Option<u64>,
        tier: SpeedTier,
    ) -> Result<TradeOutcome, OrchestratorError> {
        let payer = self.signer.pubkey();

        let global = self.fetch_global().await?;
        let state = self.fetch_curve(mint).await?;

        let tokens_in = match amount {
            Some(v) => v,
            None => self.holder_balance(&payer, mint).await?,
        };
        if tokens_in == 0 {
            return Err(OrchestratorError::InvalidParams(
                "nothing to sell".to_string(),
            ));
        }

        let whole_tokens = tokens_in as f64 / units::TOKEN_BASE_UNITS as f64;
        let validation = curve::validate_sell_amount(&state, &self.config.curve, whole_tokens)?;
        if let Some(w) = &validation.warning {
            warn!(requested = w.requested, recommended = w.recommended, "sell above recommended size");
        }

        let sol_out = curve::quote_sell(&state, tokens_in, global.fee_basis_points)?;
        let slippage = curve::recommended_slippage_bps(
            validation.limits.price_impact_pct,
            self.config.base_slippage_bps,
        );
        let min_out = curve::min_sol_output(sol_out, slippage);

        let mut ixs = self.budget_instructions(tier);
        self.push_tip(&mut ixs);
        ixs.push(build_sell_instruction(
            &payer,
            mint,
            &state.creator,
            tokens_in,
            min_out,
        )?);

        let status = self.sign_and_submit(ixs, &payer, None).await?;
        info!(mint = %mint, sig = %status.signature(), tokens_in, "sell submitted");
        Ok(TradeOutcome {
            status,
            mint: *mint,
            token_amount: tokens_in,
            lamports_bound: min_out,
        })
    }

    pub async fn fetch_curve(&self, mint: &Pubkey) -> Result<BondingCurveState, OrchestratorError> {
        let (address, _) = pda::bonding_curve(mint)?;
        let account = match self.chain.get_account(&address).await {
            Ok(account) => account,
            Err(ChainError::AccountNotFound(_)) => {
                return Err(OrchestratorError::CurveNotFound(*mint))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(BondingCurveState::decode(&account.data)?)
    }

    pub async fn fetch_global(&self) -> Result<GlobalState, OrchestratorError> {
        let account = self.chain.get_account(&accounts::GLOBAL_STATE).await?;
        Ok(GlobalState::decode(&account.data)?)
    }

    async fn holder_balance(
        &self,
        holder: &Pubkey,
        mint: &Pubkey,
    ) -> Result<u64, OrchestratorError> {
        let ata = pda::associated_token_address(holder, mint);
        let account = match self.chain.get_account(&ata).await {
            Ok(account) => account,
            Err(ChainError::AccountNotFound(_)) => {
                return Err(OrchestratorError::NoTokenBalance(*mint))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(decode_token_account_amount(&account.data)?)
    }

    /// Priority-fee instructions for the requested tier. The default tier
    /// rides the network's base fee with no compute budget overrides.
    fn budget_instructions(&self, tier: SpeedTier) -> Vec<Instruction> {
        if tier == SpeedTier::Default {
            return Vec::new();
        }
        vec![
            ComputeBudgetInstruction::set_compute_unit_limit(self.config.compute_unit_limit),
            ComputeBudgetInstruction::set_compute_unit_price(self.config.cu_price(tier)),
        ]
    }

    fn push_tip(&self, ixs: &mut Vec<Instruction>) {
        if self.config.tip_lamports > 0 {
            if let Some(recipient) = self.config.tip_recipient {
                ixs.push(system_instruction::transfer(
                    &self.signer.pubkey(),
                    &recipient,
                    self.config.tip_lamports,
                ));
            }
        }
    }

    async fn sign_and_submit(
        &self,
        ixs: Vec<Instruction>,
        payer: &Pubkey,
        mint: Option<&Keypair>,
    ) -> Result<SubmissionStatus, OrchestratorError> {
        let blockhash = self.chain.get_latest_blockhash().await?;

        let mut tx = Transaction::new_with_payer(&ixs, Some(payer));
        if let Some(mint) = mint {
            tx.try_partial_sign(&[mint], blockhash)
                .map_err(|e| OrchestratorError::Signing(e.to_string()))?;
        }
        self.signer.sign(&mut tx, blockhash)?;

        match tokio::time::timeout(self.config.submit_timeout, self.chain.send_transaction(&tx))
            .await
        {
            Ok(Ok(signature)) => Ok(SubmissionStatus::Submitted(signature)),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                // The transaction may still land; surface the signature so
                // the caller can poll for it.
                let signature = *tx
                    .signatures
                    .first()
                    .ok_or_else(|| OrchestratorError::Signing("unsigned transaction".into()))?;
                warn!(sig = %signature, "submission timed out, outcome unknown");
                Ok(SubmissionStatus::Unknown(signature))
            }
        }
    }
}

fn sol_to_lamports(sol: f64) -> Result<u64, OrchestratorError> {
    if !sol.is_finite() || sol < 0.0 {
        return Err(OrchestratorError::InvalidParams(format!(
            "SOL amount must be a non-negative finite number, got {sol}"
        )));
    }
    let lamports = sol * units::LAMPORTS_PER_SOL as f64;
    if lamports > u64::MAX as f64 {
        return Err(OrchestratorError::InvalidParams(format!(
            "SOL amount {sol} overflows lamports"
        )));
    }
    Ok(lamports as u64)
}
