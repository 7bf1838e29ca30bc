//! Valuation and trade-limit math over bonding-curve reserves.
//!
//! All quoting is done in integer lamports / token base units with u128
//! intermediates; f64 appears only at the reporting edge (prices, market
//! caps and limits expressed in whole SOL / whole tokens).

use serde::Serialize;

use crate::constants::units::{LAMPORTS_PER_SOL, TOKEN_BASE_UNITS};

use super::errors::CurveError;
use super::state::BondingCurveState;

/// Tunables of the limit model. Defaults mirror the deployed program's
/// per-trade price-move bound and the safety margin the original client
/// applied on top of it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CurveConfig {
    /// Fraction of virtual reserves a single trade may consume
    pub trade_fraction: f64,
    /// Recommended limit as a fraction of the hard limit
    pub safety_margin: f64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            trade_fraction: 0.12,
            safety_margin: 0.90,
        }
    }
}

/// Per-request trade limits. Ephemeral: computed fresh from the current
/// curve state and never cached, since reserves move trade-by-trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeLimits {
    /// Hard buy limit, SOL
    pub max_buy_sol: f64,
    /// Hard sell limit, whole tokens
    pub max_sell_tokens: f64,
    /// Safety-margined buy limit, SOL
    pub recommended_buy_sol: f64,
    /// Safety-margined sell limit, whole tokens
    pub recommended_sell_tokens: f64,
    /// Real SOL locked in the curve
    pub liquidity_sol: f64,
    /// Impact of the requested trade, percent of the relevant virtual reserve
    pub price_impact_pct: f64,
}

/// Soft-failure tier: the trade fits under the hard limit but exceeds the
/// recommended one, so it may fail if reserves drift before confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeWarning {
    pub requested: f64,
    pub recommended: f64,
}

/// Successful validation outcome - limits plus an optional warning the
/// caller must explicitly acknowledge to proceed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeValidation {
    pub limits: TradeLimits,
    pub warning: Option<TradeWarning>,
}

fn lamports_to_sol(lamports: u128) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

fn base_units_to_tokens(units: u128) -> f64 {
    units as f64 / TOKEN_BASE_UNITS as f64
}

/// Spot price in SOL per whole token: total SOL reserves over total token
/// reserves (virtual + real), normalized to chain scales.
pub fn price_sol(state: &BondingCurveState) -> Result<f64, CurveError> {
    let tokens = state.total_token_reserves();
    if tokens == 0 {
        return Err(CurveError::math("zero total token reserves"));
    }
    Ok(lamports_to_sol(state.total_sol_reserves()) / base_units_to_tokens(tokens))
}

/// Canonical market cap: `price x total token reserves`, in SOL.
pub fn market_cap_sol(state: &BondingCurveState) -> Result<f64, CurveError> {
    let price = price_sol(state)?;
    Ok(price * base_units_to_tokens(state.total_token_reserves()))
}

/// Fast early-stage approximation: `2 x virtual SOL reserves`. Cheaper
/// than [`market_cap_sol`] and close to it while the curve is young; the
/// graduating classifier measures proximity against thresholds expressed
/// in the same approximation, never mixing the two forms.
pub fn market_cap_simplified_sol(state: &BondingCurveState) -> f64 {
    lamports_to_sol(2 * state.virtual_sol_reserves as u128)
}

/// Real SOL locked in the curve, in SOL.
pub fn liquidity_sol(state: &BondingCurveState) -> f64 {
    lamports_to_sol(state.real_sol_reserves as u128)
}

/// Compute trade limits for the current curve state, with price impact for
/// an optionally requested buy (SOL) and/or sell (whole tokens) size.
///
/// The program rejects trades moving price beyond `trade_fraction` of the
/// relevant virtual reserve; the recommended limits shave `safety_margin`
/// off that so a quote survives intervening trades.
pub fn calculate_trade_limits(
    state: &BondingCurveState,
    config: &CurveConfig,
    requested_buy_sol: Option<f64>,
    requested_sell_tokens: Option<f64>,
) -> TradeLimits {
    let virtual_sol = lamports_to_sol(state.virtual_sol_reserves as u128);
    let virtual_tokens = base_units_to_tokens(state.virtual_token_reserves as u128);

    let max_buy_sol = virtual_sol * config.trade_fraction;
    let max_sell_tokens = virtual_tokens * config.trade_fraction;

    let price_impact_pct = match (requested_buy_sol, requested_sell_tokens) {
        (Some(buy), _) if virtual_sol > 0.0 => buy / virtual_sol * 100.0,
        (None, Some(sell)) if virtual_tokens > 0.0 => sell / virtual_tokens * 100.0,
        _ => 0.0,
    };

    TradeLimits {
        max_buy_sol,
        max_sell_tokens,
        recommended_buy_sol: max_buy_sol * config.safety_margin,
        recommended_sell_tokens: max_sell_tokens * config.safety_margin,
        liquidity_sol: liquidity_sol(state),
        price_impact_pct,
    }
}

/// Validate a requested buy of `amount_sol` SOL against the curve.
///
/// Fails with [`CurveError::CurveComplete`] on a completed curve for any
/// amount including zero; fails with [`CurveError::ExceedsMaxTrade`] above
/// the hard limit; succeeds with a warning between the recommended and
/// hard limits.
pub fn validate_buy_amount(
    state: &BondingCurveState,
    config: &CurveConfig,
    amount_sol: f64,
) -> Result<TradeValidation, CurveError> {
    if !amount_sol.is_finite() || amount_sol < 0.0 {
        return Err(CurveError::Invalid(format!(
            "buy amount must be a non-negative finite number, got {amount_sol}"
        )));
    }
    if state.complete {
        return Err(CurveError::CurveComplete);
    }

    let limits = calculate_trade_limits(state, config, Some(amount_sol), None);
    if amount_sol > limits.max_buy_sol {
        return Err(CurveError::ExceedsMaxTrade {
            requested: amount_sol,
            max: limits.max_buy_sol,
            price_impact_pct: limits.price_impact_pct,
            limits,
        });
    }

    let warning = (amount_sol > limits.recommended_buy_sol).then_some(TradeWarning {
        requested: amount_sol,
        recommended: limits.recommended_buy_sol,
    });
    Ok(TradeValidation { limits, warning })
}

/// Validate a requested sell of `amount_tokens` whole tokens. Same tiers
/// as [`validate_buy_amount`], against the token-side limit.
pub fn validate_sell_amount(
    state: &BondingCurveState,
    config: &CurveConfig,
    amount_tokens: f64,
) -> Result<TradeValidation, CurveError> {
    if !amount_tokens.is_finite() || amount_tokens < 0.0 {
        return Err(CurveError::Invalid(format!(
            "sell amount must be a non-negative finite number, got {amount_tokens}"
        )));
    }
    if state.complete {
        return Err(CurveError::CurveComplete);
    }

    let limits = calculate_trade_limits(state, config, None, Some(amount_tokens));
    if amount_tokens > limits.max_sell_tokens {
        return Err(CurveError::ExceedsMaxTrade {
            requested: amount_tokens,
            max: limits.max_sell_tokens,
            price_impact_pct: limits.price_impact_pct,
            limits,
        });
    }

    let warning = (amount_tokens > limits.recommended_sell_tokens).then_some(TradeWarning {
        requested: amount_tokens,
        recommended: limits.recommended_sell_tokens,
    });
    Ok(TradeValidation { limits, warning })
}

/// Step function mapping price impact to a slippage tolerance, as a guard
/// against reserve drift between quote and confirmation.
pub fn recommended_slippage_bps(price_impact_pct: f64, base_bps: u16) -> u16 {
    let multiplier = if price_impact_pct < 1.0 {
        1
    } else if price_impact_pct < 5.0 {
        2
    } else if price_impact_pct < 10.0 {
        3
    } else {
        4
    };
    base_bps.saturating_mul(multiplier)
}

/// Tokens (base units) received for `sol_in` lamports, constant-product
/// over virtual reserves with the protocol fee taken off the input.
pub fn quote_buy(
    state: &BondingCurveState,
    sol_in: u64,
    fee_basis_points: u64,
) -> Result<u64, CurveError> {
    if state.complete {
        return Err(CurveError::CurveComplete);
    }
    if state.virtual_sol_reserves == 0 || state.virtual_token_reserves == 0 {
        return Err(CurveError::math("zero virtual reserves"));
    }
    if fee_basis_points >= 10_000 {
        return Err(CurveError::math(format!(
            "fee basis points {fee_basis_points} out of range"
        )));
    }

    let fee = (sol_in as u128 * fee_basis_points as u128) / 10_000;
    let sol_to_curve = (sol_in as u128).saturating_sub(fee);
    if sol_to_curve == 0 {
        return Ok(0);
    }

    let k = state.virtual_sol_reserves as u128 * state.virtual_token_reserves as u128;
    let new_sol = state.virtual_sol_reserves as u128 + sol_to_curve;
    let new_tokens = k / new_sol;
    let tokens_out = (state.virtual_token_reserves as u128)
        .checked_sub(new_tokens)
        .ok_or_else(|| CurveError::math("negative tokens out"))?;

    // Never quote more than the curve can actually deliver
    let tokens_out = tokens_out.min(state.real_token_reserves as u128);
    u64::try_from(tokens_out).map_err(|_| CurveError::math("tokens out exceeds u64"))
}

/// Lamports received for selling `tokens_in` base units, net of fee.
pub fn quote_sell(
    state: &BondingCurveState,
    tokens_in: u64,
    fee_basis_points: u64,
) -> Result<u64, CurveError> {
    if state.complete {
        return Err(CurveError::CurveComplete);
    }
    if state.virtual_sol_reserves == 0 || state.virtual_token_reserves == 0 {
        return Err(CurveError::math("zero virtual reserves"));
    }
    if tokens_in == 0 {
        return Ok(0);
    }
    if tokens_in >= state.virtual_token_reserves {
        return Err(CurveError::Invalid(
            "cannot sell the entire virtual token reserve".to_string(),
        ));
    }
    if fee_basis_points >= 10_000 {
        return Err(CurveError::math(format!(
            "fee basis points {fee_basis_points} out of range"
        )));
    }

    let k = state.virtual_sol_reserves as u128 * state.virtual_token_reserves as u128;
    let new_tokens = state.virtual_token_reserves as u128 - tokens_in as u128;
    let new_sol = k / new_tokens;
    let sol_out_gross = new_sol
        .checked_sub(state.virtual_sol_reserves as u128)
        .ok_or_else(|| CurveError::math("negative SOL out"))?;
    let fee = (sol_out_gross * fee_basis_points as u128) / 10_000;
    let sol_out = sol_out_gross - fee;

    u64::try_from(sol_out).map_err(|_| CurveError::math("SOL out exceeds u64"))
}

/// Raise a quoted SOL cost by `slippage_bps` into the bound a buy encodes.
pub fn max_sol_cost(sol_cost: u64, slippage_bps: u16) -> u64 {
    let raised = sol_cost as u128 * (10_000 + slippage_bps as u128) / 10_000;
    u64::try_from(raised).unwrap_or(u64::MAX)
}

/// Lower a quoted SOL output by `slippage_bps` into the bound a sell encodes.
pub fn min_sol_output(sol_out: u64, slippage_bps: u16) -> u64 {
    let lowered = sol_out as u128 * 10_000u128.saturating_sub(slippage_bps as u128) / 10_000;
    lowered as u64
}

/// Pool-side spot price in SOL per whole token for a graduated token.
pub fn pool_price_sol(base_reserve: u64, quote_reserve: u64) -> Result<f64, CurveError> {
    if base_reserve == 0 {
        return Err(CurveError::math("zero base reserve"));
    }
    Ok(lamports_to_sol(quote_reserve as u128) / base_units_to_tokens(base_reserve as u128))
}
