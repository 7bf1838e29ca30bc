//! Bonding-curve valuation and trade-limit model.
//!
//! Pure math over reserve quantities plus the strongly-typed account
//! decoders that feed it. No I/O anywhere in this module.

pub mod errors;
pub mod model;
pub mod state;

pub use errors::CurveError;
pub use model::{
    calculate_trade_limits, liquidity_sol, market_cap_simplified_sol, market_cap_sol,
    max_sol_cost, min_sol_output, pool_price_sol, price_sol, quote_buy, quote_sell,
    recommended_slippage_bps, validate_buy_amount, validate_sell_amount, CurveConfig,
    TradeLimits, TradeValidation, TradeWarning,
};
pub use state::{
    decode_token_account_amount, BondingCurveState, GlobalState, PoolState,
};
