//! Unit tests for the bonding-curve valuation model

#[cfg(test)]
mod curve_model_tests {
    use launchpad_engine::curve::{
        self, BondingCurveState, CurveConfig, CurveError,
    };
    use proptest::prelude::*;
    use solana_sdk::pubkey::Pubkey;

    fn state(
        virtual_sol: u64,
        virtual_tokens: u64,
        real_sol: u64,
        real_tokens: u64,
        complete: bool,
    ) -> BondingCurveState {
        BondingCurveState {
            virtual_token_reserves: virtual_tokens,
            virtual_sol_reserves: virtual_sol,
            real_token_reserves: real_tokens,
            real_sol_reserves: real_sol,
            token_total_supply: 1_000_000_000_000_000,
            complete,
            creator: Pubkey::new_unique(),
        }
    }

    fn launch_state() -> BondingCurveState {
        state(
            30_000_000_000,
            1_073_000_000_000_000,
            0,
            793_100_000_000_000,
            false,
        )
    }

    #[test]
    fn price_is_sol_per_whole_token() {
        let s = state(30_000_000_000, 1_073_000_000_000_000, 0, 0, false);
        let price = curve::price_sol(&s).unwrap();
        // 30 SOL over 1.073e9 tokens
        let expected = 30.0 / 1_073_000_000.0;
        assert!((price - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn zero_reserve_price_is_an_error_not_a_panic() {
        let mut s = launch_state();
        s.complete = true;
        s.virtual_token_reserves = 0;
        assert!(curve::price_sol(&s).is_err());
    }

    proptest! {
        #[test]
        fn market_cap_is_price_times_total_token_reserves(
            virtual_sol in 1_000_000u64..=500_000_000_000,
            virtual_tokens in 1_000_000u64..=2_000_000_000_000_000,
            real_sol in 0u64..=500_000_000_000,
            real_tokens in 0u64..=1_000_000_000_000_000,
        ) {
            let s = state(virtual_sol, virtual_tokens, real_sol, real_tokens, false);
            let price = curve::price_sol(&s).unwrap();
            let market_cap = curve::market_cap_sol(&s).unwrap();
            let total_tokens = s.total_token_reserves() as f64 / 1_000_000.0;

            let expected = price * total_tokens;
            let tolerance = expected.abs().max(1e-12) * 1e-9;
            prop_assert!((market_cap - expected).abs() <= tolerance);
        }

        #[test]
        fn buy_quote_never_exceeds_real_token_reserves(
            sol_in in 1u64..=1_000_000_000_000,
            real_tokens in 0u64..=793_100_000_000_000,
        ) {
            let mut s = launch_state();
            s.real_token_reserves = real_tokens;
            let out = curve::quote_buy(&s, sol_in, 100).unwrap();
            prop_assert!(out <= real_tokens);
        }

        #[test]
        fn round_trip_loses_at_most_the_fees(
            sol_in in 1_000_000u64..=3_000_000_000,
        ) {
            let s = launch_state();
            let tokens = curve::quote_buy(&s, sol_in, 100).unwrap();
            prop_assume!(tokens > 0 && tokens < s.virtual_token_reserves);

            // Reserves as they stand after the buy
            let fee = sol_in as u128 * 100 / 10_000;
            let after = state(
                s.virtual_sol_reserves + (sol_in - fee as u64),
                s.virtual_token_reserves - tokens,
                s.real_sol_reserves + (sol_in - fee as u64),
                s.real_token_reserves.saturating_sub(tokens),
                false,
            );
            let sol_back = curve::quote_sell(&after, tokens, 100).unwrap();
            prop_assert!(sol_back <= sol_in);
        }
    }

    #[test]
    fn completed_curve_rejects_any_buy_including_zero() {
        let mut s = launch_state();
        s.complete = true;
        let config = CurveConfig::default();
        for amount in [0.0, 0.5, 100.0] {
            let err = curve::validate_buy_amount(&s, &config, amount).unwrap_err();
            assert!(matches!(err, CurveError::CurveComplete), "amount {amount}");
        }
    }

    #[test]
    fn normalized_limits_match_the_reference_vector() {
        // 100 SOL of virtual reserves at trade fraction 0.12
        let s = state(100_000_000_000, 1_073_000_000_000_000, 0, 793_100_000_000_000, false);
        let config = CurveConfig::default();

        let ok = curve::validate_buy_amount(&s, &config, 10.0).unwrap();
        assert!((ok.limits.max_buy_sol - 12.0).abs() < 1e-9);
        assert!(ok.warning.is_none());

        let err = curve::validate_buy_amount(&s, &config, 13.0).unwrap_err();
        match err {
            CurveError::ExceedsMaxTrade {
                price_impact_pct, ..
            } => assert!((price_impact_pct - 13.0).abs() < 1e-9),
            other => panic!("expected ExceedsMaxTrade, got {other:?}"),
        }
    }

    #[test]
    fn slippage_steps_match_the_reference_vector() {
        assert_eq!(curve::recommended_slippage_bps(0.5, 500), 500);
        assert_eq!(curve::recommended_slippage_bps(3.0, 500), 1000);
        assert_eq!(curve::recommended_slippage_bps(7.0, 500), 1500);
        assert_eq!(curve::recommended_slippage_bps(15.0, 500), 2000);
    }

    #[test]
    fn slippage_bounds_bracket_the_quote() {
        assert_eq!(curve::max_sol_cost(1_000_000_000, 500), 1_050_000_000);
        assert_eq!(curve::min_sol_output(1_000_000_000, 500), 950_000_000);
    }
}
