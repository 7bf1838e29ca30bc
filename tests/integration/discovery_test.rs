//! Integration tests for the token directory over the in-memory chain

#[cfg(test)]
mod discovery_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use launchpad_engine::chain::{MockChainReader, SignatureRecord};
    use launchpad_engine::constants::{accounts, discriminators, layout};
    use launchpad_engine::curve::BondingCurveState;
    use launchpad_engine::pda;
    use launchpad_engine::scanner::{ManualClock, ScannerConfig, TokenDirectory};
    use launchpad_engine::types::{TokenEvent, Venue};
    use solana_sdk::pubkey::Pubkey;

    fn encode_curve(state: &BondingCurveState) -> Vec<u8> {
        let mut data = Vec::with_capacity(layout::BONDING_CURVE_ACCOUNT_LEN);
        data.extend_from_slice(&discriminators::BONDING_CURVE_ACCOUNT);
        data.extend_from_slice(&state.virtual_token_reserves.to_le_bytes());
        data.extend_from_slice(&state.virtual_sol_reserves.to_le_bytes());
        data.extend_from_slice(&state.real_token_reserves.to_le_bytes());
        data.extend_from_slice(&state.real_sol_reserves.to_le_bytes());
        data.extend_from_slice(&state.token_total_supply.to_le_bytes());
        data.push(state.complete as u8);
        data.extend_from_slice(state.creator.as_ref());
        data
    }

    fn encode_pool(base_mint: Pubkey, base_acct: Pubkey, quote_acct: Pubkey) -> Vec<u8> {
        let mut data = Vec::with_capacity(layout::POOL_ACCOUNT_LEN);
        data.extend_from_slice(&discriminators::POOL_ACCOUNT);
        data.push(255);
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(Pubkey::new_unique().as_ref());
        data.extend_from_slice(base_mint.as_ref());
        data.extend_from_slice(Pubkey::new_unique().as_ref());
        data.extend_from_slice(Pubkey::new_unique().as_ref());
        data.extend_from_slice(base_acct.as_ref());
        data.extend_from_slice(quote_acct.as_ref());
        data.extend_from_slice(&1_000u64.to_le_bytes());
        data.extend_from_slice(Pubkey::new_unique().as_ref());
        data
    }

    fn encode_token_account(amount: u64) -> Vec<u8> {
        let mut data = vec![0u8; layout::TOKEN_ACCOUNT_LEN];
        data[64..72].copy_from_slice(&amount.to_le_bytes());
        data
    }

    /// With no real token reserves the market cap in SOL equals the
    /// virtual SOL reserves in SOL, which keeps fixtures readable.
    fn curve_with_mcap(mcap_sol: u64, real_sol: u64) -> BondingCurveState {
        BondingCurveState {
            virtual_token_reserves: 1_000_000_000_000_000,
            virtual_sol_reserves: mcap_sol * 1_000_000_000,
            real_token_reserves: 0,
            real_sol_reserves: real_sol,
            token_total_supply: 1_000_000_000_000_000,
            complete: false,
            creator: Pubkey::new_unique(),
        }
    }

    fn seed_curve(chain: &MockChainReader, mint: &Pubkey, state: &BondingCurveState) {
        let (curve, _) = pda::bonding_curve(mint).unwrap();
        chain.put_account(curve, accounts::PUMP_PROGRAM, encode_curve(state));
    }

    fn setup() -> (Arc<MockChainReader>, Arc<TokenDirectory>, Arc<ManualClock>) {
        let chain = MockChainReader::new();
        let clock = Arc::new(ManualClock::new());
        let directory = Arc::new(TokenDirectory::new(
            chain.clone(),
            ScannerConfig::default(),
            clock.clone(),
        ));
        (chain, directory, clock)
    }

    fn seed_trade_signature(chain: &MockChainReader, mint: &Pubkey, signature: &str) {
        chain.push_signature(SignatureRecord {
            signature: signature.to_string(),
            slot: 1,
            block_time: Some(1_700_000_000),
            err: false,
        });
        chain.put_transaction(
            signature,
            vec![
                Pubkey::new_unique(), // payer
                accounts::GLOBAL_STATE,
                *mint,
                pda::bonding_curve(mint).unwrap().0,
                accounts::PUMP_PROGRAM,
            ],
        );
    }

    #[tokio::test]
    async fn fresh_launch_enters_views_without_manual_tracking() {
        let (chain, directory, _) = setup();
        let mint = Pubkey::new_unique();
        seed_curve(&chain, &mint, &curve_with_mcap(50, 0));
        seed_trade_signature(&chain, &mint, "create-tx");

        let mut events = directory.subscribe();
        let recent = directory.recent().await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].mint, mint);
        assert_eq!(events.try_recv().unwrap(), TokenEvent::Created { mint });

        let trending = directory.trending().await.unwrap();
        assert_eq!(trending.len(), 1);
    }

    #[tokio::test]
    async fn views_classify_a_mixed_population() {
        let (chain, directory, _) = setup();

        let quiet = Pubkey::new_unique();
        let watched = Pubkey::new_unique();
        seed_curve(&chain, &quiet, &curve_with_mcap(50, 0));
        seed_curve(&chain, &watched, &curve_with_mcap(300, 0));
        directory.track_mint(quiet);
        directory.track_mint(watched);

        let trending = directory.trending().await.unwrap();
        assert_eq!(trending.len(), 2);

        let graduating = directory.graduating().await.unwrap();
        assert_eq!(graduating.len(), 1);
        assert_eq!(graduating[0].record.mint, watched);
        assert!(graduating[0].progress_pct > 0.0);
    }

    #[tokio::test]
    async fn volume_builds_across_refresh_cycles() {
        let (chain, directory, clock) = setup();
        let mint = Pubkey::new_unique();
        seed_curve(&chain, &mint, &curve_with_mcap(50, 10_000_000_000));
        directory.track_mint(mint);

        directory.trending().await.unwrap();

        // 4 SOL of reserve movement between cycles
        seed_curve(&chain, &mint, &curve_with_mcap(50, 14_000_000_000));
        clock.advance(Duration::from_secs(31));

        let view = directory.trending().await.unwrap();
        assert_eq!(view.len(), 1);
        assert!((view[0].volume_sol - 4.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn graduation_moves_a_token_to_the_pool_venue() {
        let (chain, directory, clock) = setup();
        let mint = Pubkey::new_unique();
        seed_curve(&chain, &mint, &curve_with_mcap(300, 0));
        directory.track_mint(mint);

        let mut events = directory.subscribe();
        let before = directory.trending().await.unwrap();
        assert!(matches!(before[0].venue, Venue::Curve(_)));
        assert_eq!(events.try_recv().unwrap(), TokenEvent::Created { mint });
        assert_eq!(events.try_recv().unwrap(), TokenEvent::Graduating { mint });

        // The pool appears; the curve account is gone
        let base_acct = Pubkey::new_unique();
        let quote_acct = Pubkey::new_unique();
        let pool_address = Pubkey::new_unique();
        chain.remove_account(&pda::bonding_curve(&mint).unwrap().0);
        chain.put_account(
            pool_address,
            accounts::PUMP_AMM_PROGRAM,
            encode_pool(mint, base_acct, quote_acct),
        );
        chain.put_account(base_acct, spl_token::ID, encode_token_account(800_000_000_000_000));
        chain.put_account(quote_acct, spl_token::ID, encode_token_account(400_000_000_000));

        clock.advance(Duration::from_secs(31));
        let after = directory.trending().await.unwrap();
        assert_eq!(after.len(), 1);
        assert!(after[0].is_pump_swap);
        assert!(matches!(after[0].venue, Venue::Pool(p) if p == pool_address));
        assert_eq!(events.try_recv().unwrap(), TokenEvent::Graduated { mint });

        // 400 SOL over 800M tokens
        let expected_price = 400.0 / 800_000_000.0;
        assert!((after[0].price_sol - expected_price).abs() / expected_price < 1e-9);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_view_requests_share_one_scan() {
        let (chain, directory, _) = setup();
        let mint = Pubkey::new_unique();
        seed_curve(&chain, &mint, &curve_with_mcap(50, 0));
        directory.track_mint(mint);

        let mut events = directory.subscribe();
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let directory = Arc::clone(&directory);
            tasks.push(tokio::spawn(async move {
                directory.recent().await.unwrap().len()
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap(), 1);
        }

        // A single refresh ran: one Created event, not eight
        assert_eq!(events.try_recv().unwrap(), TokenEvent::Created { mint });
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn created_at_is_the_first_seen_stamp_and_orders_recent() {
        let (chain, directory, clock) = setup();
        let older = Pubkey::new_unique();
        seed_curve(&chain, &older, &curve_with_mcap(50, 0));
        directory.track_mint(older);
        directory.recent().await.unwrap();

        clock.advance(Duration::from_secs(31));
        tokio::time::sleep(Duration::from_millis(5)).await;
        let newer = Pubkey::new_unique();
        seed_curve(&chain, &newer, &curve_with_mcap(60, 0));
        directory.track_mint(newer);

        let view = directory.recent().await.unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].mint, newer);
        assert_eq!(view[1].mint, older);
        assert!(view[0].created_at >= view[1].created_at);
    }
}
