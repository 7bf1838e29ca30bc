//! Integration tests for the trade orchestrator over the in-memory chain

#[cfg(test)]
mod trade_flow_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use launchpad_engine::chain::MockChainReader;
    use launchpad_engine::constants::{accounts, discriminators, layout};
    use launchpad_engine::curve::BondingCurveState;
    use launchpad_engine::instructions::CreateTokenArgs;
    use launchpad_engine::orchestrator::{
        KeypairSigner, OrchestratorConfig, OrchestratorError, TradeOrchestrator,
    };
    use launchpad_engine::pda;
    use launchpad_engine::types::{SpeedTier, SubmissionStatus};
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::signature::{Keypair, Signer};
    use solana_sdk::transaction::Transaction;

    fn encode_global(fee_bps: u64) -> Vec<u8> {
        let mut data = Vec::with_capacity(layout::GLOBAL_ACCOUNT_MIN_LEN);
        data.extend_from_slice(&discriminators::GLOBAL_ACCOUNT);
        data.push(1);
        data.extend_from_slice(Pubkey::new_unique().as_ref());
        data.extend_from_slice(accounts::FEE_RECIPIENT.as_ref());
        data.extend_from_slice(&1_073_000_000_000_000u64.to_le_bytes());
        data.extend_from_slice(&30_000_000_000u64.to_le_bytes());
        data.extend_from_slice(&793_100_000_000_000u64.to_le_bytes());
        data.extend_from_slice(&1_000_000_000_000_000u64.to_le_bytes());
        data.extend_from_slice(&fee_bps.to_le_bytes());
        data
    }

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

    fn encode_token_account(amount: u64) -> Vec<u8> {
        let mut data = vec![0u8; layout::TOKEN_ACCOUNT_LEN];
        data[64..72].copy_from_slice(&amount.to_le_bytes());
        data
    }

    fn launch_state(creator: Pubkey) -> BondingCurveState {
        BondingCurveState {
            virtual_token_reserves: 1_073_000_000_000_000,
            virtual_sol_reserves: 30_000_000_000,
            real_token_reserves: 793_100_000_000_000,
            real_sol_reserves: 0,
            token_total_supply: 1_000_000_000_000_000,
            complete: false,
            creator,
        }
    }

    struct Harness {
        chain: Arc<MockChainReader>,
        orchestrator: TradeOrchestrator,
        payer: Pubkey,
    }

    fn harness(config: OrchestratorConfig) -> Harness {
        let chain = MockChainReader::new();
        chain.put_account(
            accounts::GLOBAL_STATE,
            accounts::PUMP_PROGRAM,
            encode_global(100),
        );
        let payer_keypair = Keypair::new();
        let payer = payer_keypair.pubkey();
        let orchestrator = TradeOrchestrator::new(
            chain.clone(),
            Arc::new(KeypairSigner::new(payer_keypair)),
            config,
        );
        Harness {
            chain,
            orchestrator,
            payer,
        }
    }

    fn seed_curve(h: &Harness, mint: &Pubkey, state: &BondingCurveState) {
        let (curve, _) = pda::bonding_curve(mint).unwrap();
        h.chain
            .put_account(curve, accounts::PUMP_PROGRAM, encode_curve(state));
    }

    fn program_ids(tx: &Transaction) -> Vec<Pubkey> {
        tx.message
            .instructions
            .iter()
            .map(|ix| *ix.program_id(&tx.message.account_keys))
            .collect()
    }

    fn token_args() -> CreateTokenArgs {
        CreateTokenArgs {
            name: "Test Token".to_string(),
            symbol: "TEST".to_string(),
            uri: "https://example.com/meta.json".to_string(),
        }
    }

    #[tokio::test]
    async fn buy_submits_ata_create_then_buy() {
        let h = harness(OrchestratorConfig::default());
        let mint = Pubkey::new_unique();
        seed_curve(&h, &mint, &launch_state(Pubkey::new_unique()));

        let outcome = h
            .orchestrator
            .buy(&mint, 0.5, SpeedTier::Default)
            .await
            .unwrap();
        assert!(matches!(outcome.status, SubmissionStatus::Submitted(_)));
        assert!(outcome.token_amount > 0);

        let submitted = h.chain.submitted();
        assert_eq!(submitted.len(), 1);
        let tx = &submitted[0];
        let programs = program_ids(tx);
        assert_eq!(programs.len(), 2);
        assert_eq!(programs[0], spl_associated_token_account::ID);
        assert_eq!(programs[1], accounts::PUMP_PROGRAM);
        assert_eq!(
            &tx.message.instructions[1].data[..8],
            &discriminators::BUY[..]
        );
        assert_eq!(tx.message.account_keys[0], h.payer);
    }

    #[tokio::test]
    async fn fast_tier_prepends_compute_budget_instructions() {
        let h = harness(OrchestratorConfig::default());
        let mint = Pubkey::new_unique();
        seed_curve(&h, &mint, &launch_state(Pubkey::new_unique()));

        h.orchestrator
            .buy(&mint, 0.5, SpeedTier::Fast)
            .await
            .unwrap();

        let tx = &h.chain.submitted()[0];
        let programs = program_ids(tx);
        assert_eq!(programs.len(), 4);
        assert_eq!(programs[0], solana_sdk::compute_budget::id());
        assert_eq!(programs[1], solana_sdk::compute_budget::id());
        assert_eq!(programs[3], accounts::PUMP_PROGRAM);
    }

    #[tokio::test]
    async fn tip_transfer_is_present_iff_configured() {
        let tip_recipient = Pubkey::new_unique();
        let h = harness(OrchestratorConfig {
            tip_lamports: 10_000,
            tip_recipient: Some(tip_recipient),
            ..Default::default()
        });
        let mint = Pubkey::new_unique();
        seed_curve(&h, &mint, &launch_state(Pubkey::new_unique()));

        h.orchestrator
            .buy(&mint, 0.5, SpeedTier::Default)
            .await
            .unwrap();
        let tx = &h.chain.submitted()[0];
        let programs = program_ids(tx);
        assert_eq!(programs[0], solana_sdk::system_program::id());
        assert!(tx.message.account_keys.contains(&tip_recipient));

        // Without the tip config the transfer is absent
        let h2 = harness(OrchestratorConfig::default());
        seed_curve(&h2, &mint, &launch_state(Pubkey::new_unique()));
        h2.orchestrator
            .buy(&mint, 0.5, SpeedTier::Default)
            .await
            .unwrap();
        let tx2 = &h2.chain.submitted()[0];
        assert!(!program_ids(tx2).contains(&solana_sdk::system_program::id()));
    }

    #[tokio::test]
    async fn create_and_buy_packs_one_atomic_transaction() {
        let h = harness(OrchestratorConfig::default());
        let mint = Keypair::new();

        let outcome = h
            .orchestrator
            .create_and_buy(&mint, &token_args(), 1.0, SpeedTier::Default)
            .await
            .unwrap();
        assert_eq!(outcome.mint, mint.pubkey());
        assert!(outcome.token_amount > 0);

        let submitted = h.chain.submitted();
        assert_eq!(submitted.len(), 1);
        let tx = &submitted[0];
        let programs = program_ids(tx);
        assert_eq!(programs.len(), 4);
        assert_eq!(programs[0], accounts::PUMP_PROGRAM);
        assert_eq!(programs[1], accounts::PUMP_PROGRAM);
        assert_eq!(programs[2], spl_associated_token_account::ID);
        assert_eq!(programs[3], accounts::PUMP_PROGRAM);
        assert_eq!(
            &tx.message.instructions[0].data[..8],
            &discriminators::CREATE[..]
        );
        assert_eq!(
            tx.message.instructions[1].data,
            discriminators::EXTEND_ACCOUNT.to_vec()
        );
        assert_eq!(
            &tx.message.instructions[3].data[..8],
            &discriminators::BUY[..]
        );

        // Both the payer and the ephemeral mint signed
        assert_eq!(tx.signatures.len(), 2);
        assert!(tx.message.account_keys[..2].contains(&mint.pubkey()));
    }

    #[tokio::test]
    async fn sell_all_reads_the_holder_balance() {
        let h = harness(OrchestratorConfig::default());
        let mint = Pubkey::new_unique();
        seed_curve(&h, &mint, &launch_state(Pubkey::new_unique()));

        let held = 25_000_000_000u64;
        let ata = pda::associated_token_address(&h.payer, &mint);
        h.chain
            .put_account(ata, spl_token::ID, encode_token_account(held));

        let outcome = h
            .orchestrator
            .sell(&mint, None, SpeedTier::Default)
            .await
            .unwrap();
        assert_eq!(outcome.token_amount, held);

        let tx = &h.chain.submitted()[0];
        let data = &tx.message.instructions[0].data;
        assert_eq!(&data[..8], &discriminators::SELL[..]);
        assert_eq!(u64::from_le_bytes(data[8..16].try_into().unwrap()), held);
    }

    #[tokio::test]
    async fn sell_all_without_a_token_account_is_rejected() {
        let h = harness(OrchestratorConfig::default());
        let mint = Pubkey::new_unique();
        seed_curve(&h, &mint, &launch_state(Pubkey::new_unique()));

        let err = h
            .orchestrator
            .sell(&mint, None, SpeedTier::Default)
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::NoTokenBalance(_)));
        assert!(h.chain.submitted().is_empty());
    }

    #[tokio::test]
    async fn missing_curve_aborts_before_any_submission() {
        let h = harness(OrchestratorConfig::default());
        let mint = Pubkey::new_unique();

        let err = h
            .orchestrator
            .buy(&mint, 0.5, SpeedTier::Default)
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::CurveNotFound(m) if m == mint));
        assert!(h.chain.submitted().is_empty());
    }

    #[tokio::test]
    async fn oversized_buy_fails_with_limits_attached() {
        let h = harness(OrchestratorConfig::default());
        let mint = Pubkey::new_unique();
        // 30 SOL virtual reserves, 12% fraction: max buy 3.6 SOL
        seed_curve(&h, &mint, &launch_state(Pubkey::new_unique()));

        let err = h
            .orchestrator
            .buy(&mint, 10.0, SpeedTier::Default)
            .await
            .unwrap_err();
        match err {
            OrchestratorError::Curve(launchpad_engine::curve::CurveError::ExceedsMaxTrade {
                max,
                ..
            }) => assert!((max - 3.6).abs() < 1e-9),
            other => panic!("expected ExceedsMaxTrade, got {other:?}"),
        }
        assert!(h.chain.submitted().is_empty());
    }

    #[tokio::test]
    async fn submission_timeout_reports_unknown_not_failed() {
        let h = harness(OrchestratorConfig {
            submit_timeout: Duration::from_millis(50),
            ..Default::default()
        });
        h.chain.delay_submissions(Duration::from_millis(500));
        let mint = Pubkey::new_unique();
        seed_curve(&h, &mint, &launch_state(Pubkey::new_unique()));

        let outcome = h
            .orchestrator
            .buy(&mint, 0.5, SpeedTier::Default)
            .await
            .unwrap();
        assert!(matches!(outcome.status, SubmissionStatus::Unknown(_)));
    }

    #[tokio::test]
    async fn rpc_rejection_is_surfaced_verbatim() {
        let h = harness(OrchestratorConfig::default());
        h.chain.fail_submissions("Transaction simulation failed: custom program error");
        let mint = Pubkey::new_unique();
        seed_curve(&h, &mint, &launch_state(Pubkey::new_unique()));

        let err = h
            .orchestrator
            .buy(&mint, 0.5, SpeedTier::Default)
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("Transaction simulation failed: custom program error"));
    }
}
