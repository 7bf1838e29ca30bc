//! Unit tests for the vanity keypair subsystem

#[cfg(test)]
mod vanity_tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use launchpad_engine::vanity::{
        GrindProgress, GrinderConfig, VanityError, VanityGrinder, VanityPool,
    };
    use solana_sdk::signature::{Keypair, Signer};
    use tokio::sync::mpsc;

    fn ends_with(keypair: &Keypair, suffix: &str) -> bool {
        keypair
            .pubkey()
            .to_string()
            .to_ascii_lowercase()
            .ends_with(suffix)
    }

    fn keypairs_with_suffix(suffix: &str, count: usize) -> Vec<Keypair> {
        std::iter::repeat_with(Keypair::new)
            .filter(|kp| ends_with(kp, suffix))
            .take(count)
            .collect()
    }

    #[tokio::test]
    async fn pool_never_hands_out_the_same_keypair_twice() {
        let entries = keypairs_with_suffix("a", 3);
        let pool = VanityPool::from_keypairs(entries, "a".to_string());

        let mut seen = Vec::new();
        while let Some(hit) = pool.acquire().await {
            let address = hit.keypair.pubkey();
            assert!(!seen.contains(&address), "duplicate keypair handed out");
            seen.push(address);
        }
        assert_eq!(seen.len(), 3);

        // Exhaustion is empty, not an error
        assert!(pool.acquire().await.is_none());
        assert!(pool.acquire().await.is_none());
    }

    #[tokio::test]
    async fn cancelled_search_settles_promptly_without_double_resolution() {
        let grinder = VanityGrinder::new(GrinderConfig {
            workers: 2,
            max_attempts: 100_000_000,
            check_interval: 64,
        });
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, mut rx) = mpsc::channel::<GrindProgress>(16);

        let canceller = {
            let cancel = Arc::clone(&cancel);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                cancel.store(true, Ordering::Relaxed);
            })
        };

        // An impossible-by-budget suffix, so only cancellation can settle it
        let started = std::time::Instant::now();
        let outcome = grinder.grind("zzzzzz", Arc::clone(&cancel), Some(tx)).await;
        canceller.await.unwrap();

        assert!(matches!(outcome, Err(VanityError::Cancelled)));
        // Settled within roughly one reporting interval of the cancel
        assert!(started.elapsed() < Duration::from_secs(3));

        // The progress channel closes with the search; no late sends
        while rx.recv().await.is_some() {}

        // The grinder is reusable: cancellation fully released the slot
        let again = grinder
            .grind("zzzzzz", Arc::new(AtomicBool::new(true)), None)
            .await;
        assert!(matches!(again, Err(VanityError::Cancelled)));
    }

    #[tokio::test]
    async fn exhausted_search_reports_cumulative_attempts() {
        let grinder = VanityGrinder::new(GrinderConfig {
            workers: 4,
            max_attempts: 2_000,
            check_interval: 64,
        });
        let outcome = grinder
            .grind("zzzzzz", Arc::new(AtomicBool::new(false)), None)
            .await;
        match outcome {
            Err(VanityError::Exhausted { attempts }) => {
                assert!(attempts >= 2_000, "attempts {attempts}");
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn found_keypair_matches_case_insensitively() {
        let grinder = VanityGrinder::new(GrinderConfig {
            workers: 4,
            max_attempts: 400_000,
            check_interval: 64,
        });
        let hit = grinder
            .grind("A", Arc::new(AtomicBool::new(false)), None)
            .await
            .unwrap();
        let address = hit.keypair.pubkey().to_string().to_ascii_lowercase();
        assert!(address.ends_with('a'));
    }

    #[tokio::test]
    async fn pool_load_failure_degrades_to_empty_pool() {
        let pool = VanityPool::spawn_load("/definitely/not/here.json".into(), "a".into());
        assert!(pool.wait_for_loaded(Duration::from_secs(5)).await);
        assert!(pool.acquire().await.is_none());
    }
}
