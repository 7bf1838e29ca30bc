//! Chain RPC boundary.
//!
//! Everything that touches the network goes through the [`ChainReader`]
//! trait so the scanner and orchestrator can be driven against an
//! in-memory backend in tests and simulations. The RPC implementation
//! retries transient failures with bounded exponential backoff; a
//! definitive "account does not exist" is never retried.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_client::GetConfirmedSignaturesForAddress2Config,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig, RpcTransactionConfig},
    rpc_filter::RpcFilterType,
};
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};
use solana_transaction_status::UiTransactionEncoding;
use thiserror::Error;
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    RetryIf,
};
use tracing::{debug, warn};

/// Chain access failures.
#[derive(Error, Debug, Clone)]
pub enum ChainError {
    /// The account definitively does not exist at the queried commitment.
    /// Not a transient condition; never retried.
    #[error("account not found: {0}")]
    AccountNotFound(Pubkey),

    /// Transport or node failure; retryable with backoff
    #[error("rpc error: {0}")]
    Rpc(String),

    /// Bounded retry gave up. Carries the last underlying error verbatim.
    #[error("retry limit reached after {attempts} attempts: {last}")]
    RetryLimitExceeded { attempts: u32, last: String },
}

impl ChainError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }

    pub fn category(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "not_found",
            Self::Rpc(_) => "rpc",
            Self::RetryLimitExceeded { .. } => "retry",
        }
    }
}

/// One entry of a signature scan.
#[derive(Debug, Clone)]
pub struct SignatureRecord {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub err: bool,
}

/// Narrow read/submit interface over the chain.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn get_account(&self, address: &Pubkey) -> Result<Account, ChainError>;

    /// Program-owned accounts whose data length equals `size` exactly.
    async fn get_program_accounts_by_size(
        &self,
        program: &Pubkey,
        size: u64,
    ) -> Result<Vec<(Pubkey, Account)>, ChainError>;

    async fn get_recent_signatures(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>, ChainError>;

    /// Static account keys of a confirmed transaction.
    async fn get_transaction_accounts(
        &self,
        signature: &str,
    ) -> Result<Vec<Pubkey>, ChainError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, ChainError>;

    /// Submit a fully signed transaction. No internal retries: resubmission
    /// policy belongs to the caller.
    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, ChainError>;
}

/// Retry tuning for chain reads.
#[derive(Debug, Clone, Copy)]
pub struct RetrySettings {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_attempts: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            base_delay_ms: 200,
            max_delay_ms: 5_000,
            max_attempts: 4,
        }
    }
}

/// [`ChainReader`] over a JSON-RPC node.
pub struct RpcChainReader {
    client: RpcClient,
    commitment: CommitmentConfig,
    retry: RetrySettings,
}

impl RpcChainReader {
    pub fn new(endpoint: impl Into<String>, retry: RetrySettings) -> Self {
        let commitment = CommitmentConfig::confirmed();
        Self {
            client: RpcClient::new_with_commitment(endpoint.into(), commitment),
            commitment,
            retry,
        }
    }

    fn strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(self.retry.base_delay_ms)
            .factor(2)
            .max_delay(Duration::from_millis(self.retry.max_delay_ms))
            .map(jitter)
            .take(self.retry.max_attempts.saturating_sub(1) as usize)
    }

    /// Run `op` under the bounded retry policy, retrying only transient
    /// errors.
    async fn with_retry<T, F, Fut>(&self, what: &str, op: F) -> Result<T, ChainError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ChainError>>,
    {
        let attempts = self.retry.max_attempts;
        RetryIf::spawn(self.strategy(), op, |e: &ChainError| {
            let retry = e.is_retryable();
            if retry {
                warn!(target: "chain", %e, what, "transient chain error, retrying");
            }
            retry
        })
        .await
        .map_err(|e| match e {
            ChainError::Rpc(last) => ChainError::RetryLimitExceeded { attempts, last },
            other => other,
        })
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn get_account(&self, address: &Pubkey) -> Result<Account, ChainError> {
        self.with_retry("get_account", || async {
            let response = self
                .client
                .get_account_with_commitment(address, self.commitment)
                .await
                .map_err(|e| ChainError::Rpc(e.to_string()))?;
            response.value.ok_or(ChainError::AccountNotFound(*address))
        })
        .await
    }

    async fn get_program_accounts_by_size(
        &self,
        program: &Pubkey,
        size: u64,
    ) -> Result<Vec<(Pubkey, Account)>, ChainError> {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![RpcFilterType::DataSize(size)]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };

        self.with_retry("get_program_accounts", || {
            let config = config.clone();
            async move {
                self.client
                    .get_program_accounts_with_config(program, config)
                    .await
                    .map_err(|e| ChainError::Rpc(e.to_string()))
            }
        })
        .await
    }

    async fn get_recent_signatures(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>, ChainError> {
        self.with_retry("get_signatures", || async move {
            let config = GetConfirmedSignaturesForAddress2Config {
                before: None,
                until: None,
                limit: Some(limit),
                commitment: Some(self.commitment),
            };
            let statuses = self
                .client
                .get_signatures_for_address_with_config(address, config)
                .await
                .map_err(|e| ChainError::Rpc(e.to_string()))?;
            Ok(statuses
                .into_iter()
                .map(|s| SignatureRecord {
                    signature: s.signature,
                    slot: s.slot,
                    block_time: s.block_time,
                    err: s.err.is_some(),
                })
                .collect())
        })
        .await
    }

    async fn get_transaction_accounts(
        &self,
        signature: &str,
    ) -> Result<Vec<Pubkey>, ChainError> {
        let parsed = signature
            .parse::<Signature>()
            .map_err(|e| ChainError::Rpc(format!("bad signature {signature}: {e}")))?;
        self.with_retry("get_transaction", || async {
            let config = RpcTransactionConfig {
                encoding: Some(UiTransactionEncoding::Base64),
                commitment: Some(self.commitment),
                max_supported_transaction_version: Some(0),
            };
            let fetched = self
                .client
                .get_transaction_with_config(&parsed, config)
                .await
                .map_err(|e| ChainError::Rpc(e.to_string()))?;
            let tx = fetched
                .transaction
                .transaction
                .decode()
                .ok_or_else(|| ChainError::Rpc(format!("undecodable transaction {parsed}")))?;
            Ok(tx.message.static_account_keys().to_vec())
        })
        .await
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, ChainError> {
        self.with_retry("get_latest_blockhash", || async {
            self.client
                .get_latest_blockhash()
                .await
                .map_err(|e| ChainError::Rpc(e.to_string()))
        })
        .await
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, ChainError> {
        debug!(target: "chain", "submitting transaction");
        self.client
            .send_transaction(tx)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }
}

/// Deterministic in-memory backend for tests and simulations.
#[derive(Default)]
pub struct MockChainReader {
    accounts: RwLock<HashMap<Pubkey, Account>>,
    signatures: RwLock<Vec<SignatureRecord>>,
    transactions: RwLock<HashMap<String, Vec<Pubkey>>>,
    blockhash: RwLock<Hash>,
    submitted: RwLock<Vec<Transaction>>,
    submit_error: RwLock<Option<String>>,
    submit_delay: RwLock<Option<Duration>>,
}

impl MockChainReader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put_account(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        self.accounts.write().insert(
            address,
            Account {
                lamports: 1,
                data,
                owner,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    pub fn remove_account(&self, address: &Pubkey) {
        self.accounts.write().remove(address);
    }

    pub fn push_signature(&self, record: SignatureRecord) {
        self.signatures.write().push(record);
    }

    /// Register the account keys returned for `signature`.
    pub fn put_transaction(&self, signature: impl Into<String>, account_keys: Vec<Pubkey>) {
        self.transactions.write().insert(signature.into(), account_keys);
    }

    pub fn set_blockhash(&self, blockhash: Hash) {
        *self.blockhash.write() = blockhash;
    }

    /// Every submission after this call fails with `message` (verbatim).
    pub fn fail_submissions(&self, message: impl Into<String>) {
        *self.submit_error.write() = Some(message.into());
    }

    /// Every submission after this call sleeps for `delay` first. Used to
    /// exercise timeout handling against a paused tokio clock.
    pub fn delay_submissions(&self, delay: Duration) {
        *self.submit_delay.write() = Some(delay);
    }

    pub fn submitted(&self) -> Vec<Transaction> {
        self.submitted.read().clone()
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn get_account(&self, address: &Pubkey) -> Result<Account, ChainError> {
        self.accounts
            .read()
            .get(address)
            .cloned()
            .ok_or(ChainError::AccountNotFound(*address))
    }

    async fn get_program_accounts_by_size(
        &self,
        program: &Pubkey,
        size: u64,
    ) -> Result<Vec<(Pubkey, Account)>, ChainError> {
        Ok(self
            .accounts
            .read()
            .iter()
            .filter(|(_, a)| a.owner == *program && a.data.len() as u64 == size)
            .map(|(k, a)| (*k, a.clone()))
            .collect())
    }

    async fn get_recent_signatures(
        &self,
        _address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>, ChainError> {
        let signatures = self.signatures.read();
        Ok(signatures.iter().rev().take(limit).cloned().collect())
    }

    async fn get_transaction_accounts(
        &self,
        signature: &str,
    ) -> Result<Vec<Pubkey>, ChainError> {
        self.transactions
            .read()
            .get(signature)
            .cloned()
            .ok_or_else(|| ChainError::Rpc(format!("transaction not found: {signature}")))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, ChainError> {
        Ok(*self.blockhash.read())
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, ChainError> {
        let delay = *self.submit_delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.submit_error.read().clone() {
            return Err(ChainError::Rpc(message));
        }
        self.submitted.write().push(tx.clone());
        Ok(tx.signatures[0])
    }
}
