//! Fee-payer signing seam.
//!
//! The orchestrator never holds key material directly; it asks a
//! `TransactionSigner` to apply the payer signature. Tests swap in a
//! local keypair, production can back this with whatever custody the
//! deployment uses.

use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;

use super::errors::OrchestratorError;

pub trait TransactionSigner: Send + Sync {
    fn pubkey(&self) -> Pubkey;

    /// Apply the payer signature for `blockhash`. Partial signatures
    /// already on the transaction (e.g. the mint keypair on a create)
    /// must survive.
    fn sign(&self, tx: &mut Transaction, blockhash: Hash) -> Result<(), OrchestratorError>;
}

pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

impl TransactionSigner for KeypairSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    fn sign(&self, tx: &mut Transaction, blockhash: Hash) -> Result<(), OrchestratorError> {
        tx.try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| OrchestratorError::Signing(e.to_string()))
    }
}
