//! Launchpad Engine - bonding-curve token trading and discovery.
//!
//! Core pieces: the curve valuation model, the wire-exact instruction
//! builders for the market program, a vanity mint keypair supply, the
//! trade orchestrator, and the ledger scanner serving trending / recent /
//! graduating token views.

pub mod chain;
pub mod config;
pub mod constants;
pub mod curve;
pub mod instructions;
pub mod orchestrator;
pub mod pda;
pub mod scanner;
pub mod types;
pub mod vanity;

// Re-export commonly used types
pub use solana_sdk::{pubkey::Pubkey, signature::Signature};
