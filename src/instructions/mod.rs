//! Instruction Builder: binary encoding of the market program's
//! create / extend / buy / sell operations.
//!
//! Account ordering is a program-defined contract, not an implementation
//! detail; each builder's order is pinned by tests.

pub mod encode;
pub mod errors;
pub mod pump;

pub use errors::InstructionBuildError;
pub use pump::{
    build_buy_instruction, build_create_instruction, build_extend_account_instruction,
    build_sell_instruction, CreateTokenArgs,
};
