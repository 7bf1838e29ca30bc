//! Program ids, PDA seed tags and curve constants.
//!
//! Everything in this module mirrors the deployed on-chain programs. The
//! discriminators and account orderings are part of the wire contract and
//! must not drift; the instruction builder and account decoders treat them
//! as invariants and test against them.

/// Seed tags used for PDA derivation.
pub mod seeds {
    /// Seed for the global state PDA
    pub const GLOBAL_SEED: &[u8] = b"global";

    /// Seed for the mint authority PDA
    pub const MINT_AUTHORITY_SEED: &[u8] = b"mint-authority";

    /// Seed for bonding curve PDAs
    pub const BONDING_CURVE_SEED: &[u8] = b"bonding-curve";

    /// Seed for creator vault PDAs
    pub const CREATOR_VAULT_SEED: &[u8] = b"creator-vault";

    /// Seed for metadata PDAs (Metaplex convention)
    pub const METADATA_SEED: &[u8] = b"metadata";
}

/// Well-known program and authority addresses.
pub mod accounts {
    use solana_sdk::{pubkey, pubkey::Pubkey};

    /// The bonding-curve market program
    pub const PUMP_PROGRAM: Pubkey = pubkey!("6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P");

    /// The constant-product pool program tokens graduate into
    pub const PUMP_AMM_PROGRAM: Pubkey = pubkey!("pAMMBay6oceH9fJKBRHGP5D4bD4sWpmSwMn52FMfXEA");

    /// MPL Token Metadata program
    pub const MPL_TOKEN_METADATA: Pubkey = pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

    /// Global state PDA of the market program
    pub const GLOBAL_STATE: Pubkey = pubkey!("4wTV1YmiEkRvAtNtsSGPtUrqRYQMe5SKy2uB4Jjaxnjf");

    /// Protocol fee recipient for buy/sell
    pub const FEE_RECIPIENT: Pubkey = pubkey!("CebN5WGQ4jvEPvsVU4EoHEpgzq1VV7AbicfhtW4xC9iM");

    /// Event authority used by the market program's self-CPI logging
    pub const EVENT_AUTHORITY: Pubkey = pubkey!("Ce6TQqeHC9p8KetsN6JsjHK7UTZk7nasjjnr7XxXp9F1");

    /// Rent sysvar
    pub const RENT: Pubkey = pubkey!("SysvarRent111111111111111111111111111111111");
}

/// 8-byte Anchor operation discriminators of the market program.
///
/// Opaque constants; they must match the deployed program byte-for-byte.
pub mod discriminators {
    pub const CREATE: [u8; 8] = [24, 30, 200, 40, 5, 28, 7, 119];
    pub const EXTEND_ACCOUNT: [u8; 8] = [234, 102, 194, 203, 150, 72, 62, 229];
    pub const BUY: [u8; 8] = [102, 6, 61, 18, 1, 218, 235, 234];
    pub const SELL: [u8; 8] = [51, 230, 133, 164, 1, 127, 131, 173];

    /// Account discriminator of the global state account
    pub const GLOBAL_ACCOUNT: [u8; 8] = [167, 232, 232, 177, 200, 108, 114, 127];

    /// Account discriminator of a bonding curve account
    pub const BONDING_CURVE_ACCOUNT: [u8; 8] = [23, 183, 248, 55, 96, 216, 172, 96];

    /// Account discriminator of a graduated pool account
    pub const POOL_ACCOUNT: [u8; 8] = [241, 154, 109, 4, 17, 177, 109, 188];
}

/// Fixed account-layout sizes (bytes), used both by the decoders and as
/// `dataSize` filters for program-account scans.
pub mod layout {
    /// Discriminator + 5 u64 reserves/supply + complete flag + creator
    pub const BONDING_CURVE_ACCOUNT_LEN: usize = 8 + 5 * 8 + 1 + 32;

    /// Minimum global state prefix this engine reads. The deployed account
    /// is larger; trailing fields are ignored.
    pub const GLOBAL_ACCOUNT_MIN_LEN: usize = 8 + 1 + 32 + 32 + 4 * 8 + 8;

    /// Graduated pool account
    pub const POOL_ACCOUNT_LEN: usize = 8 + 1 + 2 + 6 * 32 + 8 + 32;

    /// SPL token account
    pub const TOKEN_ACCOUNT_LEN: usize = 165;

    /// Maximum encoded lengths the program's fixed buffers accept
    pub const MAX_NAME_LEN: usize = 32;
    pub const MAX_SYMBOL_LEN: usize = 10;
    pub const MAX_URI_LEN: usize = 200;
}

/// Unit scales. Token mints created by the market program use 6 decimals.
pub mod units {
    pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
    pub const TOKEN_BASE_UNITS: u64 = 1_000_000;
}
