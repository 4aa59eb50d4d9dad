//! Devnet client that provisions a funded keypair, pings an on-chain
//! program, and sends a small SOL transfer to a fresh address.

use solana_program::native_token::LAMPORTS_PER_SOL;

pub mod config;
pub mod error;
pub mod funding;
pub mod identity;
pub mod logging;
pub mod program;
pub mod rpc;
pub mod workflow;

pub use config::{Cluster, Config};
pub use error::WorkflowError;
pub use workflow::{run, RunSummary};

/// Program the ping instruction is sent to.
pub const DEFAULT_PROGRAM_ID: &str = "ChT1B39WKLS8qUrkLvFDXMhEJ4F1XZzwUNHUt4AU9aVa";

/// Writable data account handed to the ping program.
pub const DEFAULT_PROGRAM_DATA_ACCOUNT: &str = "Ah9K7dQ8EHaZqcAsgBW8w37yN2eAy3koFmUn4x3CJtod";

/// Balance below which the faucet is asked for funds.
pub const AIRDROP_THRESHOLD_LAMPORTS: u64 = LAMPORTS_PER_SOL;

/// Faucet grant per request. Devnet caps a single request at 2 SOL.
pub const AIRDROP_LAMPORTS: u64 = LAMPORTS_PER_SOL;

/// 0.1 SOL
pub const DEFAULT_TRANSFER_LAMPORTS: u64 = LAMPORTS_PER_SOL / 10;
