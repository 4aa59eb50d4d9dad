use log::info;
use solana_program::native_token::lamports_to_sol;
use solana_sdk::{pubkey::Pubkey, signature::Signature};

use crate::{
    rpc::{confirm_signature, DevnetRpc},
    WorkflowError, AIRDROP_LAMPORTS, AIRDROP_THRESHOLD_LAMPORTS,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundingOutcome {
    AlreadyFunded {
        balance: u64,
    },
    Airdropped {
        before: u64,
        after: u64,
        signature: Signature,
    },
}

/// Tops `pubkey` up from the faucet when it holds less than 1 SOL.
///
/// One request, no retries. The airdrop is confirmed against the blockhash
/// fetched right after it is requested.
pub async fn airdrop_if_needed<R: DevnetRpc + ?Sized>(
    rpc: &R,
    pubkey: &Pubkey,
) -> Result<FundingOutcome, WorkflowError> {
    let balance = rpc.get_balance(pubkey).await?;
    info!("Current balance is {} SOL", lamports_to_sol(balance));

    if balance >= AIRDROP_THRESHOLD_LAMPORTS {
        return Ok(FundingOutcome::AlreadyFunded { balance });
    }

    info!("Airdropping {} SOL", lamports_to_sol(AIRDROP_LAMPORTS));
    let signature = rpc.request_airdrop(pubkey, AIRDROP_LAMPORTS).await?;

    let (_, last_valid_block_height) = rpc.get_latest_blockhash().await?;
    confirm_signature(rpc, &signature, last_valid_block_height).await?;

    let new_balance = rpc.get_balance(pubkey).await?;
    info!("New balance is {} SOL", lamports_to_sol(new_balance));

    Ok(FundingOutcome::Airdropped {
        before: balance,
        after: new_balance,
        signature,
    })
}
