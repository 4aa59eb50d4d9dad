//! RPC access for the workflow.
//!
//! `DevnetRpc` covers the handful of JSON-RPC calls the workflow makes so
//! the funding and submission logic can run against a mock. `SolanaRpc` is
//! the real implementation over the non-blocking `RpcClient`.
use async_trait::async_trait;
use log::{debug, info};
#[cfg(test)]
use mockall::automock;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::{Transaction, TransactionError},
};
use std::time::Duration;

use crate::WorkflowError;

/// Delay between signature status polls while waiting for confirmation.
pub const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[async_trait]
#[cfg_attr(test, automock)]
pub trait DevnetRpc: Send + Sync {
    /// Balance in lamports.
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, WorkflowError>;

    /// Asks the faucet for `lamports`; returns the airdrop signature.
    async fn request_airdrop(
        &self,
        pubkey: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, WorkflowError>;

    /// Latest blockhash and the last block height it is valid for.
    async fn get_latest_blockhash(&self) -> Result<(Hash, u64), WorkflowError>;

    async fn get_block_height(&self) -> Result<u64, WorkflowError>;

    /// `None` while the cluster has not seen the signature at our commitment.
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<Result<(), TransactionError>>, WorkflowError>;

    async fn send_transaction(&self, transaction: &Transaction)
        -> Result<Signature, WorkflowError>;
}

pub struct SolanaRpc {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl SolanaRpc {
    pub fn new(url: String) -> Self {
        Self::new_with_commitment(url, CommitmentConfig::confirmed())
    }

    pub fn new_with_commitment(url: String, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(url, commitment),
            commitment,
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }

    pub fn commitment(&self) -> CommitmentConfig {
        self.commitment
    }
}

#[async_trait]
impl DevnetRpc for SolanaRpc {
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, WorkflowError> {
        Ok(self.client.get_balance(pubkey).await?)
    }

    async fn request_airdrop(
        &self,
        pubkey: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, WorkflowError> {
        self.client
            .request_airdrop(pubkey, lamports)
            .await
            .map_err(|e| WorkflowError::AirdropRejected(e.to_string()))
    }

    async fn get_latest_blockhash(&self) -> Result<(Hash, u64), WorkflowError> {
        Ok(self
            .client
            .get_latest_blockhash_with_commitment(self.commitment)
            .await?)
    }

    async fn get_block_height(&self) -> Result<u64, WorkflowError> {
        Ok(self
            .client
            .get_block_height_with_commitment(self.commitment)
            .await?)
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<Result<(), TransactionError>>, WorkflowError> {
        Ok(self
            .client
            .get_signature_status_with_commitment(signature, self.commitment)
            .await?)
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, WorkflowError> {
        Ok(self.client.send_transaction(transaction).await?)
    }
}

/// Waits until `signature` is confirmed, it fails, or the cluster moves past
/// `last_valid_block_height` without having seen it.
pub async fn confirm_signature<R: DevnetRpc + ?Sized>(
    rpc: &R,
    signature: &Signature,
    last_valid_block_height: u64,
) -> Result<(), WorkflowError> {
    loop {
        match rpc.get_signature_status(signature).await? {
            Some(Ok(())) => {
                debug!("Transaction {} confirmed", signature);
                return Ok(());
            }
            Some(Err(error)) => {
                return Err(WorkflowError::TransactionFailed {
                    signature: *signature,
                    error,
                })
            }
            None => {}
        }

        let block_height = rpc.get_block_height().await?;
        if block_height > last_valid_block_height {
            return Err(WorkflowError::BlockhashExpired {
                signature: *signature,
                last_valid_block_height,
            });
        }

        tokio::time::sleep(CONFIRMATION_POLL_INTERVAL).await;
    }
}

/// Signs `instructions` with `payer` as the only signer and fee payer,
/// submits them once and waits for confirmation.
pub async fn send_and_confirm<R: DevnetRpc + ?Sized>(
    rpc: &R,
    instructions: &[Instruction],
    payer: &Keypair,
) -> Result<Signature, WorkflowError> {
    let (blockhash, last_valid_block_height) = rpc.get_latest_blockhash().await?;
    let transaction = Transaction::new_signed_with_payer(
        instructions,
        Some(&payer.pubkey()),
        &[payer],
        blockhash,
    );

    let signature = rpc.send_transaction(&transaction).await?;
    info!("Sent transaction {}, awaiting confirmation", signature);

    confirm_signature(rpc, &signature, last_valid_block_height).await?;
    Ok(signature)
}
