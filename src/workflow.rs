use log::info;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Signature, Signer},
};

use crate::{
    identity::{initialize_keypair, KeyStore},
    program::{fresh_recipient, ping_program, send_sol, Explorer},
    rpc::DevnetRpc,
    Config, WorkflowError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub payer: Pubkey,
    pub recipient: Pubkey,
    pub ping_signature: Signature,
    pub transfer_signature: Signature,
}

/// Provision and fund the payer, ping the program, then send SOL to a
/// fresh address. Stops at the first error.
pub async fn run<R: DevnetRpc + ?Sized>(
    rpc: &R,
    config: &Config,
) -> Result<RunSummary, WorkflowError> {
    let explorer = Explorer::from_config(config);
    let store = KeyStore::new(&config.key_file, config.private_key.clone());
    let signer = initialize_keypair(rpc, &store).await?;

    let ping_signature = ping_program(
        rpc,
        &signer,
        &config.program_id,
        &config.program_data_account,
        &explorer,
    )
    .await?;

    let recipient = fresh_recipient(&signer.pubkey());
    let transfer_signature = send_sol(
        rpc,
        config.transfer_lamports,
        &recipient,
        &signer,
        &explorer,
    )
    .await?;

    info!("Public key: {}", signer.pubkey());

    Ok(RunSummary {
        payer: signer.pubkey(),
        recipient,
        ping_signature,
        transfer_signature,
    })
}
