use log::info;
use solana_program::system_instruction;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use url::form_urlencoded::byte_serialize;

use crate::{
    config::{Cluster, Config},
    rpc::{send_and_confirm, DevnetRpc},
    WorkflowError,
};

/// Builds Solana Explorer links for the cluster a run talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explorer {
    pub cluster: Cluster,
    pub rpc_url: String,
}

impl Explorer {
    pub fn new(cluster: Cluster, rpc_url: impl Into<String>) -> Self {
        Self {
            cluster,
            rpc_url: rpc_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cluster, config.rpc_url.clone())
    }

    /// Localnet links point the explorer at the configured RPC endpoint.
    pub fn tx_url(&self, signature: &Signature) -> String {
        match self.cluster {
            Cluster::MainnetBeta => format!("https://explorer.solana.com/tx/{}", signature),
            Cluster::Localnet => {
                let custom_url: String = byte_serialize(self.rpc_url.as_bytes()).collect();
                format!(
                    "https://explorer.solana.com/tx/{}?cluster=custom&customUrl={}",
                    signature, custom_url
                )
            }
            other => format!(
                "https://explorer.solana.com/tx/{}?cluster={}",
                signature, other
            ),
        }
    }
}

/// The data account is writable but does not sign; there is no payload.
pub fn ping_instruction(program_id: &Pubkey, data_account: &Pubkey) -> Instruction {
    Instruction::new_with_bytes(
        *program_id,
        &[],
        vec![AccountMeta::new(*data_account, false)],
    )
}

pub fn transfer_instruction(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    system_instruction::transfer(from, to, lamports)
}

pub async fn ping_program<R: DevnetRpc + ?Sized>(
    rpc: &R,
    payer: &Keypair,
    program_id: &Pubkey,
    data_account: &Pubkey,
    explorer: &Explorer,
) -> Result<Signature, WorkflowError> {
    let instruction = ping_instruction(program_id, data_account);
    let signature = send_and_confirm(rpc, &[instruction], payer).await?;

    info!("Transaction {}", explorer.tx_url(&signature));
    Ok(signature)
}

pub async fn send_sol<R: DevnetRpc + ?Sized>(
    rpc: &R,
    lamports: u64,
    to: &Pubkey,
    sender: &Keypair,
    explorer: &Explorer,
) -> Result<Signature, WorkflowError> {
    let instruction = transfer_instruction(&sender.pubkey(), to, lamports);
    let signature = send_and_confirm(rpc, &[instruction], sender).await?;

    info!(
        "You can view your transaction on the Solana Explorer at:\n{}",
        explorer.tx_url(&signature)
    );
    Ok(signature)
}

/// Pubkey of a throwaway keypair, guaranteed not to be `sender`.
pub fn fresh_recipient(sender: &Pubkey) -> Pubkey {
    loop {
        let candidate = Keypair::new().pubkey();
        if candidate != *sender {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::MockDevnetRpc;
    use solana_program::{native_token::LAMPORTS_PER_SOL, system_program};
    use solana_sdk::{hash::Hash, system_instruction::SystemInstruction};

    fn confirming_rpc() -> MockDevnetRpc {
        let mut rpc = MockDevnetRpc::new();
        rpc.expect_get_latest_blockhash()
            .times(1)
            .returning(|| Box::pin(async { Ok((Hash::new_unique(), 500)) }));
        rpc.expect_get_signature_status()
            .times(1)
            .returning(|_| Box::pin(async { Ok(Some(Ok(()))) }));
        rpc
    }

    #[test]
    fn test_ping_instruction_shape() {
        let program_id = Pubkey::new_unique();
        let data_account = Pubkey::new_unique();

        let ix = ping_instruction(&program_id, &data_account);

        assert_eq!(ix.program_id, program_id);
        assert!(ix.data.is_empty());
        assert_eq!(ix.accounts.len(), 1);
        assert_eq!(ix.accounts[0].pubkey, data_account);
        assert!(ix.accounts[0].is_writable);
        assert!(!ix.accounts[0].is_signer);
    }

    #[test]
    fn test_transfer_instruction_moves_lamports() {
        let from = Pubkey::new_unique();
        let to = Pubkey::new_unique();

        let ix = transfer_instruction(&from, &to, LAMPORTS_PER_SOL / 10);

        assert_eq!(ix.program_id, system_program::id());
        assert_eq!(ix.accounts[0].pubkey, from);
        assert!(ix.accounts[0].is_signer);
        assert_eq!(ix.accounts[1].pubkey, to);
        assert!(ix.accounts[1].is_writable);
        let decoded: SystemInstruction = bincode::deserialize(&ix.data).unwrap();
        assert_eq!(
            decoded,
            SystemInstruction::Transfer {
                lamports: 100_000_000
            }
        );
    }

    #[test]
    fn test_fresh_recipient_differs_from_sender() {
        let sender = Keypair::new().pubkey();
        let first = fresh_recipient(&sender);
        let second = fresh_recipient(&sender);

        assert_ne!(first, sender);
        assert_ne!(second, sender);
        assert_ne!(first, second);
    }

    fn devnet() -> Explorer {
        Explorer::new(Cluster::Devnet, Cluster::Devnet.rpc_url())
    }

    #[test]
    fn test_explorer_tx_url() {
        let signature = Signature::default();
        assert_eq!(
            devnet().tx_url(&signature),
            format!("https://explorer.solana.com/tx/{}?cluster=devnet", signature)
        );
        assert_eq!(
            Explorer::new(Cluster::MainnetBeta, Cluster::MainnetBeta.rpc_url()).tx_url(&signature),
            format!("https://explorer.solana.com/tx/{}", signature)
        );
    }

    #[test]
    fn test_localnet_link_uses_configured_rpc_url() {
        let signature = Signature::default();
        let explorer = Explorer::new(Cluster::Localnet, "http://10.0.0.5:9000");

        assert_eq!(
            explorer.tx_url(&signature),
            format!(
                "https://explorer.solana.com/tx/{}?cluster=custom&customUrl=http%3A%2F%2F10.0.0.5%3A9000",
                signature
            )
        );
    }

    #[tokio::test]
    async fn test_ping_program_submits_once() {
        let payer = Keypair::new();
        let program_id = Pubkey::new_unique();
        let data_account = Pubkey::new_unique();

        let mut rpc = confirming_rpc();
        rpc.expect_send_transaction()
            .withf(move |tx| {
                let message = &tx.message;
                message.instructions.len() == 1
                    && message.instructions[0].data.is_empty()
                    && message.account_keys.contains(&program_id)
                    && message.account_keys.contains(&data_account)
            })
            .times(1)
            .returning(|tx| {
                let signature = tx.signatures[0];
                Box::pin(async move { Ok(signature) })
            });

        let signature = ping_program(&rpc, &payer, &program_id, &data_account, &devnet())
            .await
            .unwrap();
        assert_ne!(signature, Signature::default());
    }

    #[tokio::test]
    async fn test_send_sol_failure_propagates() {
        let sender = Keypair::new();

        let mut rpc = MockDevnetRpc::new();
        rpc.expect_get_latest_blockhash()
            .returning(|| Box::pin(async { Ok((Hash::new_unique(), 500)) }));
        rpc.expect_send_transaction().times(1).returning(|_| {
            Box::pin(async {
                Err(WorkflowError::Rpc(
                    "Attempt to debit an account but found no record of a prior credit.".into(),
                ))
            })
        });

        let result = send_sol(
            &rpc,
            LAMPORTS_PER_SOL,
            &Pubkey::new_unique(),
            &sender,
            &devnet(),
        )
        .await;
        assert!(matches!(result, Err(WorkflowError::Rpc(_))));
    }
}
