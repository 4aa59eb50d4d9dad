use solana_client::client_error::ClientError;
use solana_sdk::{signature::Signature, transaction::TransactionError};
use thiserror::Error;

/// Everything that can abort a run. Nothing here is retried.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed secret key: {0}")]
    MalformedSecret(String),

    #[error("Failed to write key file: {0}")]
    KeyFile(#[from] std::io::Error),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Airdrop rejected: {0}")]
    AirdropRejected(String),

    #[error("Transaction {signature} failed: {error}")]
    TransactionFailed {
        signature: Signature,
        error: TransactionError,
    },

    #[error("Transaction {signature} not confirmed before block height {last_valid_block_height}")]
    BlockhashExpired {
        signature: Signature,
        last_valid_block_height: u64,
    },
}

impl From<ClientError> for WorkflowError {
    fn from(error: ClientError) -> Self {
        WorkflowError::Rpc(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_message_names_signature_and_height() {
        let signature = Signature::default();
        let err = WorkflowError::BlockhashExpired {
            signature,
            last_valid_block_height: 42,
        };

        let msg = err.to_string();
        assert!(msg.contains(&signature.to_string()));
        assert!(msg.contains("42"));
    }

    #[test]
    fn test_io_error_converts_to_key_file() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: WorkflowError = io.into();
        assert!(matches!(err, WorkflowError::KeyFile(_)));
    }
}
