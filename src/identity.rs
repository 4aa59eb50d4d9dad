//! Keypair provisioning.
//!
//! The secret lives in a dotenv file as `PRIVATE_KEY=[..64 bytes..]`, which
//! `dotenvy` loads into the environment on the next run.
use log::info;
use solana_sdk::signature::{Keypair, Signer};
use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::PathBuf,
};

use crate::{funding::airdrop_if_needed, rpc::DevnetRpc, WorkflowError};

pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Loaded,
    Generated,
}

#[derive(Debug, Clone)]
pub struct KeyStore {
    pub path: PathBuf,
    pub secret: Option<String>,
}

impl KeyStore {
    pub fn new(path: impl Into<PathBuf>, secret: Option<String>) -> Self {
        Self {
            path: path.into(),
            secret,
        }
    }

    /// Parses the stored secret, or generates a keypair and persists it.
    pub fn load_or_create(&self) -> Result<(Keypair, Provisioned), WorkflowError> {
        match &self.secret {
            Some(secret) => Ok((parse_secret(secret)?, Provisioned::Loaded)),
            None => {
                info!("Generating new keypair...");
                let keypair = Keypair::new();
                self.persist(&keypair)?;
                Ok((keypair, Provisioned::Generated))
            }
        }
    }

    /// Rewrites the key file with the new secret, dropping any earlier
    /// `PRIVATE_KEY` lines and keeping every other line.
    fn persist(&self, keypair: &Keypair) -> Result<(), WorkflowError> {
        info!("Writing secret key to {}", self.path.display());

        let existing = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let mut contents = String::new();
        for line in existing.lines().filter(|l| !is_secret_line(l)) {
            contents.push_str(line);
            contents.push('\n');
        }
        contents.push_str(&secret_line(keypair));
        contents.push('\n');

        let mut options = OpenOptions::new();
        options.write(true).truncate(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}

fn is_secret_line(line: &str) -> bool {
    let line = line.trim_start();
    let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
    line.strip_prefix(PRIVATE_KEY_VAR)
        .map(|rest| rest.trim_start().starts_with('='))
        .unwrap_or(false)
}

/// `PRIVATE_KEY=[b0,b1,...]`
pub fn secret_line(keypair: &Keypair) -> String {
    let bytes = keypair.to_bytes();
    let encoded = bytes
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("{}=[{}]", PRIVATE_KEY_VAR, encoded)
}

pub fn parse_secret(secret: &str) -> Result<Keypair, WorkflowError> {
    let bytes: Vec<u8> = serde_json::from_str(secret.trim())
        .map_err(|e| WorkflowError::MalformedSecret(e.to_string()))?;
    Keypair::from_bytes(&bytes).map_err(|e| WorkflowError::MalformedSecret(e.to_string()))
}

/// Returns the payer keypair, funded to at least the airdrop threshold.
pub async fn initialize_keypair<R: DevnetRpc + ?Sized>(
    rpc: &R,
    store: &KeyStore,
) -> Result<Keypair, WorkflowError> {
    let (keypair, provisioned) = store.load_or_create()?;
    info!("Using {:?} keypair {}", provisioned, keypair.pubkey());

    airdrop_if_needed(rpc, &keypair.pubkey()).await?;
    Ok(keypair)
}
