//! Runtime configuration read from environment variables.
//!
//! Environment variables used:
//! - CLUSTER: "devnet" (default), "testnet", "mainnet-beta" or "localnet"
//! - RPC_URL: endpoint override; defaults to the cluster's public endpoint
//! - KEY_FILE: dotenv file holding the generated secret (default ".env")
//! - PRIVATE_KEY: secret key as a JSON byte array
//! - PROGRAM_ID / PROGRAM_DATA_ACCOUNT: ping target and its data account
//! - TRANSFER_LAMPORTS: amount sent to the fresh recipient (default 0.1 SOL)

use std::{env, fmt, path::PathBuf, str::FromStr};

use solana_sdk::pubkey::Pubkey;

use crate::{
    WorkflowError, DEFAULT_PROGRAM_DATA_ACCOUNT, DEFAULT_PROGRAM_ID, DEFAULT_TRANSFER_LAMPORTS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cluster {
    Devnet,
    Testnet,
    MainnetBeta,
    Localnet,
}

impl Cluster {
    /// Public JSON-RPC endpoint of the cluster.
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Cluster::Localnet => "http://127.0.0.1:8899",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Localnet => "localnet",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cluster {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet-beta" | "mainnet" => Ok(Cluster::MainnetBeta),
            "localnet" | "localhost" => Ok(Cluster::Localnet),
            other => Err(WorkflowError::Config(format!("unknown cluster '{}'", other))),
        }
    }
}

pub const DEFAULT_KEY_FILE: &str = ".env";

#[derive(Debug, Clone)]
pub struct Config {
    pub cluster: Cluster,
    pub rpc_url: String,
    pub key_file: PathBuf,
    pub private_key: Option<String>,
    pub program_id: Pubkey,
    pub program_data_account: Pubkey,
    pub transfer_lamports: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, WorkflowError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WorkflowError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset, the way an empty `KEY=` line reads.
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let cluster = match var("CLUSTER") {
            Some(name) => name.parse()?,
            None => Cluster::Devnet,
        };
        let rpc_url = var("RPC_URL").unwrap_or_else(|| cluster.rpc_url().to_string());
        let key_file = key_file_path(&lookup);

        let program_id = parse_pubkey("PROGRAM_ID", var("PROGRAM_ID"), DEFAULT_PROGRAM_ID)?;
        let program_data_account = parse_pubkey(
            "PROGRAM_DATA_ACCOUNT",
            var("PROGRAM_DATA_ACCOUNT"),
            DEFAULT_PROGRAM_DATA_ACCOUNT,
        )?;

        let transfer_lamports = match var("TRANSFER_LAMPORTS") {
            Some(raw) => raw.trim().replace('_', "").parse().map_err(|e| {
                WorkflowError::Config(format!("TRANSFER_LAMPORTS '{}': {}", raw, e))
            })?,
            None => DEFAULT_TRANSFER_LAMPORTS,
        };

        Ok(Self {
            cluster,
            rpc_url,
            key_file,
            private_key: var("PRIVATE_KEY"),
            program_id,
            program_data_account,
            transfer_lamports,
        })
    }
}

/// Key file location, shared by the dotenv loader and `Config`. A blank
/// `KEY_FILE` falls back to the default like an unset one.
pub fn key_file_path<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup("KEY_FILE")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_FILE))
}

fn parse_pubkey(
    name: &str,
    value: Option<String>,
    default: &str,
) -> Result<Pubkey, WorkflowError> {
    let raw = value.unwrap_or_else(|| default.to_string());
    Pubkey::from_str(raw.trim())
        .map_err(|e| WorkflowError::Config(format!("{} '{}': {}", name, raw, e)))
}
