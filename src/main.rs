use color_eyre::Result;
use devnet_ping::{
    config::key_file_path, logging::setup_logging, rpc::SolanaRpc, run, Config,
};
use log::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // The key file doubles as the dotenv file, so a stored PRIVATE_KEY is
    // picked up here. A missing file just means a fresh keypair.
    let key_file = key_file_path(&|key: &str| std::env::var(key).ok());
    dotenvy::from_path(&key_file).ok();

    setup_logging()?;

    let config = Config::from_env()?;
    info!("Connecting to {} ({})", config.rpc_url, config.cluster);
    let rpc = SolanaRpc::new(config.rpc_url.clone());

    match run(&rpc, &config).await {
        Ok(summary) => {
            info!(
                "Pinged with {} and sent {} lamports to {} in {}",
                summary.ping_signature,
                config.transfer_lamports,
                summary.recipient,
                summary.transfer_signature
            );
            info!("Finished successfully");
            Ok(())
        }
        Err(e) => {
            error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}
