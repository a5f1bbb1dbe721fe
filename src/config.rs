use anyhow::{Result, Context};
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::pool_watch::{RpcTransactionSource, TransactionSource};

/// Liquidity pool watched for buys. Not configurable.
pub const POOL_ADDRESS: &str = "6xWD98hkRS8oD6umr82GAcseBnpyXYGyKrR9Y2gC76tP";

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rpc_url: String,
    pub token_mint: Option<String>,
    pub quote_token_mint: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,

    // Alert presentation
    pub token_symbol: String,
    pub alert_image_url: String,
    pub explorer_tx_url: String,

    // Poll loop timing
    pub poll_interval_ms: u64,
    pub error_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            token_mint: None,
            quote_token_mint: None,
            telegram_bot_token: None,
            telegram_chat_id: None,
            token_symbol: "R8".to_string(),
            alert_image_url: "https://freeimage.host/i/r8buybot.2yhsSzG".to_string(),
            explorer_tx_url: "https://solscan.io/tx/".to_string(),
            poll_interval_ms: 2_000,
            error_backoff_ms: 5_000,
        }
    }
}

impl Config {
    /// Mint of the token whose buys are reported.
    pub fn token_mint(&self) -> Result<Pubkey> {
        let mint = self
            .token_mint
            .as_deref()
            .context("YOUR_TOKEN_ADDRESS environment variable not set")?;
        Pubkey::from_str(mint).with_context(|| format!("Invalid token mint address: {}", mint))
    }

    pub fn pool_address(&self) -> Result<Pubkey> {
        Pubkey::from_str(POOL_ADDRESS).context("Invalid pool address")
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }

    pub fn telegram_configured(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }

    /// Checks everything the monitor needs before it starts polling.
    pub fn validate(&self) -> Result<()> {
        self.token_mint()?;
        self.pool_address()?;
        if let Some(quote) = &self.quote_token_mint {
            Pubkey::from_str(quote)
                .with_context(|| format!("Invalid quote token mint address: {}", quote))?;
        }
        if self.poll_interval_ms == 0 {
            anyhow::bail!("Poll interval must be greater than zero");
        }
        Ok(())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

pub async fn load_config() -> Result<Config> {
    let mut config = Config::default();

    // Override defaults with environment variables
    if let Some(rpc_url) = non_empty_var("SOLANA_RPC_URL") {
        config.rpc_url = rpc_url;
    }

    config.token_mint = non_empty_var("YOUR_TOKEN_ADDRESS");
    config.quote_token_mint = non_empty_var("VIRTUALS_TOKEN_ADDRESS");
    config.telegram_bot_token = non_empty_var("TELEGRAM_BOT_TOKEN");
    config.telegram_chat_id = non_empty_var("TELEGRAM_CHANNEL_ID");

    if let Some(symbol) = non_empty_var("TOKEN_SYMBOL") {
        config.token_symbol = symbol;
    }

    if let Some(image_url) = non_empty_var("ALERT_IMAGE_URL") {
        config.alert_image_url = image_url;
    }

    Ok(config)
}

/// Probes the RPC endpoint and reports on the loaded settings without starting the monitor.
pub async fn check_config() -> Result<()> {
    info!("Checking configuration...");

    let config = load_config().await?;

    match config.token_mint() {
        Ok(mint) => info!("Tracking token mint: {}", mint),
        Err(e) => warn!("Token mint is not usable: {:#}", e),
    }

    if let Some(quote) = &config.quote_token_mint {
        info!("Quote token mint: {}", quote);
    }

    if config.telegram_configured() {
        info!("Telegram notifications are configured");
    } else {
        warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHANNEL_ID is missing - alerts will not be delivered");
    }

    info!("Connecting to Solana RPC at: {}", config.rpc_url);
    let source = RpcTransactionSource::new(&config.rpc_url, CommitmentConfig::confirmed());

    match source.node_version().await {
        Ok(version) => info!("Connected to Solana node version: {}", version),
        Err(e) => warn!("Could not connect to Solana RPC: {}", e),
    }

    let pool = config.pool_address()?;
    match source.latest_signature(&pool).await {
        Ok(Some(signature)) => info!("Latest pool transaction: {}", signature),
        Ok(None) => warn!("Pool {} has no transactions yet", pool),
        Err(e) => warn!("Could not fetch pool signatures: {}", e),
    }

    info!("Configuration check finished");
    Ok(())
}
