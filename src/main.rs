mod config;
mod error;
mod evaluator;
mod monitoring;
mod pool_watch;

use anyhow::{Result, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use solana_sdk::commitment_config::CommitmentConfig;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use evaluator::{BuyClassifier, ClassifierSettings};
use monitoring::{AlertFormatter, TelegramNotifier};
use pool_watch::{PollState, Poller, PollerSettings, RpcTransactionSource};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the pool and announce token buys (default)
    Start,
    /// Check RPC connectivity and configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logging
    let level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|value| Level::from_str(&value).ok())
        .unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    info!("Starting BuySeer - pool buy alerts");

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Start) | None => run_buyseer().await?,
        Some(Commands::Check) => config::check_config().await?,
    }

    Ok(())
}

async fn run_buyseer() -> Result<()> {
    info!("Loading configuration...");
    let config = config::load_config().await?;
    config.validate()?;

    let token_mint = config.token_mint()?;
    info!("Tracking token {} ({})", config.token_symbol, token_mint);
    if let Some(quote) = &config.quote_token_mint {
        info!("Quote token: {}", quote);
    }

    let source = Arc::new(RpcTransactionSource::new(
        &config.rpc_url,
        CommitmentConfig::confirmed(),
    ));
    let notifier = Arc::new(TelegramNotifier::new(
        config.telegram_bot_token.clone(),
        config.telegram_chat_id.clone(),
    ));
    if !notifier.is_enabled() {
        warn!("Telegram is not configured - buys will only be logged");
    }

    let classifier = BuyClassifier::new(token_mint.to_string(), ClassifierSettings::default());
    let formatter = AlertFormatter::new(config.token_symbol.clone(), config.explorer_tx_url.clone());

    let poller = Poller::new(
        source,
        notifier,
        classifier,
        formatter,
        PollerSettings {
            pool: config.pool_address()?,
            alert_image_url: config.alert_image_url.clone(),
            poll_interval: config.poll_interval(),
            error_backoff: config.error_backoff(),
        },
    );

    poller.announce_startup().await;

    info!("BuySeer is running. Monitoring pool for buys...");
    poller.run(PollState::default()).await;

    Ok(())
}
