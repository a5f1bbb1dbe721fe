use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error, debug};

use crate::error::BuySeerError;
use crate::evaluator::{BuyClassifier, BuyEvent};
use crate::monitoring::{AlertFormatter, Notifier};
use super::source::TransactionSource;

/// Loop-owned memory of the last pool signature handled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    pub last_signature: Option<String>,
}

/// Result of one fetch of the pool's latest signature.
#[derive(Debug)]
pub enum PollOutcome {
    /// Pool has no transactions.
    Empty,
    Unchanged,
    New(String),
    Failed(BuySeerError),
}

#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub pool: Pubkey,
    pub alert_image_url: String,
    pub poll_interval: Duration,
    pub error_backoff: Duration,
}

pub struct Poller {
    source: Arc<dyn TransactionSource>,
    notifier: Arc<dyn Notifier>,
    classifier: BuyClassifier,
    formatter: AlertFormatter,
    settings: PollerSettings,
}

impl Poller {
    pub fn new(
        source: Arc<dyn TransactionSource>,
        notifier: Arc<dyn Notifier>,
        classifier: BuyClassifier,
        formatter: AlertFormatter,
        settings: PollerSettings,
    ) -> Self {
        Self {
            source,
            notifier,
            classifier,
            formatter,
            settings,
        }
    }

    /// Sends the liveness message. A failure is logged only.
    pub async fn announce_startup(&self) {
        match self.notifier.send_message(&self.formatter.startup_message()).await {
            Ok(()) => info!("Successfully sent startup message to Telegram"),
            Err(e) => error!("Error sending startup message to Telegram: {}", e),
        }
    }

    /// Polls forever. Each new signature is fully handled before the next poll.
    pub async fn run(&self, mut state: PollState) {
        info!("Starting to poll pool address: {}", self.settings.pool);

        loop {
            let (next, outcome) = self.tick(state).await;
            state = next;

            let delay = self.delay_after(&outcome);
            match &outcome {
                PollOutcome::Failed(e) => {
                    error!("Error polling transactions, retrying in {:?}: {}", delay, e)
                }
                PollOutcome::New(signature) => debug!("Finished handling {}", signature),
                PollOutcome::Empty | PollOutcome::Unchanged => {}
            }
            tokio::time::sleep(delay).await;
        }
    }

    /// One poll cycle: fetch the latest signature and handle it if unseen.
    pub async fn tick(&self, state: PollState) -> (PollState, PollOutcome) {
        let signature = match self.source.latest_signature(&self.settings.pool).await {
            Ok(Some(signature)) => signature,
            Ok(None) => return (state, PollOutcome::Empty),
            Err(e) => return (state, PollOutcome::Failed(e)),
        };

        if state.last_signature.as_deref() == Some(signature.as_str()) {
            return (state, PollOutcome::Unchanged);
        }

        info!("New pool transaction detected: {}", signature);
        let next = PollState {
            last_signature: Some(signature.clone()),
        };
        self.handle_transaction(&signature).await;

        (next, PollOutcome::New(signature))
    }

    pub fn delay_after(&self, outcome: &PollOutcome) -> Duration {
        match outcome {
            PollOutcome::Failed(_) => self.settings.error_backoff,
            _ => self.settings.poll_interval,
        }
    }

    /// Fetches, classifies and announces one transaction. Returns the buy, if any.
    pub async fn handle_transaction(&self, signature: &str) -> Option<BuyEvent> {
        let snapshot = match self.source.fetch_transaction(signature).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                info!("No transaction data found for {}", signature);
                return None;
            }
            Err(e) => {
                error!("Error processing transaction {}: {}", signature, e);
                return None;
            }
        };

        debug!("Fetched transaction {} at slot {}", signature, snapshot.slot);

        let event = self.classifier.buy_event(&snapshot)?;
        self.notify(&event).await;
        Some(event)
    }

    async fn notify(&self, event: &BuyEvent) {
        let caption = self.formatter.caption(event);

        match self.notifier.send_photo(&self.settings.alert_image_url, &caption).await {
            Ok(()) => info!(
                "Buy notification sent for transaction: {} (detected at {})",
                event.signature, event.detected_at
            ),
            Err(e) => error!("Error sending Telegram notification for {}: {}", event.signature, e),
        }
    }
}
