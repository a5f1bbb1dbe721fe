use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::pool_watch::TransactionSnapshot;
use super::balance::{native_deltas, token_deltas, value_spent, BalanceDelta};

/// Account indices ignored when looking for SOL movements: the pool vault and
/// the fee account of this pool program's instruction layout.
pub const EXCLUDED_ACCOUNT_INDICES: [usize; 2] = [3, 7];

/// SOL movements at or below this size are noise (fees, rent).
pub const SIGNIFICANT_SOL_CHANGE: f64 = 0.01;

/// Token gains must be strictly above this to count as a buy.
pub const MIN_TOKEN_BUY: f64 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierSettings {
    pub excluded_accounts: Vec<usize>,
    pub significant_sol_change: f64,
    pub min_token_amount: f64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            excluded_accounts: EXCLUDED_ACCOUNT_INDICES.to_vec(),
            significant_sol_change: SIGNIFICANT_SOL_CHANGE,
            min_token_amount: MIN_TOKEN_BUY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub is_buy: bool,
    pub amount_bought: f64,
    pub value_spent: f64,
    /// Account that received the reported tokens.
    pub buyer_account: Option<usize>,
    /// SOL outflow of `buyer_account`.
    pub buyer_sol_change: f64,
}

impl ClassificationResult {
    fn not_buy(value_spent: f64) -> Self {
        Self {
            is_buy: false,
            amount_bought: 0.0,
            value_spent,
            buyer_account: None,
            buyer_sol_change: 0.0,
        }
    }
}

/// A confirmed purchase of the tracked token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyEvent {
    pub signature: String,
    pub amount_bought: f64,
    pub value_spent: f64,
    pub detected_at: DateTime<Utc>,
}

pub struct BuyClassifier {
    token_mint: String,
    settings: ClassifierSettings,
}

impl BuyClassifier {
    pub fn new(token_mint: impl Into<String>, settings: ClassifierSettings) -> Self {
        Self {
            token_mint: token_mint.into(),
            settings,
        }
    }

    pub fn classify(&self, snapshot: &TransactionSnapshot) -> ClassificationResult {
        let sol_changes = native_deltas(&snapshot.pre_balances, &snapshot.post_balances);
        let sol_spent = value_spent(&sol_changes);

        let moved: Vec<&BalanceDelta> = sol_changes.iter().filter(|d| d.change != 0.0).collect();
        debug!("SOL changes: {:?}", moved);
        debug!("Total SOL spent: {}", sol_spent);

        let token_changes = token_deltas(
            &snapshot.pre_token_balances,
            &snapshot.post_token_balances,
            &self.token_mint,
        );
        debug!("Token balance changes: {:?}", token_changes);

        if !self.is_buy_pattern(&sol_changes) {
            info!("No buy detected - likely a sell or other transaction");
            return ClassificationResult::not_buy(sol_spent);
        }

        let largest = token_changes
            .iter()
            .filter(|d| d.change > self.settings.min_token_amount)
            .fold(None::<&BalanceDelta>, |best, d| match best {
                Some(b) if b.change >= d.change => Some(b),
                _ => Some(d),
            });

        let Some(largest) = largest else {
            debug!(
                "SOL pattern matches a buy but no account gained more than {} tokens",
                self.settings.min_token_amount
            );
            return ClassificationResult::not_buy(sol_spent);
        };

        let buyer_sol_change = sol_changes
            .iter()
            .find(|d| d.account_index == largest.account_index)
            .map(|d| d.change)
            .unwrap_or(0.0);

        info!("Buy detected: {} tokens for {} SOL", largest.change, sol_spent);

        ClassificationResult {
            is_buy: true,
            amount_bought: largest.change,
            value_spent: sol_spent,
            buyer_account: Some(largest.account_index),
            buyer_sol_change,
        }
    }

    /// Full classification of `snapshot`, reduced to the event worth announcing.
    pub fn buy_event(&self, snapshot: &TransactionSnapshot) -> Option<BuyEvent> {
        let result = self.classify(snapshot);
        if result.is_buy {
            debug!(
                "Buyer account {:?} SOL change {}",
                result.buyer_account, result.buyer_sol_change
            );
        }
        result.is_buy.then(|| BuyEvent {
            signature: snapshot.signature.clone(),
            amount_bought: result.amount_bought,
            value_spent: result.value_spent,
            detected_at: Utc::now(),
        })
    }

    /// SOL left a participant and no participant was paid out.
    fn is_buy_pattern(&self, sol_changes: &[BalanceDelta]) -> bool {
        let significant = sol_changes.iter().filter(|d| {
            d.change.abs() > self.settings.significant_sol_change
                && !self.settings.excluded_accounts.contains(&d.account_index)
        });

        let mut spent = false;
        let mut received = false;
        for delta in significant {
            if delta.change > 0.0 {
                spent = true;
            } else {
                received = true;
            }
        }

        spent && !received
    }
}
