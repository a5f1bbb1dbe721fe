use serde::{Deserialize, Serialize};
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, UiTransactionStatusMeta, UiTransactionTokenBalance,
};

/// Token balance of one account, before or after a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalanceEntry {
    pub account_index: usize,
    pub mint: String,
    pub ui_amount: f64,
}

impl TokenBalanceEntry {
    #[cfg(test)]
    pub fn new(account_index: usize, mint: impl Into<String>, ui_amount: f64) -> Self {
        Self {
            account_index,
            mint: mint.into(),
            ui_amount,
        }
    }
}

impl From<UiTransactionTokenBalance> for TokenBalanceEntry {
    fn from(balance: UiTransactionTokenBalance) -> Self {
        let amount = balance.ui_token_amount;
        let ui_amount = amount
            .ui_amount
            .or_else(|| amount.ui_amount_string.parse::<f64>().ok())
            .unwrap_or(0.0);

        Self {
            account_index: balance.account_index as usize,
            mint: balance.mint,
            ui_amount,
        }
    }
}

/// Balance snapshots of a confirmed transaction, native and token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionSnapshot {
    pub signature: String,
    pub slot: u64,
    /// Lamports per account index.
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    pub pre_token_balances: Vec<TokenBalanceEntry>,
    pub post_token_balances: Vec<TokenBalanceEntry>,
}

impl TransactionSnapshot {
    /// Returns `None` when the node sent the transaction without status meta.
    pub fn from_encoded(
        signature: &str,
        transaction: EncodedConfirmedTransactionWithStatusMeta,
    ) -> Option<Self> {
        let meta = transaction.transaction.meta?;
        Some(Self::from_meta(signature, transaction.slot, meta))
    }

    pub fn from_meta(signature: &str, slot: u64, meta: UiTransactionStatusMeta) -> Self {
        let pre_token_balances: Option<Vec<UiTransactionTokenBalance>> =
            meta.pre_token_balances.into();
        let post_token_balances: Option<Vec<UiTransactionTokenBalance>> =
            meta.post_token_balances.into();

        Self {
            signature: signature.to_string(),
            slot,
            pre_balances: meta.pre_balances,
            post_balances: meta.post_balances,
            pre_token_balances: pre_token_balances
                .unwrap_or_default()
                .into_iter()
                .map(TokenBalanceEntry::from)
                .collect(),
            post_token_balances: post_token_balances
                .unwrap_or_default()
                .into_iter()
                .map(TokenBalanceEntry::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MINT: &str = "So11111111111111111111111111111111111111112";

    #[test]
    fn converts_status_meta() {
        let meta: UiTransactionStatusMeta = serde_json::from_value(json!({
            "err": null,
            "status": { "Ok": null },
            "fee": 5000,
            "preBalances": [1_000_000_000u64, 500_000_000u64],
            "postBalances": [700_000_000u64, 500_000_000u64],
            "preTokenBalances": [],
            "postTokenBalances": [{
                "accountIndex": 1,
                "mint": MINT,
                "uiTokenAmount": {
                    "uiAmount": 150.0,
                    "decimals": 6,
                    "amount": "150000000",
                    "uiAmountString": "150"
                }
            }]
        }))
        .unwrap();

        let snapshot = TransactionSnapshot::from_meta("sig", 42, meta);
        assert_eq!(snapshot.slot, 42);
        assert_eq!(snapshot.pre_balances, vec![1_000_000_000, 500_000_000]);
        assert_eq!(snapshot.post_balances, vec![700_000_000, 500_000_000]);
        assert!(snapshot.pre_token_balances.is_empty());
        assert_eq!(
            snapshot.post_token_balances,
            vec![TokenBalanceEntry::new(1, MINT, 150.0)]
        );
    }

    #[test]
    fn missing_token_lists_become_empty() {
        let meta: UiTransactionStatusMeta = serde_json::from_value(json!({
            "err": null,
            "status": { "Ok": null },
            "fee": 5000,
            "preBalances": [10u64],
            "postBalances": [5u64]
        }))
        .unwrap();

        let snapshot = TransactionSnapshot::from_meta("sig", 1, meta);
        assert!(snapshot.pre_token_balances.is_empty());
        assert!(snapshot.post_token_balances.is_empty());
        assert_eq!(snapshot.pre_balances, vec![10]);
    }

    #[test]
    fn null_ui_amount_falls_back_to_string() {
        let balance: UiTransactionTokenBalance = serde_json::from_value(json!({
            "accountIndex": 3,
            "mint": MINT,
            "uiTokenAmount": {
                "uiAmount": null,
                "decimals": 2,
                "amount": "12345",
                "uiAmountString": "123.45"
            }
        }))
        .unwrap();

        let entry = TokenBalanceEntry::from(balance);
        assert_eq!(entry.account_index, 3);
        assert_eq!(entry.ui_amount, 123.45);
    }
}
