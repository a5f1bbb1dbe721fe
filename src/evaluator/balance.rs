use solana_sdk::native_token::LAMPORTS_PER_SOL;

use crate::pool_watch::TokenBalanceEntry;

/// Change of one account's balance within a transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceDelta {
    pub account_index: usize,
    pub change: f64,
}

/// SOL leaving each account: `(pre - post) / 1e9`. Positive means the account paid.
pub fn native_deltas(pre_balances: &[u64], post_balances: &[u64]) -> Vec<BalanceDelta> {
    pre_balances
        .iter()
        .zip(post_balances)
        .enumerate()
        .map(|(account_index, (&pre, &post))| BalanceDelta {
            account_index,
            change: (pre as i128 - post as i128) as f64 / LAMPORTS_PER_SOL as f64,
        })
        .collect()
}

/// Largest SOL outflow of any account, floored at zero.
pub fn value_spent(native: &[BalanceDelta]) -> f64 {
    native
        .iter()
        .fold(0.0, |max, delta| if delta.change > max { delta.change } else { max })
}

/// Token gained by each account holding `mint` after the transaction: `post - pre`.
/// Accounts without a pre balance started from zero.
pub fn token_deltas(
    pre_balances: &[TokenBalanceEntry],
    post_balances: &[TokenBalanceEntry],
    mint: &str,
) -> Vec<BalanceDelta> {
    post_balances
        .iter()
        .filter(|post| post.mint == mint)
        .map(|post| {
            let pre = pre_balances
                .iter()
                .find(|pre| pre.account_index == post.account_index)
                .map(|pre| pre.ui_amount)
                .unwrap_or(0.0);

            BalanceDelta {
                account_index: post.account_index,
                change: post.ui_amount - pre,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINT: &str = "R8mint1111111111111111111111111111111111111";
    const OTHER: &str = "So11111111111111111111111111111111111111112";

    #[test]
    fn native_delta_is_scaled_outflow() {
        let deltas = native_deltas(&[1_000_000_000, 500_000_000], &[700_000_000, 500_000_000]);
        assert_eq!(
            deltas,
            vec![
                BalanceDelta { account_index: 0, change: 0.3 },
                BalanceDelta { account_index: 1, change: 0.0 },
            ]
        );
    }

    #[test]
    fn native_delta_negative_when_balance_grows() {
        let deltas = native_deltas(&[100_000_000], &[350_000_000]);
        assert_eq!(deltas[0].change, -0.25);
    }

    #[test]
    fn fee_residual_is_non_negative() {
        // payer sends 0.2 SOL to the pool and pays a 5000 lamport fee
        let pre = [1_000_000_000, 2_000_000_000, 1];
        let post = [799_995_000, 2_200_000_000, 1];
        let total: f64 = native_deltas(&pre, &post).iter().map(|d| d.change).sum();
        assert!(total >= 0.0);
        assert!((total - 0.000005).abs() < 1e-12);
    }

    #[test]
    fn value_spent_floors_at_zero() {
        let gains = native_deltas(&[1, 2], &[5, 9]);
        assert_eq!(value_spent(&gains), 0.0);
        assert_eq!(value_spent(&[]), 0.0);

        let mixed = native_deltas(&[900_000_000, 10], &[600_000_000, 20]);
        assert_eq!(value_spent(&mixed), 0.3);
    }

    #[test]
    fn token_deltas_only_track_mint() {
        let pre = vec![
            TokenBalanceEntry::new(2, MINT, 1_000.0),
            TokenBalanceEntry::new(4, OTHER, 7.0),
        ];
        let post = vec![
            TokenBalanceEntry::new(1, MINT, 150.0),
            TokenBalanceEntry::new(2, MINT, 850.0),
            TokenBalanceEntry::new(4, OTHER, 1.0),
        ];

        let deltas = token_deltas(&pre, &post, MINT);
        assert_eq!(
            deltas,
            vec![
                BalanceDelta { account_index: 1, change: 150.0 },
                BalanceDelta { account_index: 2, change: -150.0 },
            ]
        );
        assert!(token_deltas(&pre, &post, "unknown").is_empty());
    }
}
