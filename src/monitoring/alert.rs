use crate::evaluator::BuyEvent;

/// SOL per intensity marker.
pub const SOL_PER_MARKER: f64 = 0.04;
/// Keeps the caption under Telegram's 1024 character limit.
pub const MAX_MARKERS: usize = 100;
const MARKER: &str = "🟢";

pub struct AlertFormatter {
    token_symbol: String,
    explorer_tx_url: String,
}

impl AlertFormatter {
    pub fn new(token_symbol: impl Into<String>, explorer_tx_url: impl Into<String>) -> Self {
        Self {
            token_symbol: token_symbol.into(),
            explorer_tx_url: explorer_tx_url.into(),
        }
    }

    /// Markdown caption posted with the alert image.
    pub fn caption(&self, event: &BuyEvent) -> String {
        format!(
            "🚀 New {symbol} Token Buy! 🚀\n\n\
            {markers}\n\n\
            Value: {value:.3} SOL\n\
            Buy Amount: {amount} {symbol}\n\
            [txn hash]({explorer}{signature})",
            symbol = self.token_symbol,
            markers = intensity_markers(event.value_spent),
            value = event.value_spent,
            amount = group_digits(event.amount_bought),
            explorer = self.explorer_tx_url,
            signature = event.signature,
        )
    }

    pub fn startup_message(&self) -> String {
        format!("Bot is now monitoring {} token trades...", self.token_symbol)
    }
}

/// One marker per 0.04 SOL, between one and `MAX_MARKERS`.
pub fn marker_count(value_spent: f64) -> usize {
    let count = (value_spent / SOL_PER_MARKER).floor();
    if count >= MAX_MARKERS as f64 {
        MAX_MARKERS
    } else if count >= 1.0 {
        count as usize
    } else {
        1
    }
}

pub fn intensity_markers(value_spent: f64) -> String {
    MARKER.repeat(marker_count(value_spent))
}

/// Thousands-separated amount with at most three fraction digits, e.g. `1,234,567.891`.
pub fn group_digits(amount: f64) -> String {
    let rounded = format!("{:.3}", amount.abs());
    let (whole, fraction) = match rounded.split_once('.') {
        Some((whole, fraction)) => (whole, fraction.trim_end_matches('0')),
        None => (rounded.as_str(), ""),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + fraction.len() + 2);
    if amount < 0.0 && (whole != "0" || !fraction.is_empty()) {
        grouped.push('-');
    }
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if !fraction.is_empty() {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(amount_bought: f64, value_spent: f64) -> BuyEvent {
        BuyEvent {
            signature: "5abc".to_string(),
            amount_bought,
            value_spent,
            detected_at: Utc::now(),
        }
    }

    #[test]
    fn marker_count_floors_with_minimum() {
        assert_eq!(marker_count(0.3), 7);
        assert_eq!(marker_count(0.0), 1);
        assert_eq!(marker_count(0.039), 1);
        assert_eq!(marker_count(0.08), 2);
        assert_eq!(marker_count(1.0), 25);
    }

    #[test]
    fn whale_buy_caption_fits_telegram_limit() {
        assert_eq!(marker_count(4.0), MAX_MARKERS);
        assert_eq!(marker_count(250.0), MAX_MARKERS);
        assert_eq!(marker_count(f64::INFINITY), MAX_MARKERS);

        let formatter = AlertFormatter::new("R8", "https://solscan.io/tx/");
        let signature = "5".repeat(88);
        let caption = formatter.caption(&BuyEvent {
            signature,
            amount_bought: 123_456_789.123,
            value_spent: 1_000.0,
            detected_at: Utc::now(),
        });
        assert!(caption.encode_utf16().count() <= 1024);
    }

    #[test]
    fn groups_digits() {
        assert_eq!(group_digits(150.0), "150");
        assert_eq!(group_digits(1_000.0), "1,000");
        assert_eq!(group_digits(1_234_567.891), "1,234,567.891");
        assert_eq!(group_digits(1_234.5678), "1,234.568");
        assert_eq!(group_digits(12_345.5), "12,345.5");
        assert_eq!(group_digits(0.0), "0");
        assert_eq!(group_digits(-2_500.25), "-2,500.25");
    }

    #[test]
    fn caption_layout() {
        let formatter = AlertFormatter::new("R8", "https://solscan.io/tx/");
        let caption = formatter.caption(&event(150.0, 0.3));

        assert_eq!(
            caption,
            format!(
                "🚀 New R8 Token Buy! 🚀\n\n{}\n\nValue: 0.300 SOL\nBuy Amount: 150 R8\n[txn hash](https://solscan.io/tx/5abc)",
                "🟢".repeat(7)
            )
        );
    }

    #[test]
    fn startup_message_names_token() {
        let formatter = AlertFormatter::new("R8", "https://solscan.io/tx/");
        assert_eq!(formatter.startup_message(), "Bot is now monitoring R8 token trades...");
    }
}
