use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, error, debug};

use crate::error::{BuySeerError, Result};

const TELEGRAM_API: &str = "https://api.telegram.org";

/// Outbound channel for alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<()>;

    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramNotifier {
    bot_token: Option<String>,
    chat_id: Option<String>,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(bot_token: Option<String>, chat_id: Option<String>) -> Self {
        Self {
            bot_token,
            chat_id,
            client: Client::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }

    fn method_url(bot_token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", TELEGRAM_API, bot_token, method)
    }

    async fn call(&self, method: &str, params: &[(&str, &str)]) -> Result<()> {
        // Check if Telegram integration is configured
        let (bot_token, chat_id) = match (&self.bot_token, &self.chat_id) {
            (Some(token), Some(chat)) => (token, chat),
            _ => {
                info!("Telegram {} skipped: Bot token or chat ID not configured", method);
                return Ok(());
            }
        };

        let mut form: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 1);
        form.push(("chat_id", chat_id.as_str()));
        form.extend_from_slice(params);

        let response = self.client
            .post(Self::method_url(bot_token, method))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Telegram {} failed with status {}: {}", method, status, body);
            return Err(BuySeerError::telegram_error(format!("{} returned {}: {}", method, status, body)));
        }

        let parsed: TelegramResponse = serde_json::from_str(&body)
            .map_err(|e| BuySeerError::decode_error(format!("Telegram {} response: {}", method, e)))?;
        if !parsed.ok {
            let reason = parsed.description.unwrap_or_else(|| "unknown error".to_string());
            return Err(BuySeerError::telegram_error(format!("{} rejected: {}", method, reason)));
        }

        debug!("Telegram {} succeeded", method);
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, text: &str) -> Result<()> {
        self.call("sendMessage", &[("text", text)]).await
    }

    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<()> {
        self.call(
            "sendPhoto",
            &[
                ("photo", photo_url),
                ("caption", caption),
                ("parse_mode", "Markdown"),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_bot_api_url() {
        assert_eq!(
            TelegramNotifier::method_url("123:abc", "sendPhoto"),
            "https://api.telegram.org/bot123:abc/sendPhoto"
        );
    }

    #[test]
    fn enabled_only_with_both_credentials() {
        assert!(!TelegramNotifier::new(Some("t".into()), None).is_enabled());
        assert!(!TelegramNotifier::new(None, Some("c".into())).is_enabled());
        assert!(TelegramNotifier::new(Some("t".into()), Some("c".into())).is_enabled());
    }

    #[tokio::test]
    async fn unconfigured_sends_are_noops() {
        let notifier = TelegramNotifier::new(None, None);
        assert!(notifier.send_message("hello").await.is_ok());
        assert!(notifier.send_photo("https://img", "caption").await.is_ok());
    }

    #[test]
    fn parses_api_error_body() {
        let parsed: TelegramResponse =
            serde_json::from_str(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#)
                .unwrap();
        assert!(!parsed.ok);
        assert_eq!(parsed.description.as_deref(), Some("Bad Request: chat not found"));
    }
}
