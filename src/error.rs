use thiserror::Error;
use solana_client::client_error::ClientError;

#[derive(Error, Debug)]
pub enum BuySeerError {
    #[error("RPC error: {0}")]
    Rpc(#[from] ClientError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram error: {0}")]
    Telegram(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl BuySeerError {
    pub fn telegram_error(msg: impl Into<String>) -> Self {
        Self::Telegram(msg.into())
    }

    pub fn invalid_signature(msg: impl Into<String>) -> Self {
        Self::InvalidSignature(msg.into())
    }

    pub fn decode_error(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, BuySeerError>;
