use async_trait::async_trait;
use serde_json::json;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_client::rpc_request::RpcRequest;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::error::{BuySeerError, Result};
use super::snapshot::TransactionSnapshot;

/// Read side of the ledger the poller needs.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Most recent signature touching `address`, if any.
    async fn latest_signature(&self, address: &Pubkey) -> Result<Option<String>>;

    /// Balance snapshots for `signature`. `Ok(None)` when the node has no data for it yet.
    async fn fetch_transaction(&self, signature: &str) -> Result<Option<TransactionSnapshot>>;
}

/// JSON-RPC backed source.
pub struct RpcTransactionSource {
    rpc_client: Arc<RpcClient>,
    commitment: CommitmentConfig,
}

impl RpcTransactionSource {
    pub fn new(rpc_url: &str, commitment: CommitmentConfig) -> Self {
        let client = RpcClient::new_with_commitment(rpc_url.to_string(), commitment);
        Self::with_client(client, commitment)
    }

    pub fn with_client(client: RpcClient, commitment: CommitmentConfig) -> Self {
        Self {
            rpc_client: Arc::new(client),
            commitment,
        }
    }

    pub async fn node_version(&self) -> Result<String> {
        let version = self.rpc_client.get_version().await?;
        Ok(version.solana_core)
    }
}

#[async_trait]
impl TransactionSource for RpcTransactionSource {
    async fn latest_signature(&self, address: &Pubkey) -> Result<Option<String>> {
        let config = GetConfirmedSignaturesForAddress2Config {
            limit: Some(1),
            commitment: Some(self.commitment),
            ..GetConfirmedSignaturesForAddress2Config::default()
        };

        let signatures = self
            .rpc_client
            .get_signatures_for_address_with_config(address, config)
            .await?;

        Ok(signatures.into_iter().next().map(|status| status.signature))
    }

    async fn fetch_transaction(&self, signature: &str) -> Result<Option<TransactionSnapshot>> {
        let sig = Signature::from_str(signature)
            .map_err(|e| BuySeerError::invalid_signature(format!("{}: {}", signature, e)))?;

        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(self.commitment),
            max_supported_transaction_version: Some(0),
        };

        // `getTransaction` answers `null` for signatures the node has not seen yet.
        let transaction: Option<EncodedConfirmedTransactionWithStatusMeta> = self
            .rpc_client
            .send(RpcRequest::GetTransaction, json!([sig.to_string(), config]))
            .await?;

        match transaction {
            Some(transaction) => Ok(TransactionSnapshot::from_encoded(signature, transaction)),
            None => {
                debug!("Node returned no transaction for {}", signature);
                Ok(None)
            }
        }
    }
}
