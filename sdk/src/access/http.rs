//! [`AccessApi`] over the access node REST API.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use super::models::{Account, Block, BlockHeader, Collection, EventResult, ScriptResponse};
use super::wire::{
    decode_script_result, WireAccount, WireBlock, WireBlockEvents, WireCollection, WireError,
    WireNetworkParameters, WireScript, WireTransaction, WireTransactionResult,
};
use super::{AccessApi, ChainAccessError};
use crate::config::{trim_endpoint, ClientConfig, Network};
use crate::error::Result;
use crate::transaction::{Transaction, TransactionResult};
use crate::types::{Address, Id};
use crate::value::Argument;

type Query<'a> = [(&'a str, String)];

/// REST access client.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted and
/// pools connections.
#[derive(Debug, Clone)]
pub struct HttpAccessClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl HttpAccessClient {
    /// Builds a client for `config`.
    pub fn new(mut config: ClientConfig) -> Result<Self, ChainAccessError> {
        config.endpoint = trim_endpoint(config.endpoint);
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    /// Client for a network's public access node.
    pub fn for_network(network: Network) -> Result<Self, ChainAccessError> {
        Self::new(ClientConfig::for_network(network))
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.endpoint, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
    ) -> Result<T, ChainAccessError> {
        debug!(path, "GET");
        let resp = self.client.get(self.url(path)).query(query).send().await?;
        read(resp, path).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
        body: &B,
    ) -> Result<T, ChainAccessError> {
        debug!(path, "POST");
        let resp = self
            .client
            .post(self.url(path))
            .query(query)
            .json(body)
            .send()
            .await?;
        read(resp, path).await
    }

    async fn blocks(&self, path: &str, query: &Query<'_>) -> Result<WireBlock, ChainAccessError> {
        let mut blocks: Vec<WireBlock> = self.get(path, query).await?;
        if blocks.is_empty() {
            return Err(ChainAccessError::NotFound(format!("block {path}")));
        }
        Ok(blocks.swap_remove(0))
    }

    async fn account(
        &self,
        address: Address,
        block_height: String,
    ) -> Result<Account, ChainAccessError> {
        let wire: WireAccount = self
            .get(
                &format!("accounts/{}", address.to_hex()),
                &[
                    ("expand", "keys,contracts".to_string()),
                    ("block_height", block_height),
                ],
            )
            .await?;
        wire.into_account()
    }

    async fn script(
        &self,
        query: &Query<'_>,
        script: &str,
        arguments: &[Argument],
    ) -> Result<ScriptResponse, ChainAccessError> {
        let encoded: String = self
            .post("scripts", query, &WireScript::new(script, arguments))
            .await?;
        decode_script_result(&encoded).map(ScriptResponse)
    }

    async fn events(&self, query: &Query<'_>) -> Result<Vec<EventResult>, ChainAccessError> {
        let blocks: Vec<WireBlockEvents> = self.get("events", query).await?;
        blocks
            .into_iter()
            .map(WireBlockEvents::into_event_result)
            .collect()
    }
}

fn latest(sealed: bool) -> String {
    let selector = if sealed { "sealed" } else { "final" };
    selector.to_string()
}

/// Maps the status line, then decodes the body.
async fn read<T: DeserializeOwned>(resp: Response, path: &str) -> Result<T, ChainAccessError> {
    let status = resp.status();
    if status.is_success() {
        return resp
            .json::<T>()
            .await
            .map_err(|e| ChainAccessError::Decode(format!("{path}: {e}")));
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<WireError>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    if status == StatusCode::NOT_FOUND {
        return Err(ChainAccessError::NotFound(format!("{path}: {message}")));
    }
    Err(ChainAccessError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl AccessApi for HttpAccessClient {
    async fn ping(&self) -> Result<(), ChainAccessError> {
        let params: WireNetworkParameters = self.get("network/parameters", &[]).await?;
        debug!(chain_id = %params.chain_id, "access node reachable");
        Ok(())
    }

    async fn get_latest_block_header(&self, sealed: bool) -> Result<BlockHeader, ChainAccessError> {
        let block = self.blocks("blocks", &[("height", latest(sealed))]).await?;
        Ok(block.header.into())
    }

    async fn get_block_header_by_id(&self, id: Id) -> Result<BlockHeader, ChainAccessError> {
        let block = self.blocks(&format!("blocks/{id}"), &[]).await?;
        Ok(block.header.into())
    }

    async fn get_block_header_by_height(
        &self,
        height: u64,
    ) -> Result<BlockHeader, ChainAccessError> {
        let block = self
            .blocks("blocks", &[("height", height.to_string())])
            .await?;
        Ok(block.header.into())
    }

    async fn get_latest_block(&self, sealed: bool) -> Result<Block, ChainAccessError> {
        self.blocks(
            "blocks",
            &[("height", latest(sealed)), ("expand", "payload".to_string())],
        )
        .await?
        .into_block()
    }

    async fn get_block_by_id(&self, id: Id) -> Result<Block, ChainAccessError> {
        self.blocks(&format!("blocks/{id}"), &[("expand", "payload".to_string())])
            .await?
            .into_block()
    }

    async fn get_block_by_height(&self, height: u64) -> Result<Block, ChainAccessError> {
        self.blocks(
            "blocks",
            &[
                ("height", height.to_string()),
                ("expand", "payload".to_string()),
            ],
        )
        .await?
        .into_block()
    }

    async fn get_collection_by_id(&self, id: Id) -> Result<Collection, ChainAccessError> {
        let wire: WireCollection = self
            .get(
                &format!("collections/{id}"),
                &[("expand", "transactions".to_string())],
            )
            .await?;
        Ok(wire.into())
    }

    async fn get_account_at_latest_block(
        &self,
        address: Address,
    ) -> Result<Account, ChainAccessError> {
        self.account(address, "sealed".to_string()).await
    }

    async fn get_account_at_block_height(
        &self,
        address: Address,
        height: u64,
    ) -> Result<Account, ChainAccessError> {
        self.account(address, height.to_string()).await
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Id, ChainAccessError> {
        #[derive(serde::Deserialize)]
        struct Submitted {
            id: Id,
        }

        let submitted: Submitted = self
            .post("transactions", &[], &WireTransaction::from(tx))
            .await?;
        info!(id = %submitted.id, "transaction submitted");
        Ok(submitted.id)
    }

    async fn get_transaction_by_id(&self, id: Id) -> Result<Transaction, ChainAccessError> {
        let wire: WireTransaction = self.get(&format!("transactions/{id}"), &[]).await?;
        wire.into_transaction()
    }

    async fn get_transaction_result_by_id(
        &self,
        id: Id,
    ) -> Result<TransactionResult, ChainAccessError> {
        let wire: WireTransactionResult = self
            .get(&format!("transaction_results/{id}"), &[])
            .await?;
        wire.into_result()
    }

    async fn execute_script_at_latest_block(
        &self,
        script: &str,
        arguments: &[Argument],
    ) -> Result<ScriptResponse, ChainAccessError> {
        self.script(&[("block_height", "sealed".to_string())], script, arguments)
            .await
    }

    async fn execute_script_at_block_id(
        &self,
        id: Id,
        script: &str,
        arguments: &[Argument],
    ) -> Result<ScriptResponse, ChainAccessError> {
        self.script(&[("block_id", id.to_hex())], script, arguments)
            .await
    }

    async fn execute_script_at_block_height(
        &self,
        height: u64,
        script: &str,
        arguments: &[Argument],
    ) -> Result<ScriptResponse, ChainAccessError> {
        self.script(&[("block_height", height.to_string())], script, arguments)
            .await
    }

    async fn get_events_for_height_range(
        &self,
        event_type: &str,
        start: u64,
        end: u64,
    ) -> Result<Vec<EventResult>, ChainAccessError> {
        self.events(&[
            ("type", event_type.to_string()),
            ("start_height", start.to_string()),
            ("end_height", end.to_string()),
        ])
        .await
    }

    async fn get_events_for_block_ids(
        &self,
        event_type: &str,
        ids: &[Id],
    ) -> Result<Vec<EventResult>, ChainAccessError> {
        let ids = ids.iter().map(Id::to_hex).collect::<Vec<_>>().join(",");
        self.events(&[("type", event_type.to_string()), ("block_ids", ids)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_versioned() {
        let client = HttpAccessClient::new(
            ClientConfig::for_network(Network::Emulator).with_endpoint("http://localhost:8888/"),
        )
        .unwrap();
        assert_eq!(client.url("blocks"), "http://localhost:8888/v1/blocks");
    }

    #[test]
    fn endpoint_set_directly_is_trimmed() {
        let mut config = ClientConfig::for_network(Network::Emulator);
        config.endpoint = "http://node/".into();
        let client = HttpAccessClient::new(config).unwrap();
        assert_eq!(client.url("blocks"), "http://node/v1/blocks");
        assert_eq!(client.config().endpoint, "http://node");
    }

    #[test]
    fn latest_selector() {
        assert_eq!(latest(true), "sealed");
        assert_eq!(latest(false), "final");
    }
}
