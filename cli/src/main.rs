// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Flow CLI
//!
//! Entry point for the `flow-cli` binary. Parses CLI arguments, initializes
//! logging, connects to an access node and runs one command.
//!
//! - `ping`, `block`, `account`, `collection`, `tx`, `result`, `events`
//!   read chain state
//! - `script` executes a read-only Cadence script
//! - `keygen` generates a key pair offline
//! - `create-account` builds, signs and submits an account creation

mod cli;
mod logging;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::json;

use flow_sdk::access::{AccessApi, AccessApiExt, AccountKey, ChainAccessError, HttpAccessClient};
use flow_sdk::config::PUBLIC_KEY_LENGTH;
use flow_sdk::crypto::{InMemorySigner, PrivateKey, Signer};
use flow_sdk::submit::Submitter;
use flow_sdk::templates;
use flow_sdk::transaction::{TransactionResult, TransactionStatus};
use flow_sdk::types::{Address, Id};
use flow_sdk::Value;

use cli::{Commands, FlowCli};
use logging::LogFormat;

/// How often `create-account --wait` polls for the result.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = FlowCli::parse();
    logging::init_logging(
        logging::DEFAULT_DIRECTIVE,
        LogFormat::from_str_lossy(&cli.log_format),
    );

    let config = cli.connection.client_config();
    tracing::info!(
        endpoint = %config.endpoint,
        network = %config.network,
        "using access node"
    );
    // Building the client does not connect; offline commands never use it.
    let client = HttpAccessClient::new(config).context("failed to build access client")?;

    match cli.command {
        Commands::Ping => ping(&client).await,
        Commands::Block(args) => show_block(&client, args).await,
        Commands::Account(args) => {
            let address = parse_address(&args.address)?;
            let account = match args.height {
                Some(height) => client.get_account_at_block_height(address, height).await,
                None => client.get_account_at_latest_block(address).await,
            }
            .with_context(|| format!("failed to fetch account {address}"))?;
            print_json(&account)
        }
        Commands::Collection(args) => {
            let collection = client.get_collection_by_id(parse_id(&args.id)?).await?;
            print_json(&collection)
        }
        Commands::Tx(args) => {
            let tx = client.get_transaction_by_id(parse_id(&args.id)?).await?;
            print_json(&json!({ "id": tx.id(), "transaction": tx }))
        }
        Commands::TxResult(args) => {
            let result = client.get_transaction_result_by_id(parse_id(&args.id)?).await?;
            print_json(&result)
        }
        Commands::Script(args) => run_script(&client, args).await,
        Commands::Events(args) => {
            let events = client
                .get_events_for_height_range(&args.event_type, args.start, args.end)
                .await
                .with_context(|| format!("failed to fetch {} events", args.event_type))?;
            print_json(&events)
        }
        Commands::Keygen(args) => keygen(&args),
        Commands::CreateAccount(args) => create_account(Arc::new(client), args).await,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_id(s: &str) -> Result<Id> {
    Id::from_hex(s).with_context(|| format!("invalid id: {s}"))
}

fn parse_address(s: &str) -> Result<Address> {
    Address::from_hex(s).with_context(|| format!("invalid address: {s}"))
}

async fn ping(client: &HttpAccessClient) -> Result<()> {
    client
        .ping()
        .await
        .with_context(|| format!("access node {} unreachable", client.config().endpoint))?;
    print_json(&json!({
        "endpoint": client.config().endpoint,
        "network": client.config().network.chain_id(),
        "reachable": true,
    }))
}

async fn show_block(client: &HttpAccessClient, args: cli::BlockArgs) -> Result<()> {
    let id = args.id.as_deref().map(parse_id).transpose()?;
    if args.header {
        let header = match (args.height, id) {
            (Some(height), _) => client.get_block_header_by_height(height).await?,
            (None, Some(id)) => client.get_block_header_by_id(id).await?,
            (None, None) => client.get_latest_block_header(true).await?,
        };
        return print_json(&header);
    }
    let block = match (args.height, id) {
        (Some(height), _) => client.get_block_by_height(height).await?,
        (None, Some(id)) => client.get_block_by_id(id).await?,
        (None, None) => client.get_latest_block(true).await?,
    };
    print_json(&block)
}

async fn run_script(client: &HttpAccessClient, args: cli::ScriptArgs) -> Result<()> {
    let script = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read script {}", args.file.display()))?;
    let values = args
        .args
        .iter()
        .map(|raw| -> Result<Value> {
            let doc: serde_json::Value = serde_json::from_str(raw)
                .with_context(|| format!("argument is not JSON: {raw}"))?;
            Value::from_json(&doc).with_context(|| format!("argument is not JSON-Cadence: {raw}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let value = match args.height {
        Some(height) => {
            client
                .execute_script_with_values_at_block_height(height, &script, &values)
                .await?
        }
        None => {
            client
                .execute_script_with_values_at_latest_block(&script, &values)
                .await?
        }
    };
    print_json(&value.to_json())
}

fn keygen(args: &cli::KeygenArgs) -> Result<()> {
    let key = PrivateKey::generate(args.algo);
    print_json(&json!({
        "algorithm": args.algo,
        "private_key": hex::encode(key.to_bytes()),
        "public_key": hex::encode(key.public_key()),
    }))
}

async fn create_account(client: Arc<dyn AccessApi>, args: cli::CreateAccountArgs) -> Result<()> {
    let creator = parse_address(&args.signer)?;
    let key = PrivateKey::from_hex(args.signer_algo, &args.signer_key)
        .context("invalid signer key")?;
    let signer: Arc<dyn Signer> = Arc::new(InMemorySigner::new(
        creator,
        args.key_index,
        key,
        args.signer_hash,
    ));

    let keys = args
        .public_keys
        .iter()
        .map(|pk| -> Result<AccountKey> {
            let bytes = hex::decode(pk.trim_start_matches("0x"))
                .with_context(|| format!("public key is not hex: {pk}"))?;
            if bytes.len() != PUBLIC_KEY_LENGTH {
                bail!(
                    "public key must be {PUBLIC_KEY_LENGTH} bytes, got {}",
                    bytes.len()
                );
            }
            Ok(AccountKey::new(bytes, args.key_algo, args.key_hash, args.weight))
        })
        .collect::<Result<Vec<_>>>()?;

    let request = templates::create_account(&keys, creator, args.key_index)?;
    let submitter = Submitter::new(Arc::clone(&client));
    let id = submitter
        .submit_request(&request, &[signer])
        .await
        .context("account creation was not accepted")?;

    if !args.wait {
        return print_json(&json!({ "transaction_id": id }));
    }

    let result = wait_for_seal(client.as_ref(), id, Duration::from_secs(args.wait_timeout)).await?;
    if result.status == TransactionStatus::Expired {
        bail!("transaction {id} expired before execution");
    }
    if result.is_failed() {
        bail!("account creation failed: {}", result.error_message);
    }
    let address = templates::created_address(&result)?
        .context("result carries no flow.AccountCreated event")?;
    print_json(&json!({
        "transaction_id": id,
        "status": result.status.to_string(),
        "address": address,
    }))
}

/// Polls until the result reaches a terminal status or `timeout` passes.
async fn wait_for_seal(
    client: &dyn AccessApi,
    id: Id,
    timeout: Duration,
) -> Result<TransactionResult> {
    let poll = async {
        loop {
            match client.get_transaction_result_by_id(id).await {
                Ok(result) if result.status.is_terminal() => {
                    return Ok::<_, anyhow::Error>(result);
                }
                Ok(result) => tracing::debug!(%id, status = %result.status, "waiting for seal"),
                Err(ChainAccessError::NotFound(_)) => {
                    tracing::debug!(%id, "result not available yet");
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(%id, error = %e, "polling failed, retrying");
                }
                Err(e) => return Err(e.into()),
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    };

    tokio::time::timeout(timeout, poll)
        .await
        .with_context(|| format!("transaction {id} not sealed after {}s", timeout.as_secs()))?
}
