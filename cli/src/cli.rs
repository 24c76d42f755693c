//! # CLI Interface
//!
//! Defines the command-line argument structure for `flow-cli` using `clap`
//! derive. Connection flags are global so they can be given before or after
//! the subcommand.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use flow_sdk::config::{ClientConfig, Network, DEFAULT_REQUEST_TIMEOUT};
use flow_sdk::crypto::{HashAlgorithm, SignatureAlgorithm};

/// Command-line client for a Flow access node.
///
/// Reads chain state, runs scripts and submits transactions. Results are
/// printed to stdout as JSON; logs go to stderr.
#[derive(Parser, Debug)]
#[command(
    name = "flow-cli",
    about = "Command-line client for a Flow access node",
    version,
    propagate_version = true
)]
pub struct FlowCli {
    /// Access node selection.
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Log output format: pretty or json.
    #[arg(long, global = true, env = "FLOW_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Where to connect.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Network to talk to: mainnet, testnet or emulator.
    #[arg(long, global = true, env = "FLOW_NETWORK", default_value = "emulator")]
    pub network: Network,

    /// REST endpoint of the access node. Defaults to the network's public node.
    #[arg(long, global = true, env = "FLOW_ACCESS_NODE")]
    pub access_node: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub timeout: u64,
}

impl ConnectionArgs {
    /// Client configuration for these flags.
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::for_network(self.network)
            .with_timeout(Duration::from_secs(self.timeout));
        match &self.access_node {
            Some(endpoint) => config.with_endpoint(endpoint.as_str()),
            None => config,
        }
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the access node answers.
    Ping,
    /// Show a block (latest sealed unless --height or --id is given).
    Block(BlockArgs),
    /// Show an account with its keys and contracts.
    Account(AccountArgs),
    /// Show a collection's transaction ids.
    Collection(IdArgs),
    /// Show a transaction.
    Tx(IdArgs),
    /// Show a transaction's execution result.
    #[command(name = "result")]
    TxResult(IdArgs),
    /// Execute a read-only Cadence script.
    Script(ScriptArgs),
    /// List events of one type over a height range.
    Events(EventsArgs),
    /// Generate a new key pair.
    Keygen(KeygenArgs),
    /// Create an account paid for by an existing one.
    CreateAccount(CreateAccountArgs),
}

/// Arguments for `block`.
#[derive(Args, Debug)]
pub struct BlockArgs {
    /// Block height.
    #[arg(long, conflicts_with = "id")]
    pub height: Option<u64>,

    /// Block id (hex).
    #[arg(long)]
    pub id: Option<String>,

    /// Print only the header.
    #[arg(long)]
    pub header: bool,
}

/// Arguments for `account`.
#[derive(Args, Debug)]
pub struct AccountArgs {
    /// Account address (hex, with or without 0x).
    pub address: String,

    /// Read the account as of this height instead of the latest sealed block.
    #[arg(long)]
    pub height: Option<u64>,
}

/// A single hex id.
#[derive(Args, Debug)]
pub struct IdArgs {
    /// Id (hex).
    pub id: String,
}

/// Arguments for `script`.
#[derive(Args, Debug)]
pub struct ScriptArgs {
    /// Path to the Cadence script.
    pub file: PathBuf,

    /// JSON-Cadence argument, e.g. '{"type":"UInt64","value":"1"}'. Repeatable.
    #[arg(long = "arg")]
    pub args: Vec<String>,

    /// Execute against this height instead of the latest sealed block.
    #[arg(long)]
    pub height: Option<u64>,
}

/// Arguments for `events`.
#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Fully qualified event type, e.g. flow.AccountCreated.
    pub event_type: String,

    /// First height, inclusive.
    #[arg(long)]
    pub start: u64,

    /// Last height, inclusive.
    #[arg(long)]
    pub end: u64,
}

/// Arguments for `keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Curve: ECDSA_P256 or ECDSA_secp256k1.
    #[arg(long, default_value = "ECDSA_P256")]
    pub algo: SignatureAlgorithm,
}

/// Arguments for `create-account`.
#[derive(Args, Debug)]
pub struct CreateAccountArgs {
    /// Existing account that proposes, pays and authorizes.
    #[arg(long, env = "FLOW_SIGNER")]
    pub signer: String,

    /// Hex-encoded private key of the signer.
    ///
    /// **Avoid passing this on shared machines**; prefer the environment variable.
    #[arg(long, env = "FLOW_SIGNER_KEY", hide_env_values = true)]
    pub signer_key: String,

    /// Key index of the signer key on its account.
    #[arg(long, default_value_t = 0)]
    pub key_index: u32,

    /// Curve of the signer key.
    #[arg(long, default_value = "ECDSA_P256")]
    pub signer_algo: SignatureAlgorithm,

    /// Hash used with the signer key.
    #[arg(long, default_value = "SHA3_256")]
    pub signer_hash: HashAlgorithm,

    /// Public key (hex, 64 bytes) to register on the new account. Repeatable.
    #[arg(long = "public-key", required = true)]
    pub public_keys: Vec<String>,

    /// Curve of the new keys.
    #[arg(long, default_value = "ECDSA_P256")]
    pub key_algo: SignatureAlgorithm,

    /// Hash used with the new keys.
    #[arg(long, default_value = "SHA3_256")]
    pub key_hash: HashAlgorithm,

    /// Weight of each new key.
    #[arg(long, default_value_t = flow_sdk::config::ACCOUNT_KEY_WEIGHT_THRESHOLD)]
    pub weight: u32,

    /// Poll the result until the transaction is sealed.
    #[arg(long)]
    pub wait: bool,

    /// Give up waiting after this many seconds.
    #[arg(long, default_value_t = 120, requires = "wait")]
    pub wait_timeout: u64,
}
