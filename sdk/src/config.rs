//! # Protocol Configuration & Constants
//!
//! Every magic number the engine depends on lives here, together with the
//! small amount of runtime configuration a client needs: which network it
//! talks to and where that network's access node lives.
//!
//! The widths and tags below are part of the chain's signing format. Changing
//! any of them produces signatures the chain will reject.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wire widths
// ---------------------------------------------------------------------------

/// Account address width in bytes.
pub const ADDRESS_LENGTH: usize = 8;

/// Block, collection and transaction id width in bytes.
pub const ID_LENGTH: usize = 32;

/// Domain separation tags are NUL-padded to this width.
pub const DOMAIN_TAG_LENGTH: usize = 32;

/// Raw ECDSA signatures are `r || s`, 32 bytes each on both supported curves.
pub const SIGNATURE_LENGTH: usize = 64;

/// Private key scalar width for P-256 and secp256k1.
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Public keys travel as uncompressed `x || y` without the SEC1 `0x04` prefix.
pub const PUBLIC_KEY_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Transaction defaults
// ---------------------------------------------------------------------------

/// Gas limit used by the builder when the caller does not set one.
pub const DEFAULT_GAS_LIMIT: u64 = 9999;

/// Weight at which a single key can authorize on its own.
pub const ACCOUNT_KEY_WEIGHT_THRESHOLD: u32 = 1000;

/// Per-request timeout for the HTTP access client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Networks
// ---------------------------------------------------------------------------

/// Known networks. The chain id string is what the access node reports from
/// `/v1/network/parameters`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network.
    Mainnet,
    /// Public test network.
    Testnet,
    /// Local emulator.
    Emulator,
}

impl Network {
    /// Chain id string.
    pub fn chain_id(&self) -> &'static str {
        match self {
            Self::Mainnet => "flow-mainnet",
            Self::Testnet => "flow-testnet",
            Self::Emulator => "flow-emulator",
        }
    }

    /// Default REST endpoint of a public access node.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://rest-mainnet.onflow.org",
            Self::Testnet => "https://rest-testnet.onflow.org",
            Self::Emulator => "http://127.0.0.1:8888",
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "flow-mainnet" => Ok(Self::Mainnet),
            "testnet" | "flow-testnet" => Ok(Self::Testnet),
            "emulator" | "local" | "flow-emulator" => Ok(Self::Emulator),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.chain_id())
    }
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Where and how the access client connects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the access node REST API, without a trailing slash.
    #[serde(deserialize_with = "deserialize_endpoint")]
    pub endpoint: String,
    /// Per-request timeout.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Network the endpoint belongs to.
    pub network: Network,
}

impl ClientConfig {
    /// Defaults for a known network.
    pub fn for_network(network: Network) -> Self {
        Self {
            endpoint: network.default_endpoint().to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            network,
        }
    }

    /// Overrides the endpoint (trailing slashes are stripped).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = trim_endpoint(endpoint.into());
        self
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_network(Network::Emulator)
    }
}

/// Strips trailing slashes so paths can be appended with a single `/`.
pub fn trim_endpoint(mut endpoint: String) -> String {
    let len = endpoint.trim_end_matches('/').len();
    endpoint.truncate(len);
    endpoint
}

fn deserialize_endpoint<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(trim_endpoint)
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_ids_are_distinct() {
        assert_ne!(Network::Mainnet.chain_id(), Network::Testnet.chain_id());
        assert_ne!(Network::Testnet.chain_id(), Network::Emulator.chain_id());
    }

    #[test]
    fn network_parses_aliases() {
        assert_eq!("testnet".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!("flow-mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("LOCAL".parse::<Network>().unwrap(), Network::Emulator);
        assert!("devnet".parse::<Network>().is_err());
    }

    #[test]
    fn with_endpoint_strips_trailing_slash() {
        let config = ClientConfig::for_network(Network::Testnet).with_endpoint("http://node:8888/");
        assert_eq!(config.endpoint, "http://node:8888");
        assert_eq!(config.network, Network::Testnet);
    }

    #[test]
    fn config_deserializes_from_json() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"endpoint":"http://localhost:8888","timeout":3,"network":"emulator"}"#,
        )
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.network, Network::Emulator);
    }

    #[test]
    fn deserialized_endpoint_is_trimmed() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"endpoint":"http://node:8888//","timeout":3,"network":"testnet"}"#,
        )
        .unwrap();
        assert_eq!(config.endpoint, "http://node:8888");
    }

    #[test]
    fn wire_widths() {
        assert_eq!(ADDRESS_LENGTH, 8);
        assert_eq!(ID_LENGTH, 32);
        assert_eq!(SIGNATURE_LENGTH, 2 * PRIVATE_KEY_LENGTH);
    }
}
