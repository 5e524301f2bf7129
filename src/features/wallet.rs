use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown network - {0}")]
pub struct UnknownNetwork(String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Testnet => write!(f, "testnet"),
            Network::Mainnet => write!(f, "mainnet"),
        }
    }
}

/// Wallet connection state. Only the final result of a connection handshake
/// (the resolved address) is recorded here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", from = "StoredWallet")]
pub struct WalletState {
    address: Option<String>,
    network: Network,

    /// Always equal to `address.is_some()`
    is_connected: bool,
}

/// Shape accepted from storage. A stored `isConnected` is ignored.
#[derive(Deserialize, Default)]
#[serde(default)]
struct StoredWallet {
    address: Option<String>,
    network: Network,
}

impl From<StoredWallet> for WalletState {
    fn from(stored: StoredWallet) -> Self {
        Self {
            is_connected: stored.address.is_some(),
            address: stored.address,
            network: stored.network,
        }
    }
}

impl WalletState {
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    /// Record a connected address. Calling again replaces the address.
    pub(crate) fn connect(&self, address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            is_connected: true,
            ..self.clone()
        }
    }

    pub(crate) fn disconnect(&self) -> Self {
        Self {
            address: None,
            is_connected: false,
            ..self.clone()
        }
    }

    pub(crate) fn with_network(&self, network: Network) -> Self {
        Self {
            network,
            ..self.clone()
        }
    }
}
