//! Network identifier.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::TypesError;

/// Identifies which network the ledger node serves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// The production network.
    #[default]
    Mainnet,
    /// The public test network.
    Testnet,
    /// Local simulation network.
    Simnet,
}

impl Network {
    /// Default JSON-RPC port of the node on this network.
    pub fn default_rpc_port(&self) -> u16 {
        match self {
            Self::Mainnet => 9109,
            Self::Testnet => 19109,
            Self::Simnet => 19556,
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Simnet => "simnet",
        }
    }
}

impl FromStr for Network {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Self::Mainnet),
            "testnet" | "test" => Ok(Self::Testnet),
            "simnet" | "sim" => Ok(Self::Simnet),
            other => Err(TypesError::UnknownNetwork(other.to_string())),
        }
    }
}
