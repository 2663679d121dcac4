//! # Guardian Chaindata
//!
//! Typed point-in-time snapshots of on-chain state (portfolio, pending
//! transaction, governance proposal) consumed by the Guardian swarm, plus
//! the provider boundary through which they are fetched. Snapshot retrieval
//! itself is an external collaborator concern: the shipped provider serves
//! fixed fixture data, and a live RPC-backed provider would slot in behind
//! the same trait.

pub mod error;
pub mod provider;
pub mod types;

// Re-export commonly used types
pub use error::{ChaindataError, Result};
pub use provider::{FixtureProvider, SnapshotProvider};
pub use types::*;

/// Current version of the chaindata crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Supported Solana clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Network {
    #[serde(rename = "mainnet-beta")]
    MainnetBeta,
    #[serde(rename = "devnet")]
    Devnet,
    #[serde(rename = "testnet")]
    Testnet,
}

impl Network {
    /// Get the human-readable cluster name
    pub fn name(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "mainnet-beta",
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
        }
    }

    /// Get the default public RPC endpoint for this cluster
    pub fn default_rpc_endpoint(&self) -> &'static str {
        match self {
            Network::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Network {
    type Err = ChaindataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mainnet-beta" | "mainnet" => Ok(Network::MainnetBeta),
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            _ => Err(ChaindataError::InvalidNetwork(s.to_string())),
        }
    }
}
