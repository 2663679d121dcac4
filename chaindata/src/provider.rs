//! Snapshot provider boundary
//!
//! A `SnapshotProvider` turns external chain queries into the typed
//! `SnapshotBundle` one evaluation cycle consumes. Where the data actually
//! comes from (RPC, indexer, webhook payload) is a collaborator concern;
//! this crate ships a fixture-backed provider with fixed literal data so
//! cycles are fully reproducible.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{
    PoolInfo, PortfolioSnapshot, ProposalSnapshot, SnapshotBundle, TokenPosition,
    TransactionKind, TransactionSnapshot,
};
use crate::Network;

/// Source of per-cycle snapshot bundles
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Cluster this provider reads from
    fn network(&self) -> Network;

    /// Fetch the monitored portfolio, if one is available
    async fn fetch_portfolio(&self) -> Result<Option<PortfolioSnapshot>>;

    /// Fetch the next pending transaction to screen, if any
    async fn fetch_pending_transaction(&self) -> Result<Option<TransactionSnapshot>>;

    /// Fetch the active governance proposal under review, if any
    async fn fetch_proposal(&self) -> Result<Option<ProposalSnapshot>>;

    /// Fetch the monitored DEX pools
    async fn fetch_pools(&self) -> Result<Vec<PoolInfo>>;

    /// Assemble a full bundle for one evaluation cycle
    async fn fetch(&self) -> Result<SnapshotBundle> {
        let bundle = SnapshotBundle {
            snapshot_id: Uuid::new_v4(),
            network: self.network(),
            portfolio: self.fetch_portfolio().await?,
            transaction: self.fetch_pending_transaction().await?,
            proposal: self.fetch_proposal().await?,
            pools: self.fetch_pools().await?,
            taken_at: Utc::now(),
        };
        bundle.validate()?;
        debug!(
            snapshot_id = %bundle.snapshot_id,
            portfolio = bundle.portfolio.is_some(),
            transaction = bundle.transaction.is_some(),
            proposal = bundle.proposal.is_some(),
            pools = bundle.pools.len(),
            "Assembled snapshot bundle"
        );
        Ok(bundle)
    }
}

/// Fixture-backed provider serving fixed demo data
pub struct FixtureProvider {
    network: Network,
}

impl FixtureProvider {
    /// Create a provider against the given cluster
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    /// The wallet monitored by the fixture data set
    pub const WALLET: &'static str = "DYw8jCTfwHNRJhhmFcbXvVDTqWMEVFBX6ZKUmG5CNSKK";

    fn fixture_pools() -> Vec<PoolInfo> {
        vec![
            PoolInfo {
                address: "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM".to_string(),
                token_a: "SOL".to_string(),
                token_b: "USDC".to_string(),
                liquidity_usd: 1_250_000.50,
                price_impact: 0.02,
                volume_24h_usd: 850_000.25,
            },
            PoolInfo {
                address: "2wT8Yq49kHgDzXuPxZSaeLaH1qbmGXtEyPy64bL7aD3c".to_string(),
                token_a: "SOL".to_string(),
                token_b: "RAY".to_string(),
                liquidity_usd: 890_000.75,
                price_impact: 0.15,
                volume_24h_usd: 450_000.80,
            },
        ]
    }
}

impl Default for FixtureProvider {
    fn default() -> Self {
        Self::new(Network::MainnetBeta)
    }
}

#[async_trait]
impl SnapshotProvider for FixtureProvider {
    fn network(&self) -> Network {
        self.network
    }

    async fn fetch_portfolio(&self) -> Result<Option<PortfolioSnapshot>> {
        Ok(Some(PortfolioSnapshot {
            wallet: Self::WALLET.to_string(),
            network: self.network,
            positions: vec![
                TokenPosition {
                    mint: "So11111111111111111111111111111111111111112".to_string(),
                    symbol: "SOL".to_string(),
                    amount: "25.75".to_string(),
                    value_usd: 3862.50,
                    allocation: 0.66,
                },
                TokenPosition {
                    mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
                    symbol: "USDC".to_string(),
                    amount: "1000.50".to_string(),
                    value_usd: 1000.50,
                    allocation: 0.17,
                },
                TokenPosition {
                    mint: "4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R".to_string(),
                    symbol: "RAY".to_string(),
                    amount: "500.25".to_string(),
                    value_usd: 1000.50,
                    allocation: 0.17,
                },
            ],
            total_value_usd: 5863.50,
            volatility_7d: 0.45,
            age_days: 45,
            taken_at: Utc::now(),
        }))
    }

    async fn fetch_pending_transaction(&self) -> Result<Option<TransactionSnapshot>> {
        let pools = Self::fixture_pools();
        Ok(Some(TransactionSnapshot {
            signature: "5VfYKR7gbm8D9cZnwFjPWUQGPxGx9VHGoQJ7YUi8KzNc2k3qP8wYBLr6HAhwT1PrN"
                .to_string(),
            kind: TransactionKind::Swap,
            token_in: "SOL".to_string(),
            token_out: "USDC".to_string(),
            amount_in: 50.0,
            expected_amount_out: 7500.0,
            slippage_tolerance: 0.01,
            priority_fee_lamports: 5_000,
            pool: pools[0].clone(),
            taken_at: Utc::now(),
        }))
    }

    async fn fetch_proposal(&self) -> Result<Option<ProposalSnapshot>> {
        Ok(Some(ProposalSnapshot {
            proposal_id: "PROP-001".to_string(),
            title: "Increase Liquidity Mining Rewards".to_string(),
            description: "Proposal to increase RAY-SOL pool rewards by 15%".to_string(),
            proposer: "core-dev-team".to_string(),
            category: "incentives".to_string(),
            votes_for: 1_250_000,
            votes_against: 850_000,
            quorum: 1_000_000,
            treasury_pct: 0.033,
            voting_ends: Utc::now() + Duration::hours(72),
            taken_at: Utc::now(),
        }))
    }

    async fn fetch_pools(&self) -> Result<Vec<PoolInfo>> {
        Ok(Self::fixture_pools())
    }
}
