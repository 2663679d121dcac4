//! Snapshot types consumed by the Guardian swarm
//!
//! Each evaluation cycle runs over one `SnapshotBundle`: point-in-time views
//! of a monitored portfolio, a pending transaction, a governance proposal,
//! and the DEX pools relevant to them. A bundle with a missing per-domain
//! snapshot simply means that domain has no data for the cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ChaindataError, Network, Result};

/// A single token position inside a monitored portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPosition {
    /// SPL token mint address
    pub mint: String,

    /// Token symbol
    pub symbol: String,

    /// Token amount (string to avoid precision loss)
    pub amount: String,

    /// Position value in USD
    pub value_usd: f64,

    /// Share of total portfolio value, 0.0 to 1.0
    pub allocation: f64,
}

/// Point-in-time view of a monitored wallet's portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// Wallet public key
    pub wallet: String,

    /// Cluster the wallet lives on
    pub network: Network,

    /// Held positions
    pub positions: Vec<TokenPosition>,

    /// Total portfolio value in USD
    pub total_value_usd: f64,

    /// Trailing 7-day realized volatility, 0.0 to 1.0
    pub volatility_7d: f64,

    /// Portfolio age in days
    pub age_days: u32,

    /// When this snapshot was taken
    pub taken_at: DateTime<Utc>,
}

/// Transaction kinds the guardian screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Swap,
    Transfer,
    AddLiquidity,
    RemoveLiquidity,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransactionKind::Swap => "swap",
            TransactionKind::Transfer => "transfer",
            TransactionKind::AddLiquidity => "add_liquidity",
            TransactionKind::RemoveLiquidity => "remove_liquidity",
        };
        write!(f, "{}", name)
    }
}

/// DEX pool liquidity and pricing data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolInfo {
    /// Pool account address
    pub address: String,

    /// First token symbol
    pub token_a: String,

    /// Second token symbol
    pub token_b: String,

    /// Total pool liquidity in USD
    pub liquidity_usd: f64,

    /// Current price impact for a reference-size trade, 0.0 to 1.0
    pub price_impact: f64,

    /// 24h traded volume in USD
    pub volume_24h_usd: f64,
}

impl PoolInfo {
    /// Whether the pool contains the given token symbol
    pub fn contains(&self, symbol: &str) -> bool {
        self.token_a == symbol || self.token_b == symbol
    }
}

/// Point-in-time view of a pending (not yet confirmed) transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSnapshot {
    /// Transaction signature
    pub signature: String,

    /// Transaction kind
    pub kind: TransactionKind,

    /// Input token symbol
    pub token_in: String,

    /// Output token symbol
    pub token_out: String,

    /// Input amount in token units
    pub amount_in: f64,

    /// Expected output amount in token units
    pub expected_amount_out: f64,

    /// Caller's slippage tolerance, 0.0 to 1.0
    pub slippage_tolerance: f64,

    /// Priority fee attached to the transaction, in lamports
    pub priority_fee_lamports: u64,

    /// The pool this transaction routes through
    pub pool: PoolInfo,

    /// When this snapshot was taken
    pub taken_at: DateTime<Utc>,
}

/// Point-in-time view of an active DAO governance proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalSnapshot {
    /// Proposal identifier
    pub proposal_id: String,

    /// Proposal title
    pub title: String,

    /// Proposal description
    pub description: String,

    /// Proposer identity
    pub proposer: String,

    /// Proposal category (treasury_management, fees, ...)
    pub category: String,

    /// Votes in favor
    pub votes_for: u64,

    /// Votes against
    pub votes_against: u64,

    /// Voting power required to pass
    pub quorum: u64,

    /// Fraction of the DAO treasury this proposal commits, 0.0 to 1.0
    pub treasury_pct: f64,

    /// Voting deadline
    pub voting_ends: DateTime<Utc>,

    /// When this snapshot was taken
    pub taken_at: DateTime<Utc>,
}

impl ProposalSnapshot {
    /// Share of cast votes in favor, 0.5 when nothing has been cast yet
    pub fn support_ratio(&self) -> f64 {
        let total = self.votes_for + self.votes_against;
        if total == 0 {
            0.5
        } else {
            self.votes_for as f64 / total as f64
        }
    }

    /// Whether cast votes have reached the quorum
    pub fn quorum_reached(&self) -> bool {
        self.votes_for + self.votes_against >= self.quorum
    }
}

/// One evaluation cycle's input: per-domain snapshots plus shared pool data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotBundle {
    /// Unique identifier for this bundle; signal ids are derived from it
    pub snapshot_id: Uuid,

    /// Cluster the bundle was taken from
    pub network: Network,

    /// Portfolio view, if available this cycle
    pub portfolio: Option<PortfolioSnapshot>,

    /// Pending transaction view, if available this cycle
    pub transaction: Option<TransactionSnapshot>,

    /// Governance proposal view, if available this cycle
    pub proposal: Option<ProposalSnapshot>,

    /// Monitored DEX pools (shared market context)
    pub pools: Vec<PoolInfo>,

    /// When this bundle was assembled
    pub taken_at: DateTime<Utc>,
}

impl PortfolioSnapshot {
    /// Validate internal consistency of the snapshot
    pub fn validate(&self) -> Result<()> {
        if self.positions.is_empty() {
            return Err(ChaindataError::schema_validation(
                "Portfolio positions cannot be empty",
            ));
        }
        if self.total_value_usd < 0.0 {
            return Err(ChaindataError::schema_validation(
                "Portfolio value cannot be negative",
            ));
        }
        for position in &self.positions {
            if !(0.0..=1.0).contains(&position.allocation) {
                return Err(ChaindataError::schema_validation(format!(
                    "Allocation out of range for {}: {}",
                    position.symbol, position.allocation
                )));
            }
        }
        let total_allocation: f64 = self.positions.iter().map(|p| p.allocation).sum();
        if total_allocation > 1.0 + 1e-6 {
            return Err(ChaindataError::schema_validation(format!(
                "Allocations sum to {:.4}, above 1.0",
                total_allocation
            )));
        }
        if !(0.0..=1.0).contains(&self.volatility_7d) {
            return Err(ChaindataError::schema_validation(
                "Volatility must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

impl TransactionSnapshot {
    /// Validate internal consistency of the snapshot
    pub fn validate(&self) -> Result<()> {
        if self.amount_in <= 0.0 {
            return Err(ChaindataError::schema_validation(
                "Transaction amount must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.slippage_tolerance) {
            return Err(ChaindataError::schema_validation(
                "Slippage tolerance must be within [0, 1]",
            ));
        }
        self.pool.validate()
    }
}

impl PoolInfo {
    /// Validate internal consistency of the pool data
    pub fn validate(&self) -> Result<()> {
        if self.liquidity_usd < 0.0 {
            return Err(ChaindataError::schema_validation(
                "Pool liquidity cannot be negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.price_impact) {
            return Err(ChaindataError::schema_validation(
                "Price impact must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

impl ProposalSnapshot {
    /// Validate internal consistency of the snapshot
    pub fn validate(&self) -> Result<()> {
        if self.proposal_id.is_empty() {
            return Err(ChaindataError::schema_validation(
                "Proposal id cannot be empty",
            ));
        }
        if !(0.0..=1.0).contains(&self.treasury_pct) {
            return Err(ChaindataError::schema_validation(
                "Treasury percentage must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

impl SnapshotBundle {
    /// Create an empty bundle for the given cluster
    pub fn new(network: Network) -> Self {
        Self {
            snapshot_id: Uuid::new_v4(),
            network,
            portfolio: None,
            transaction: None,
            proposal: None,
            pools: Vec::new(),
            taken_at: Utc::now(),
        }
    }

    /// Validate every snapshot present in the bundle
    pub fn validate(&self) -> Result<()> {
        if let Some(portfolio) = &self.portfolio {
            portfolio.validate()?;
        }
        if let Some(transaction) = &self.transaction {
            transaction.validate()?;
        }
        if let Some(proposal) = &self.proposal {
            proposal.validate()?;
        }
        for pool in &self.pools {
            pool.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_portfolio() -> PortfolioSnapshot {
        PortfolioSnapshot {
            wallet: "DYw8jCTfwHNRJhhmFcbXvVDTqWMEVFBX6ZKUmG5CNSKK".to_string(),
            network: Network::MainnetBeta,
            positions: vec![
                TokenPosition {
                    mint: "So11111111111111111111111111111111111111112".to_string(),
                    symbol: "SOL".to_string(),
                    amount: "100.0".to_string(),
                    value_usd: 15000.0,
                    allocation: 0.5,
                },
                TokenPosition {
                    mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
                    symbol: "USDC".to_string(),
                    amount: "5000.0".to_string(),
                    value_usd: 5000.0,
                    allocation: 0.5,
                },
            ],
            total_value_usd: 20000.0,
            volatility_7d: 0.4,
            age_days: 45,
            taken_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_portfolio() {
        assert!(sample_portfolio().validate().is_ok());
    }

    #[test]
    fn test_allocation_out_of_range() {
        let mut portfolio = sample_portfolio();
        portfolio.positions[0].allocation = 1.5;
        assert!(portfolio.validate().is_err());
    }

    #[test]
    fn test_empty_portfolio_rejected() {
        let mut portfolio = sample_portfolio();
        portfolio.positions.clear();
        assert!(portfolio.validate().is_err());
    }

    #[test]
    fn test_support_ratio() {
        let proposal = ProposalSnapshot {
            proposal_id: "PROP-001".to_string(),
            title: "Increase Liquidity Mining Rewards".to_string(),
            description: "Increase RAY-SOL pool rewards by 15%".to_string(),
            proposer: "core-dev-team".to_string(),
            category: "incentives".to_string(),
            votes_for: 1_250_000,
            votes_against: 850_000,
            quorum: 1_000_000,
            treasury_pct: 0.033,
            voting_ends: Utc::now(),
            taken_at: Utc::now(),
        };
        let ratio = proposal.support_ratio();
        assert!((ratio - 0.5952).abs() < 1e-3);
        assert!(proposal.quorum_reached());
    }
}
