//! Threat detectors
//!
//! Detectors are named, configured evaluators that turn one snapshot bundle
//! into one `RawFinding`. They are immutable once registered, side-effect
//! free, and independent of each other: the swarm layer may run them in any
//! order or concurrently.

use async_trait::async_trait;
use guardian_chaindata::SnapshotBundle;

use crate::error::Result;
use crate::types::{Domain, RawFinding, Specialization};

/// Every detector id known to the system, one per specialization
pub const DETECTOR_IDS: [&str; 9] = [
    "portfolio-risk-analyzer",
    "liquidity-monitor",
    "volatility-tracker",
    "mempool-scanner",
    "sandwich-detector",
    "tx-optimizer",
    "proposal-analyzer",
    "sentiment-monitor",
    "voting-optimizer",
];

/// A specialized threat evaluator
#[async_trait]
pub trait Detector: Send + Sync {
    /// Unique detector id
    fn id(&self) -> &str;

    /// Declared specialization; fixes the domain at registration time
    fn specialization(&self) -> Specialization;

    /// Protection domain, derived from the specialization
    fn domain(&self) -> Domain {
        self.specialization().domain()
    }

    /// Evaluate one snapshot bundle into a raw finding
    ///
    /// Pure over the bundle (may await the scorer); errors are recovered by
    /// the swarm and converted into failure findings.
    async fn evaluate(&self, bundle: &SnapshotBundle) -> Result<RawFinding>;
}

pub mod governance;
pub mod mev;
pub mod risk;

pub use governance::{ProposalAnalyzer, SentimentMonitor, VotingOptimizer};
pub use mev::{MempoolScanner, SandwichDetector, TxOptimizer};
pub use risk::{LiquidityMonitor, PortfolioRiskAnalyzer, VolatilityTracker};
