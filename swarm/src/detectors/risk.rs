//! Risk management detectors
//!
//! Three evaluators over the portfolio snapshot: concentration, exit
//! liquidity, and realized volatility. All speak the risk vocabulary
//! (low / medium / high / critical).

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use guardian_chaindata::SnapshotBundle;

use crate::config::{RiskThresholds, SlippageThresholds};
use crate::detectors::Detector;
use crate::error::{GuardianError, Result};
use crate::types::{ActionKind, RawFinding, Specialization};

// Volatility bands for the 7-day realized measure
const VOLATILITY_CRITICAL: f64 = 0.8;
const VOLATILITY_HIGH: f64 = 0.5;
const VOLATILITY_MEDIUM: f64 = 0.3;

/// Portfolio concentration analyzer
pub struct PortfolioRiskAnalyzer {
    thresholds: RiskThresholds,
}

impl PortfolioRiskAnalyzer {
    /// Create a new portfolio risk analyzer
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }
}

#[async_trait]
impl Detector for PortfolioRiskAnalyzer {
    fn id(&self) -> &str {
        "portfolio-risk-analyzer"
    }

    fn specialization(&self) -> Specialization {
        Specialization::PortfolioRisk
    }

    async fn evaluate(&self, bundle: &SnapshotBundle) -> Result<RawFinding> {
        let portfolio = bundle
            .portfolio
            .as_ref()
            .ok_or_else(|| GuardianError::detection("portfolio snapshot unavailable"))?;

        let top = portfolio
            .positions
            .iter()
            .max_by(|a, b| a.allocation.total_cmp(&b.allocation))
            .ok_or_else(|| GuardianError::detection("portfolio has no positions"))?;

        let (severity_label, confidence, proposed_actions) = if top.allocation
            >= self.thresholds.high
        {
            (
                "critical",
                0.9,
                vec![ActionKind::RebalancePortfolio, ActionKind::AlertUser],
            )
        } else if top.allocation >= self.thresholds.medium {
            ("medium", 0.7, vec![ActionKind::AlertUser])
        } else if top.allocation >= self.thresholds.low {
            ("low", 0.6, vec![])
        } else {
            ("low", 0.3, vec![])
        };

        if top.allocation >= self.thresholds.medium {
            info!(
                detector = self.id(),
                symbol = %top.symbol,
                allocation = top.allocation,
                "Concentration threshold exceeded"
            );
        }

        Ok(RawFinding {
            detector_id: self.id().to_string(),
            domain: self.domain(),
            specialization: self.specialization(),
            severity_label: severity_label.to_string(),
            confidence,
            rationale: format!(
                "{} holds {:.0}% of portfolio value (${:.2} of ${:.2})",
                top.symbol,
                top.allocation * 100.0,
                top.value_usd,
                portfolio.total_value_usd
            ),
            proposed_actions,
            error: None,
            detected_at: Utc::now(),
        })
    }
}

/// Exit liquidity and slippage monitor
pub struct LiquidityMonitor {
    thresholds: SlippageThresholds,
}

impl LiquidityMonitor {
    /// Create a new liquidity monitor
    pub fn new(thresholds: SlippageThresholds) -> Self {
        Self { thresholds }
    }
}

#[async_trait]
impl Detector for LiquidityMonitor {
    fn id(&self) -> &str {
        "liquidity-monitor"
    }

    fn specialization(&self) -> Specialization {
        Specialization::LiquidityRisk
    }

    async fn evaluate(&self, bundle: &SnapshotBundle) -> Result<RawFinding> {
        let portfolio = bundle
            .portfolio
            .as_ref()
            .ok_or_else(|| GuardianError::detection("portfolio snapshot unavailable"))?;

        // Worst price impact among pools the portfolio would exit through
        let worst = bundle
            .pools
            .iter()
            .filter(|pool| portfolio.positions.iter().any(|p| pool.contains(&p.symbol)))
            .max_by(|a, b| a.price_impact.total_cmp(&b.price_impact));

        let Some(pool) = worst else {
            return Ok(RawFinding {
                detector_id: self.id().to_string(),
                domain: self.domain(),
                specialization: self.specialization(),
                severity_label: "low".to_string(),
                confidence: 0.3,
                rationale: "no monitored pool covers the held assets".to_string(),
                proposed_actions: vec![],
                error: None,
                detected_at: Utc::now(),
            });
        };

        let (severity_label, confidence, proposed_actions) =
            if pool.price_impact >= self.thresholds.critical {
                (
                    "high",
                    0.85,
                    vec![ActionKind::RebalancePortfolio, ActionKind::AlertUser],
                )
            } else if pool.price_impact >= self.thresholds.warning {
                ("medium", 0.65, vec![ActionKind::AlertUser])
            } else {
                ("low", 0.4, vec![])
            };

        if pool.price_impact >= self.thresholds.warning {
            info!(
                detector = self.id(),
                pool = %pool.address,
                price_impact = pool.price_impact,
                "Slippage threshold exceeded"
            );
        }

        Ok(RawFinding {
            detector_id: self.id().to_string(),
            domain: self.domain(),
            specialization: self.specialization(),
            severity_label: severity_label.to_string(),
            confidence,
            rationale: format!(
                "{}/{} pool shows {:.1}% price impact on ${:.0} liquidity",
                pool.token_a,
                pool.token_b,
                pool.price_impact * 100.0,
                pool.liquidity_usd
            ),
            proposed_actions,
            error: None,
            detected_at: Utc::now(),
        })
    }
}

/// Market volatility tracker
pub struct VolatilityTracker;

impl VolatilityTracker {
    /// Create a new volatility tracker
    pub fn new() -> Self {
        Self
    }
}

impl Default for VolatilityTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Detector for VolatilityTracker {
    fn id(&self) -> &str {
        "volatility-tracker"
    }

    fn specialization(&self) -> Specialization {
        Specialization::VolatilityTracking
    }

    async fn evaluate(&self, bundle: &SnapshotBundle) -> Result<RawFinding> {
        let portfolio = bundle
            .portfolio
            .as_ref()
            .ok_or_else(|| GuardianError::detection("portfolio snapshot unavailable"))?;

        let volatility = portfolio.volatility_7d;
        let (severity_label, confidence, proposed_actions) = if volatility >= VOLATILITY_CRITICAL {
            (
                "critical",
                0.85,
                vec![ActionKind::UpdateStrategy, ActionKind::AlertUser],
            )
        } else if volatility >= VOLATILITY_HIGH {
            ("high", 0.75, vec![ActionKind::UpdateStrategy])
        } else if volatility >= VOLATILITY_MEDIUM {
            ("medium", 0.6, vec![ActionKind::AlertUser])
        } else {
            ("low", 0.35, vec![])
        };

        Ok(RawFinding {
            detector_id: self.id().to_string(),
            domain: self.domain(),
            specialization: self.specialization(),
            severity_label: severity_label.to_string(),
            confidence,
            rationale: format!("7-day realized volatility at {:.0}%", volatility * 100.0),
            proposed_actions,
            error: None,
            detected_at: Utc::now(),
        })
    }
}
