//! MEV protection detectors
//!
//! Evaluators over the pending transaction snapshot: mempool threat
//! surface, sandwich attack exposure, and fee/route efficiency. All
//! speak the MEV vocabulary (safe / caution / elevated / high /
//! critical).

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use guardian_chaindata::{SnapshotBundle, TransactionSnapshot};

use crate::config::MevTuning;
use crate::detectors::Detector;
use crate::error::{GuardianError, Result};
use crate::types::{ActionKind, RawFinding, Specialization};

// A sandwich needs meaningful slippage headroom to be profitable
const SANDWICH_TOLERANCE_FLOOR: f64 = 0.05;
const LOW_PRIORITY_FEE_LAMPORTS: u64 = 1_000;

fn pending_transaction(bundle: &SnapshotBundle) -> Result<&TransactionSnapshot> {
    bundle
        .transaction
        .as_ref()
        .ok_or_else(|| GuardianError::detection("transaction snapshot unavailable"))
}

fn pool_impact(tx: &TransactionSnapshot) -> f64 {
    tx.pool.price_impact
}

/// Mempool threat scanner
pub struct MempoolScanner {
    tuning: MevTuning,
}

impl MempoolScanner {
    /// Create a new mempool scanner
    pub fn new(tuning: MevTuning) -> Self {
        Self { tuning }
    }
}

#[async_trait]
impl Detector for MempoolScanner {
    fn id(&self) -> &str {
        "mempool-scanner"
    }

    fn specialization(&self) -> Specialization {
        Specialization::MempoolThreatDetection
    }

    async fn evaluate(&self, bundle: &SnapshotBundle) -> Result<RawFinding> {
        let tx = pending_transaction(bundle)?;
        let impact = pool_impact(tx);

        let (severity_label, confidence, proposed_actions) =
            if impact >= self.tuning.min_impact_threshold * 10.0 {
                warn!(
                    detector = self.id(),
                    signature = %tx.signature,
                    price_impact = impact,
                    "Transaction is highly visible to searchers"
                );
                (
                    "critical",
                    0.9,
                    vec![ActionKind::BlockTransaction, ActionKind::AlertUser],
                )
            } else if impact >= self.tuning.min_impact_threshold
                && tx.priority_fee_lamports > self.tuning.priority_fee_ceiling_lamports
            {
                ("elevated", 0.75, vec![ActionKind::AlertUser])
            } else if impact >= self.tuning.min_impact_threshold {
                ("caution", 0.6, vec![ActionKind::AlertUser])
            } else {
                ("safe", 0.55, vec![])
            };

        Ok(RawFinding {
            detector_id: self.id().to_string(),
            domain: self.domain(),
            specialization: self.specialization(),
            severity_label: severity_label.to_string(),
            confidence,
            rationale: format!(
                "pending {} with {:.1}% pool impact and {} lamports priority fee",
                tx.kind,
                impact * 100.0,
                tx.priority_fee_lamports
            ),
            proposed_actions,
            error: None,
            detected_at: Utc::now(),
        })
    }
}

/// Sandwich attack exposure detector
pub struct SandwichDetector {
    tuning: MevTuning,
}

impl SandwichDetector {
    /// Create a new sandwich detector
    pub fn new(tuning: MevTuning) -> Self {
        Self { tuning }
    }
}

#[async_trait]
impl Detector for SandwichDetector {
    fn id(&self) -> &str {
        "sandwich-detector"
    }

    fn specialization(&self) -> Specialization {
        Specialization::SandwichPrevention
    }

    async fn evaluate(&self, bundle: &SnapshotBundle) -> Result<RawFinding> {
        let tx = pending_transaction(bundle)?;
        let impact = pool_impact(tx);
        // Slippage headroom beyond the expected impact is what an
        // attacker can extract
        let exposure = tx.slippage_tolerance - impact;

        let (severity_label, confidence, proposed_actions) = if impact
            >= self.tuning.min_impact_threshold
            && tx.slippage_tolerance >= SANDWICH_TOLERANCE_FLOOR
        {
            warn!(
                detector = self.id(),
                signature = %tx.signature,
                slippage_tolerance = tx.slippage_tolerance,
                exposure,
                "Transaction is a profitable sandwich target"
            );
            (
                "critical",
                0.95,
                vec![ActionKind::EmergencyStop, ActionKind::BlockTransaction],
            )
        } else if exposure >= self.tuning.sandwich_exposure {
            ("high", 0.8, vec![ActionKind::BlockTransaction])
        } else if exposure >= self.tuning.min_impact_threshold {
            ("elevated", 0.7, vec![ActionKind::AlertUser])
        } else {
            ("safe", 0.6, vec![])
        };

        Ok(RawFinding {
            detector_id: self.id().to_string(),
            domain: self.domain(),
            specialization: self.specialization(),
            severity_label: severity_label.to_string(),
            confidence,
            rationale: format!(
                "slippage tolerance {:.1}% against {:.1}% expected impact leaves {:.1}% extractable",
                tx.slippage_tolerance * 100.0,
                impact * 100.0,
                exposure.max(0.0) * 100.0
            ),
            proposed_actions,
            error: None,
            detected_at: Utc::now(),
        })
    }
}

/// Fee and routing efficiency checker
pub struct TxOptimizer {
    tuning: MevTuning,
}

impl TxOptimizer {
    /// Create a new transaction optimizer
    pub fn new(tuning: MevTuning) -> Self {
        Self { tuning }
    }
}

#[async_trait]
impl Detector for TxOptimizer {
    fn id(&self) -> &str {
        "tx-optimizer"
    }

    fn specialization(&self) -> Specialization {
        Specialization::MevResistantExecution
    }

    async fn evaluate(&self, bundle: &SnapshotBundle) -> Result<RawFinding> {
        let tx = pending_transaction(bundle)?;
        let impact = pool_impact(tx);

        let (severity_label, confidence, proposed_actions) =
            if tx.priority_fee_lamports > self.tuning.priority_fee_ceiling_lamports {
                info!(
                    detector = self.id(),
                    signature = %tx.signature,
                    priority_fee = tx.priority_fee_lamports,
                    "Priority fee exceeds configured ceiling"
                );
                ("caution", 0.55, vec![ActionKind::UpdateStrategy])
            } else if tx.priority_fee_lamports < LOW_PRIORITY_FEE_LAMPORTS
                && impact >= self.tuning.min_impact_threshold
            {
                // Underpriced transactions linger in the mempool and
                // widen the attack window
                (
                    "elevated",
                    0.65,
                    vec![ActionKind::UpdateStrategy, ActionKind::AlertUser],
                )
            } else {
                ("safe", 0.5, vec![])
            };

        Ok(RawFinding {
            detector_id: self.id().to_string(),
            domain: self.domain(),
            specialization: self.specialization(),
            severity_label: severity_label.to_string(),
            confidence,
            rationale: format!(
                "priority fee {} lamports, {:.1}% pool impact",
                tx.priority_fee_lamports,
                impact * 100.0
            ),
            proposed_actions,
            error: None,
            detected_at: Utc::now(),
        })
    }
}
