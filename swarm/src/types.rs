//! Core types for the Guardian swarm
//!
//! The canonical threat model: detector output (`RawFinding`), the
//! normalized `Signal` the coordinator consumes, and the `ActionPlan` it
//! emits. All per-cycle: nothing here survives plan emission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::error::GuardianError;

/// Namespace for deterministic signal id derivation
const SIGNAL_NAMESPACE: Uuid = Uuid::from_u128(0x6d5f_8a2e_41c3_4b7a_9f01_d2e6_c884_3a10);

/// Protection domains covered by the swarms
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Risk,
    Mev,
    Governance,
}

impl Domain {
    /// Get the human-readable domain name
    pub fn name(&self) -> &'static str {
        match self {
            Domain::Risk => "risk",
            Domain::Mev => "mev",
            Domain::Governance => "governance",
        }
    }

    /// All protection domains
    pub fn all() -> [Domain; 3] {
        [Domain::Risk, Domain::Mev, Domain::Governance]
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Domain {
    type Err = GuardianError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "risk" => Ok(Domain::Risk),
            "mev" => Ok(Domain::Mev),
            "governance" => Ok(Domain::Governance),
            _ => Err(GuardianError::invalid_config(format!(
                "Unknown domain: {}",
                s
            ))),
        }
    }
}

/// Canonical threat severity, ordered low to critical
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Numeric rank used by the priority key: LOW=1 .. CRITICAL=4
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }

    /// Get the human-readable severity name
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// System actions a plan can recommend
///
/// Declaration order doubles as the final deterministic tie-break in the
/// coordinator's priority key, so keep the most drastic actions first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    EmergencyStop,
    BlockTransaction,
    RebalancePortfolio,
    AlertUser,
    VoteProposal,
    UpdateStrategy,
}

impl ActionKind {
    /// Get the action name as used in config files and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::EmergencyStop => "emergency_stop",
            ActionKind::BlockTransaction => "block_transaction",
            ActionKind::RebalancePortfolio => "rebalance_portfolio",
            ActionKind::AlertUser => "alert_user",
            ActionKind::VoteProposal => "vote_proposal",
            ActionKind::UpdateStrategy => "update_strategy",
        }
    }

    /// All recognized actions
    pub fn all() -> [ActionKind; 6] {
        [
            ActionKind::EmergencyStop,
            ActionKind::BlockTransaction,
            ActionKind::RebalancePortfolio,
            ActionKind::AlertUser,
            ActionKind::VoteProposal,
            ActionKind::UpdateStrategy,
        ]
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Detector specializations, closed per domain
///
/// Validated at swarm assembly: registering a detector into a swarm whose
/// domain differs from its specialization's is a startup error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialization {
    // Risk swarm
    PortfolioRisk,
    LiquidityRisk,
    VolatilityTracking,
    // MEV swarm
    MempoolThreatDetection,
    SandwichPrevention,
    MevResistantExecution,
    // Governance swarm
    ProposalEvaluation,
    SentimentAnalysis,
    VotingStrategy,
}

impl Specialization {
    /// The domain this specialization belongs to
    pub fn domain(&self) -> Domain {
        match self {
            Specialization::PortfolioRisk
            | Specialization::LiquidityRisk
            | Specialization::VolatilityTracking => Domain::Risk,
            Specialization::MempoolThreatDetection
            | Specialization::SandwichPrevention
            | Specialization::MevResistantExecution => Domain::Mev,
            Specialization::ProposalEvaluation
            | Specialization::SentimentAnalysis
            | Specialization::VotingStrategy => Domain::Governance,
        }
    }
}

/// Unstructured detector output, consumed once by the normalizer
///
/// `severity_label` uses the producing detector's own vocabulary (the MEV
/// swarm speaks safe/caution/elevated, the risk swarm low/medium/high); the
/// normalizer owns the mapping to canonical severity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFinding {
    /// Id of the detector that produced this finding
    pub detector_id: String,

    /// Detector's protection domain
    pub domain: Domain,

    /// Detector's declared specialization
    pub specialization: Specialization,

    /// Provider-vocabulary severity hint
    pub severity_label: String,

    /// Detector confidence, 0.0 to 1.0
    pub confidence: f64,

    /// Free-text rationale
    pub rationale: String,

    /// Actions the detector recommends, most drastic first
    pub proposed_actions: Vec<ActionKind>,

    /// Error context when the detector failed or timed out
    pub error: Option<String>,

    /// Detection timestamp
    pub detected_at: DateTime<Utc>,
}

impl RawFinding {
    /// Build a failure finding for a detector that errored or timed out
    ///
    /// Failure findings never abort a cycle: they carry zero confidence,
    /// get suppressed by the normalizer, and surface only through the
    /// plan's degraded-domain metadata.
    pub fn failure(
        detector_id: &str,
        domain: Domain,
        specialization: Specialization,
        error: impl Into<String>,
    ) -> Self {
        Self {
            detector_id: detector_id.to_string(),
            domain,
            specialization,
            severity_label: "unknown".to_string(),
            confidence: 0.0,
            rationale: "detector evaluation failed".to_string(),
            proposed_actions: Vec::new(),
            error: Some(error.into()),
            detected_at: Utc::now(),
        }
    }

    /// Whether this finding records a detector failure
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Canonical normalized signal consumed by the coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// Deterministic id, stable for dedup: UUIDv5 of (detector_id, snapshot_id)
    pub id: Uuid,

    /// Protection domain
    pub domain: Domain,

    /// Producing detector's specialization
    pub specialization: Specialization,

    /// Canonical severity
    pub severity: Severity,

    /// Confidence, 0.0 to 1.0; always at or above the suppression threshold
    pub confidence: f64,

    /// Recommended actions
    pub proposed_actions: Vec<ActionKind>,

    /// Rationale carried over from the finding
    pub rationale: String,

    /// Detection timestamp (first-detected wins ties)
    pub detected_at: DateTime<Utc>,
}

impl Signal {
    /// Derive the deterministic signal id for a detector/snapshot pair
    pub fn derive_id(detector_id: &str, snapshot_id: Uuid) -> Uuid {
        let name = format!("{}:{}", detector_id, snapshot_id);
        Uuid::new_v5(&SIGNAL_NAMESPACE, name.as_bytes())
    }
}

/// One entry of an emitted action plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Recommended action; unique within a plan
    pub action: ActionKind,

    /// Execution order, 1-based and contiguous
    pub priority_rank: u32,

    /// Severity of the merged recommendation behind this entry
    pub severity: Severity,

    /// Aggregate confidence after probabilistic-OR merging
    pub confidence: f64,

    /// Ids of every signal justifying this action, including signals whose
    /// own action was dropped in conflict resolution
    pub justification: BTreeSet<Uuid>,
}

/// Ordered, deduplicated, conflict-resolved plan for one cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionPlan {
    /// Plan id
    pub plan_id: Uuid,

    /// Snapshot bundle this plan was derived from
    pub snapshot_id: Uuid,

    /// Entries in execution order
    pub entries: Vec<PlanEntry>,

    /// True when the top HIGH/CRITICAL entry lacks consensus confidence and
    /// the executor should require human confirmation
    pub advisory: bool,

    /// Domains that contributed no data this cycle ("no data", as opposed
    /// to "no threats")
    pub degraded_domains: Vec<Domain>,

    /// Emission timestamp
    pub created_at: DateTime<Utc>,
}

impl ActionPlan {
    /// Look up the entry for an action, if present
    pub fn entry(&self, action: ActionKind) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| e.action == action)
    }

    /// Whether the plan recommends no actions at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
