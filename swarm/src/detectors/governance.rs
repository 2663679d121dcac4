//! Governance supervision detectors
//!
//! Proposal analysis and sentiment go through the `Scorer` boundary, so
//! their severity labels may arrive in any vocabulary. Voting timing is
//! pure arithmetic and stays local.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use guardian_chaindata::{ProposalSnapshot, SnapshotBundle};

use crate::config::GovernanceTuning;
use crate::detectors::Detector;
use crate::error::{GuardianError, Result};
use crate::scorer::Scorer;
use crate::types::{ActionKind, RawFinding, Specialization};

fn active_proposal(bundle: &SnapshotBundle) -> Result<&ProposalSnapshot> {
    bundle
        .proposal
        .as_ref()
        .ok_or_else(|| GuardianError::detection("proposal snapshot unavailable"))
}

/// DAO proposal analyzer backed by a scorer
pub struct ProposalAnalyzer {
    scorer: Arc<dyn Scorer>,
    tuning: GovernanceTuning,
}

impl ProposalAnalyzer {
    /// Create a new proposal analyzer
    pub fn new(scorer: Arc<dyn Scorer>, tuning: GovernanceTuning) -> Self {
        Self { scorer, tuning }
    }
}

#[async_trait]
impl Detector for ProposalAnalyzer {
    fn id(&self) -> &str {
        "proposal-analyzer"
    }

    fn specialization(&self) -> Specialization {
        Specialization::ProposalEvaluation
    }

    async fn evaluate(&self, bundle: &SnapshotBundle) -> Result<RawFinding> {
        let proposal = active_proposal(bundle)?;

        let payload = json!({
            "treasury_pct": proposal.treasury_pct,
            "support_ratio": proposal.support_ratio(),
            "quorum_reached": proposal.quorum_reached(),
            "category": proposal.category,
        });
        let assessment = self
            .scorer
            .assess("evaluate_dao_proposal", &payload)
            .await?;

        debug!(
            detector = self.id(),
            proposal = %proposal.proposal_id,
            label = %assessment.severity_label,
            confidence = assessment.confidence,
            "Proposal assessed"
        );

        let proposed_actions = if proposal.treasury_pct >= self.tuning.treasury_alert_pct {
            info!(
                detector = self.id(),
                proposal = %proposal.proposal_id,
                treasury_pct = proposal.treasury_pct,
                "Proposal commits a large treasury share"
            );
            vec![ActionKind::VoteProposal, ActionKind::AlertUser]
        } else {
            vec![ActionKind::VoteProposal]
        };

        Ok(RawFinding {
            detector_id: self.id().to_string(),
            domain: self.domain(),
            specialization: self.specialization(),
            severity_label: assessment.severity_label,
            confidence: assessment.confidence,
            rationale: format!("{}: {}", proposal.proposal_id, assessment.summary),
            proposed_actions,
            error: None,
            detected_at: Utc::now(),
        })
    }
}

/// Community sentiment monitor backed by a scorer
pub struct SentimentMonitor {
    scorer: Arc<dyn Scorer>,
    tuning: GovernanceTuning,
}

impl SentimentMonitor {
    /// Create a new sentiment monitor
    pub fn new(scorer: Arc<dyn Scorer>, tuning: GovernanceTuning) -> Self {
        Self { scorer, tuning }
    }
}

#[async_trait]
impl Detector for SentimentMonitor {
    fn id(&self) -> &str {
        "sentiment-monitor"
    }

    fn specialization(&self) -> Specialization {
        Specialization::SentimentAnalysis
    }

    async fn evaluate(&self, bundle: &SnapshotBundle) -> Result<RawFinding> {
        let proposal = active_proposal(bundle)?;
        let support_ratio = proposal.support_ratio();

        let payload = json!({ "support_ratio": support_ratio });
        let assessment = self.scorer.assess("community_sentiment", &payload).await?;

        let contested = (self.tuning.contested_low..=self.tuning.contested_high)
            .contains(&support_ratio);
        let proposed_actions = if contested {
            vec![ActionKind::AlertUser]
        } else {
            vec![]
        };

        Ok(RawFinding {
            detector_id: self.id().to_string(),
            domain: self.domain(),
            specialization: self.specialization(),
            severity_label: assessment.severity_label,
            confidence: assessment.confidence,
            rationale: format!("{}: {}", proposal.proposal_id, assessment.summary),
            proposed_actions,
            error: None,
            detected_at: Utc::now(),
        })
    }
}

/// Voting-window and quorum timing optimizer
pub struct VotingOptimizer {
    tuning: GovernanceTuning,
}

impl VotingOptimizer {
    /// Create a new voting optimizer
    pub fn new(tuning: GovernanceTuning) -> Self {
        Self { tuning }
    }
}

#[async_trait]
impl Detector for VotingOptimizer {
    fn id(&self) -> &str {
        "voting-optimizer"
    }

    fn specialization(&self) -> Specialization {
        Specialization::VotingStrategy
    }

    async fn evaluate(&self, bundle: &SnapshotBundle) -> Result<RawFinding> {
        let proposal = active_proposal(bundle)?;
        let hours_remaining = (proposal.voting_ends - Utc::now()).num_hours();
        let inside_window = hours_remaining <= self.tuning.urgent_window_hours;

        let (severity_label, confidence, proposed_actions) =
            if inside_window && !proposal.quorum_reached() {
                info!(
                    detector = self.id(),
                    proposal = %proposal.proposal_id,
                    hours_remaining,
                    "Quorum not reached inside the urgent window"
                );
                (
                    "urgent",
                    0.75,
                    vec![ActionKind::VoteProposal, ActionKind::AlertUser],
                )
            } else if inside_window {
                ("routine", 0.6, vec![ActionKind::VoteProposal])
            } else {
                ("routine", 0.55, vec![])
            };

        Ok(RawFinding {
            detector_id: self.id().to_string(),
            domain: self.domain(),
            specialization: self.specialization(),
            severity_label: severity_label.to_string(),
            confidence,
            rationale: format!(
                "{}: {} hours until voting ends, quorum {}",
                proposal.proposal_id,
                hours_remaining.max(0),
                if proposal.quorum_reached() {
                    "reached"
                } else {
                    "not reached"
                }
            ),
            proposed_actions,
            error: None,
            detected_at: Utc::now(),
        })
    }
}
