//! Coordinator - deterministic fold from signals to an action plan
//!
//! One call per cycle. The same signals in any input order produce the
//! same plan: merge is per action kind, ranking is a total order, and the
//! final tie-break is the action kind's own ordinal. The coordinator holds
//! no state across cycles and never errors on partial data.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::GuardianConfig;
use crate::error::Result;
use crate::types::{ActionKind, ActionPlan, Domain, PlanEntry, Severity, Signal};

/// Phases a coordination cycle moves through, in order
///
/// `Emitted` is always reached: no signal content can abort a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Collecting,
    Merging,
    Ranking,
    ConflictResolution,
    Emitted,
}

impl std::fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CyclePhase::Collecting => "collecting",
            CyclePhase::Merging => "merging",
            CyclePhase::Ranking => "ranking",
            CyclePhase::ConflictResolution => "conflict_resolution",
            CyclePhase::Emitted => "emitted",
        };
        write!(f, "{}", name)
    }
}

/// Merge unit: all signals proposing one action kind
struct Recommendation {
    action: ActionKind,
    severity: Severity,
    confidence: f64,
    domain_weight: u32,
    earliest: DateTime<Utc>,
    justification: BTreeSet<Uuid>,
}

/// Deterministic signal-to-plan coordinator
pub struct Coordinator {
    config: GuardianConfig,
}

impl Coordinator {
    /// Create a coordinator; the configuration must already be validated
    pub fn new(config: GuardianConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Fold one cycle's signals into an action plan
    pub fn coordinate(
        &self,
        signals: &[Signal],
        degraded_domains: Vec<Domain>,
        snapshot_id: Uuid,
    ) -> ActionPlan {
        debug!(phase = %CyclePhase::Collecting, signals = signals.len(), "Cycle start");

        let recommendations = self.merge(signals);
        debug!(
            phase = %CyclePhase::Merging,
            recommendations = recommendations.len(),
            "Signals merged per action"
        );

        let ranked = Self::rank(recommendations);
        debug!(phase = %CyclePhase::Ranking, "Recommendations ranked");

        let survivors = self.resolve_conflicts(ranked);
        debug!(
            phase = %CyclePhase::ConflictResolution,
            survivors = survivors.len(),
            "Conflicts resolved"
        );

        let entries: Vec<PlanEntry> = survivors
            .into_iter()
            .enumerate()
            .map(|(i, rec)| PlanEntry {
                action: rec.action,
                priority_rank: (i + 1) as u32,
                severity: rec.severity,
                confidence: rec.confidence,
                justification: rec.justification,
            })
            .collect();

        let advisory = self.needs_corroboration(&entries);

        let plan = ActionPlan {
            plan_id: Uuid::new_v4(),
            snapshot_id,
            entries,
            advisory,
            degraded_domains,
            created_at: Utc::now(),
        };

        info!(
            phase = %CyclePhase::Emitted,
            plan_id = %plan.plan_id,
            entries = plan.entries.len(),
            advisory = plan.advisory,
            degraded = plan.degraded_domains.len(),
            "Action plan emitted"
        );
        plan
    }

    /// Bucket signals per proposed action and combine their evidence
    ///
    /// Confidence merges as a probabilistic OR: independent corroborating
    /// signals raise it, and it never exceeds 1.0.
    fn merge(&self, signals: &[Signal]) -> Vec<Recommendation> {
        let mut buckets: BTreeMap<ActionKind, Recommendation> = BTreeMap::new();

        for signal in signals {
            let weight = self.config.domain_weight(signal.domain);
            for &action in &signal.proposed_actions {
                buckets
                    .entry(action)
                    .and_modify(|rec| {
                        rec.severity = rec.severity.max(signal.severity);
                        rec.confidence = 1.0 - (1.0 - rec.confidence) * (1.0 - signal.confidence);
                        rec.domain_weight = rec.domain_weight.max(weight);
                        rec.earliest = rec.earliest.min(signal.detected_at);
                        rec.justification.insert(signal.id);
                    })
                    .or_insert_with(|| Recommendation {
                        action,
                        severity: signal.severity,
                        confidence: signal.confidence,
                        domain_weight: weight,
                        earliest: signal.detected_at,
                        justification: BTreeSet::from([signal.id]),
                    });
            }
        }

        buckets.into_values().collect()
    }

    /// Total priority order over recommendations
    fn rank(mut recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
        recommendations.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| b.confidence.total_cmp(&a.confidence))
                .then_with(|| b.domain_weight.cmp(&a.domain_weight))
                .then_with(|| a.earliest.cmp(&b.earliest))
                // Action kinds are declared most drastic first
                .then_with(|| a.action.cmp(&b.action))
        });
        recommendations
    }

    /// Drop the lower-ranked side of each conflicting pair, folding its
    /// evidence into the survivor
    ///
    /// The precedence table defines which pairs conflict in either
    /// direction; rank decides who survives.
    fn resolve_conflicts(&self, ranked: Vec<Recommendation>) -> Vec<Recommendation> {
        let mut survivors: Vec<Recommendation> = Vec::with_capacity(ranked.len());

        for candidate in ranked {
            let winner = survivors.iter_mut().find(|s| {
                self.config.supersedes(s.action, candidate.action)
                    || self.config.supersedes(candidate.action, s.action)
            });

            match winner {
                Some(winner) => {
                    info!(
                        winner = winner.action.as_str(),
                        dropped = candidate.action.as_str(),
                        "Conflicting action superseded"
                    );
                    winner.justification.extend(candidate.justification);
                }
                None => survivors.push(candidate),
            }
        }

        survivors
    }

    /// Whether the plan's leading serious entry lacks consensus backing
    fn needs_corroboration(&self, entries: &[PlanEntry]) -> bool {
        entries
            .iter()
            .find(|e| e.severity >= Severity::High)
            .is_some_and(|e| e.confidence < self.config.consensus_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Specialization;

    fn signal(
        domain: Domain,
        severity: Severity,
        confidence: f64,
        actions: Vec<ActionKind>,
    ) -> Signal {
        let specialization = match domain {
            Domain::Risk => Specialization::PortfolioRisk,
            Domain::Mev => Specialization::MempoolThreatDetection,
            Domain::Governance => Specialization::ProposalEvaluation,
        };
        Signal {
            id: Uuid::new_v4(),
            domain,
            specialization,
            severity,
            confidence,
            proposed_actions: actions,
            rationale: "test".to_string(),
            detected_at: Utc::now(),
        }
    }

    fn coordinator() -> Coordinator {
        Coordinator::new(GuardianConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_signals_give_empty_plan() {
        let plan = coordinator().coordinate(&[], vec![], Uuid::new_v4());
        assert!(plan.is_empty());
        assert!(!plan.advisory);
    }

    #[test]
    fn test_merge_is_probabilistic_or() {
        let signals = vec![
            signal(Domain::Risk, Severity::High, 0.6, vec![ActionKind::AlertUser]),
            signal(Domain::Mev, Severity::Medium, 0.5, vec![ActionKind::AlertUser]),
        ];
        let plan = coordinator().coordinate(&signals, vec![], Uuid::new_v4());

        assert_eq!(plan.entries.len(), 1);
        let entry = plan.entry(ActionKind::AlertUser).unwrap();
        // 1 - (1 - 0.6)(1 - 0.5) = 0.8
        assert!((entry.confidence - 0.8).abs() < 1e-12);
        assert_eq!(entry.severity, Severity::High);
        assert_eq!(entry.justification.len(), 2);
    }

    #[test]
    fn test_ranking_prefers_severity_then_confidence() {
        let signals = vec![
            signal(
                Domain::Governance,
                Severity::Critical,
                0.6,
                vec![ActionKind::VoteProposal],
            ),
            signal(Domain::Mev, Severity::High, 0.95, vec![ActionKind::BlockTransaction]),
            signal(Domain::Risk, Severity::High, 0.7, vec![ActionKind::AlertUser]),
        ];
        let plan = coordinator().coordinate(&signals, vec![], Uuid::new_v4());

        let actions: Vec<ActionKind> = plan.entries.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                ActionKind::VoteProposal,
                ActionKind::BlockTransaction,
                ActionKind::AlertUser
            ]
        );
    }

    #[test]
    fn test_domain_weight_breaks_exact_ties() {
        let now = Utc::now();
        let mut mev = signal(Domain::Mev, Severity::High, 0.8, vec![ActionKind::BlockTransaction]);
        let mut gov = signal(
            Domain::Governance,
            Severity::High,
            0.8,
            vec![ActionKind::VoteProposal],
        );
        mev.detected_at = now;
        gov.detected_at = now;

        let plan = coordinator().coordinate(&[gov, mev], vec![], Uuid::new_v4());
        assert_eq!(plan.entries[0].action, ActionKind::BlockTransaction);
    }

    #[test]
    fn test_emergency_stop_supersedes_rebalance() {
        let stop_signal = signal(
            Domain::Mev,
            Severity::Critical,
            0.95,
            vec![ActionKind::EmergencyStop],
        );
        let rebalance_signal = signal(
            Domain::Risk,
            Severity::High,
            0.9,
            vec![ActionKind::RebalancePortfolio],
        );
        let rebalance_id = rebalance_signal.id;

        let plan =
            coordinator().coordinate(&[stop_signal, rebalance_signal], vec![], Uuid::new_v4());

        assert!(plan.entry(ActionKind::RebalancePortfolio).is_none());
        let stop = plan.entry(ActionKind::EmergencyStop).unwrap();
        assert_eq!(stop.priority_rank, 1);
        // The dropped action's evidence survives on the winner
        assert!(stop.justification.contains(&rebalance_id));
        assert_eq!(stop.justification.len(), 2);
    }

    #[test]
    fn test_conflicting_pair_never_coexists_when_superseded_ranks_higher() {
        let rebalance_signal = signal(
            Domain::Risk,
            Severity::Critical,
            0.95,
            vec![ActionKind::RebalancePortfolio],
        );
        let stop_signal = signal(
            Domain::Mev,
            Severity::Low,
            0.5,
            vec![ActionKind::EmergencyStop],
        );
        let stop_id = stop_signal.id;

        let plan =
            coordinator().coordinate(&[rebalance_signal, stop_signal], vec![], Uuid::new_v4());

        // Rank decides the survivor; the weaker half of the pair is dropped
        // even when it is the precedence table's winner
        assert!(plan.entry(ActionKind::EmergencyStop).is_none());
        let rebalance = plan.entry(ActionKind::RebalancePortfolio).unwrap();
        assert_eq!(rebalance.priority_rank, 1);
        assert!(rebalance.justification.contains(&stop_id));
        assert_eq!(plan.entries.len(), 1);
    }

    #[test]
    fn test_ranks_are_contiguous_after_conflict_resolution() {
        let signals = vec![
            signal(
                Domain::Mev,
                Severity::Critical,
                0.95,
                vec![ActionKind::EmergencyStop, ActionKind::BlockTransaction],
            ),
            signal(
                Domain::Risk,
                Severity::High,
                0.8,
                vec![ActionKind::RebalancePortfolio, ActionKind::AlertUser],
            ),
        ];
        let plan = coordinator().coordinate(&signals, vec![], Uuid::new_v4());

        for (i, entry) in plan.entries.iter().enumerate() {
            assert_eq!(entry.priority_rank, (i + 1) as u32);
        }
    }

    #[test]
    fn test_weak_serious_plan_is_advisory() {
        let signals = vec![signal(
            Domain::Risk,
            Severity::High,
            0.6,
            vec![ActionKind::RebalancePortfolio],
        )];
        let plan = coordinator().coordinate(&signals, vec![], Uuid::new_v4());
        assert!(plan.advisory);
    }

    #[test]
    fn test_corroborated_serious_plan_is_confirmed() {
        let signals = vec![
            signal(Domain::Risk, Severity::High, 0.6, vec![ActionKind::RebalancePortfolio]),
            signal(Domain::Risk, Severity::High, 0.5, vec![ActionKind::RebalancePortfolio]),
        ];
        let plan = coordinator().coordinate(&signals, vec![], Uuid::new_v4());
        // merged 0.8 >= 0.7
        assert!(!plan.advisory);
    }

    #[test]
    fn test_low_severity_plan_never_needs_consensus() {
        let signals = vec![signal(
            Domain::Governance,
            Severity::Medium,
            0.55,
            vec![ActionKind::VoteProposal],
        )];
        let plan = coordinator().coordinate(&signals, vec![], Uuid::new_v4());
        assert!(!plan.advisory);
    }

    #[test]
    fn test_coordination_is_order_independent() {
        let now = Utc::now();
        let mut a = signal(Domain::Mev, Severity::Critical, 0.9, vec![ActionKind::EmergencyStop]);
        let mut b = signal(Domain::Risk, Severity::High, 0.7, vec![ActionKind::AlertUser]);
        let mut c = signal(
            Domain::Governance,
            Severity::Medium,
            0.6,
            vec![ActionKind::VoteProposal, ActionKind::AlertUser],
        );
        a.detected_at = now;
        b.detected_at = now;
        c.detected_at = now;

        let snapshot_id = Uuid::new_v4();
        let coordinator = coordinator();
        let forward = coordinator.coordinate(
            &[a.clone(), b.clone(), c.clone()],
            vec![],
            snapshot_id,
        );
        let reverse = coordinator.coordinate(&[c, b, a], vec![], snapshot_id);

        let forward_actions: Vec<ActionKind> = forward.entries.iter().map(|e| e.action).collect();
        let reverse_actions: Vec<ActionKind> = reverse.entries.iter().map(|e| e.action).collect();
        assert_eq!(forward_actions, reverse_actions);

        for (f, r) in forward.entries.iter().zip(reverse.entries.iter()) {
            assert_eq!(f.priority_rank, r.priority_rank);
            assert!((f.confidence - r.confidence).abs() < 1e-12);
            assert_eq!(f.justification, r.justification);
        }
    }
}
