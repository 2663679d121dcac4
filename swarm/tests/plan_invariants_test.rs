//! Property tests over the coordinator's plan invariants
//!
//! Whatever mix of signals a cycle produces, the emitted plan must hold
//! its structural guarantees: unique actions, contiguous 1-based ranks,
//! bounded confidence, and input-order independence.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use guardian_swarm::{
    ActionKind, Coordinator, Domain, GuardianConfig, Severity, Signal, Specialization,
};

fn any_domain() -> impl Strategy<Value = Domain> {
    prop_oneof![
        Just(Domain::Risk),
        Just(Domain::Mev),
        Just(Domain::Governance),
    ]
}

fn any_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Low),
        Just(Severity::Medium),
        Just(Severity::High),
        Just(Severity::Critical),
    ]
}

fn any_actions() -> impl Strategy<Value = Vec<ActionKind>> {
    prop::sample::subsequence(ActionKind::all().to_vec(), 0..=6)
}

prop_compose! {
    fn any_signal()(
        domain in any_domain(),
        severity in any_severity(),
        confidence in 0.5f64..=1.0,
        actions in any_actions(),
        seed in any::<u128>(),
        offset_secs in 0i64..86_400,
    ) -> Signal {
        let specialization = match domain {
            Domain::Risk => Specialization::PortfolioRisk,
            Domain::Mev => Specialization::MempoolThreatDetection,
            Domain::Governance => Specialization::ProposalEvaluation,
        };
        Signal {
            id: Uuid::from_u128(seed),
            domain,
            specialization,
            severity,
            confidence,
            proposed_actions: actions,
            rationale: "generated".to_string(),
            detected_at: Utc.timestamp_opt(1_700_000_000 + offset_secs, 0).unwrap(),
        }
    }
}

proptest! {
    #[test]
    fn plan_actions_are_unique_and_ranks_contiguous(
        signals in prop::collection::vec(any_signal(), 0..24)
    ) {
        let coordinator = Coordinator::new(GuardianConfig::default()).unwrap();
        let plan = coordinator.coordinate(&signals, vec![], Uuid::nil());

        let mut seen = std::collections::BTreeSet::new();
        for (i, entry) in plan.entries.iter().enumerate() {
            prop_assert_eq!(entry.priority_rank, (i + 1) as u32);
            prop_assert!(seen.insert(entry.action));
        }
    }

    #[test]
    fn merged_confidence_stays_bounded(
        signals in prop::collection::vec(any_signal(), 0..24)
    ) {
        let coordinator = Coordinator::new(GuardianConfig::default()).unwrap();
        let plan = coordinator.coordinate(&signals, vec![], Uuid::nil());

        for entry in &plan.entries {
            prop_assert!(entry.confidence >= 0.0 && entry.confidence <= 1.0);
            // Merging can only raise confidence above each contributor's
            prop_assert!(!entry.justification.is_empty());
        }
    }

    #[test]
    fn coordination_ignores_input_order(
        signals in prop::collection::vec(any_signal(), 0..24)
    ) {
        let coordinator = Coordinator::new(GuardianConfig::default()).unwrap();
        let snapshot_id = Uuid::nil();

        let forward = coordinator.coordinate(&signals, vec![], snapshot_id);
        let mut reversed = signals.clone();
        reversed.reverse();
        let backward = coordinator.coordinate(&reversed, vec![], snapshot_id);

        prop_assert_eq!(forward.entries.len(), backward.entries.len());
        for (f, b) in forward.entries.iter().zip(backward.entries.iter()) {
            prop_assert_eq!(f.action, b.action);
            prop_assert_eq!(f.priority_rank, b.priority_rank);
            prop_assert_eq!(f.severity, b.severity);
            prop_assert!((f.confidence - b.confidence).abs() < 1e-9);
            prop_assert_eq!(&f.justification, &b.justification);
        }
    }

    #[test]
    fn conflicting_actions_never_coexist(
        signals in prop::collection::vec(any_signal(), 0..24)
    ) {
        let coordinator = Coordinator::new(GuardianConfig::default()).unwrap();
        let plan = coordinator.coordinate(&signals, vec![], Uuid::nil());

        // The default precedence pairs are mutually exclusive regardless
        // of which side out-ranks the other
        if plan.entry(ActionKind::EmergencyStop).is_some() {
            prop_assert!(plan.entry(ActionKind::RebalancePortfolio).is_none());
            prop_assert!(plan.entry(ActionKind::UpdateStrategy).is_none());
        }
        if plan.entry(ActionKind::RebalancePortfolio).is_some()
            || plan.entry(ActionKind::UpdateStrategy).is_some()
        {
            prop_assert!(plan.entry(ActionKind::EmergencyStop).is_none());
        }
    }
}
