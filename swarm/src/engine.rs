//! Cycle engine - one snapshot bundle in, one action plan out
//!
//! Owns the three domain swarms, the normalizer and the coordinator. All
//! cycle state lives on the stack of `run_cycle`; dropping the engine
//! between cycles loses nothing.

use std::sync::Arc;

use tracing::{info, warn};

use guardian_chaindata::SnapshotBundle;

use crate::config::GuardianConfig;
use crate::coordinator::Coordinator;
use crate::error::Result;
use crate::normalize::Normalizer;
use crate::scorer::Scorer;
use crate::swarm::{build_governance_swarm, build_mev_swarm, build_risk_swarm, DomainSwarm};
use crate::types::{ActionPlan, Domain, RawFinding, Signal};

/// The whole pipeline behind one evaluation cycle
pub struct GuardianEngine {
    swarms: Vec<DomainSwarm>,
    normalizer: Normalizer,
    coordinator: Coordinator,
    config: GuardianConfig,
}

impl GuardianEngine {
    /// Assemble all three swarms and the coordination pipeline
    pub fn new(config: GuardianConfig, scorer: Arc<dyn Scorer>) -> Result<Self> {
        config.validate()?;

        let swarms = vec![
            build_risk_swarm(&config)?,
            build_mev_swarm(&config)?,
            build_governance_swarm(&config, scorer)?,
        ];

        for swarm in &swarms {
            info!(
                domain = %swarm.domain(),
                detectors = swarm.len(),
                "Swarm assembled"
            );
        }

        Ok(Self {
            swarms,
            normalizer: Normalizer::new(&config),
            coordinator: Coordinator::new(config.clone())?,
            config,
        })
    }

    /// Whether the bundle carries data for a swarm's domain
    fn domain_has_data(bundle: &SnapshotBundle, domain: Domain) -> bool {
        match domain {
            Domain::Risk => bundle.portfolio.is_some(),
            Domain::Mev => bundle.transaction.is_some(),
            Domain::Governance => bundle.proposal.is_some(),
        }
    }

    /// Run one full evaluation cycle over the bundle
    ///
    /// A domain with no snapshot, or whose detectors all failed, lands in
    /// the plan's `degraded_domains`: absence of signals there means no
    /// data, not no threats.
    pub async fn run_cycle(&self, bundle: &SnapshotBundle) -> Result<ActionPlan> {
        bundle.validate()?;

        let mut findings: Vec<RawFinding> = Vec::new();
        let mut degraded_domains: Vec<Domain> = Vec::new();

        // All swarms complete before any coordination starts
        for swarm in &self.swarms {
            if !Self::domain_has_data(bundle, swarm.domain()) {
                info!(
                    domain = %swarm.domain(),
                    "No snapshot for domain this cycle, marking degraded"
                );
                degraded_domains.push(swarm.domain());
                continue;
            }

            let swarm_findings = swarm.run(bundle).await;
            if !swarm_findings.is_empty() && swarm_findings.iter().all(|f| f.is_failure()) {
                warn!(
                    domain = %swarm.domain(),
                    "Every detector in the swarm failed, marking degraded"
                );
                degraded_domains.push(swarm.domain());
            }
            findings.extend(swarm_findings);
        }

        let mut signals: Vec<Signal> =
            self.normalizer.normalize_all(&findings, bundle.snapshot_id);

        let max = self.config.cycle.max_signals_per_cycle;
        if signals.len() > max {
            warn!(
                signals = signals.len(),
                max, "Signal volume above cycle cap, truncating"
            );
            signals.truncate(max);
        }

        info!(
            snapshot_id = %bundle.snapshot_id,
            findings = findings.len(),
            signals = signals.len(),
            degraded = degraded_domains.len(),
            "Cycle inputs normalized"
        );

        Ok(self
            .coordinator
            .coordinate(&signals, degraded_domains, bundle.snapshot_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::StaticScorer;
    use guardian_chaindata::{FixtureProvider, Network, SnapshotProvider};

    fn engine() -> GuardianEngine {
        GuardianEngine::new(GuardianConfig::default(), Arc::new(StaticScorer::new())).unwrap()
    }

    #[tokio::test]
    async fn test_empty_bundle_degrades_all_domains() {
        let plan = engine()
            .run_cycle(&SnapshotBundle::new(Network::MainnetBeta))
            .await
            .unwrap();

        assert!(plan.is_empty());
        assert_eq!(plan.degraded_domains.len(), 3);
    }

    #[tokio::test]
    async fn test_fixture_bundle_produces_a_plan() {
        let provider = FixtureProvider::new(Network::MainnetBeta);
        let bundle = provider.fetch().await.unwrap();

        let plan = engine().run_cycle(&bundle).await.unwrap();

        assert!(plan.degraded_domains.is_empty());
        assert!(!plan.is_empty());
        // Unique actions, contiguous ranks
        for (i, entry) in plan.entries.iter().enumerate() {
            assert_eq!(entry.priority_rank, (i + 1) as u32);
        }
        let actions: std::collections::BTreeSet<_> =
            plan.entries.iter().map(|e| e.action).collect();
        assert_eq!(actions.len(), plan.entries.len());
    }

    #[tokio::test]
    async fn test_partial_bundle_flags_missing_domains() {
        let provider = FixtureProvider::new(Network::MainnetBeta);
        let mut bundle = provider.fetch().await.unwrap();
        bundle.transaction = None;
        bundle.proposal = None;

        let plan = engine().run_cycle(&bundle).await.unwrap();

        assert!(plan.degraded_domains.contains(&Domain::Mev));
        assert!(plan.degraded_domains.contains(&Domain::Governance));
        assert!(!plan.degraded_domains.contains(&Domain::Risk));
    }

    #[tokio::test]
    async fn test_same_bundle_gives_same_plan_shape() {
        let provider = FixtureProvider::new(Network::MainnetBeta);
        let bundle = provider.fetch().await.unwrap();
        let engine = engine();

        let first = engine.run_cycle(&bundle).await.unwrap();
        let second = engine.run_cycle(&bundle).await.unwrap();

        assert_ne!(first.plan_id, second.plan_id);
        assert_eq!(first.entries.len(), second.entries.len());
        for (a, b) in first.entries.iter().zip(second.entries.iter()) {
            assert_eq!(a.action, b.action);
            assert_eq!(a.priority_rank, b.priority_rank);
            assert_eq!(a.severity, b.severity);
            assert_eq!(a.justification, b.justification);
        }
    }
}
