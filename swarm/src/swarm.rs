//! Domain swarms - fan detector evaluation out per protection domain
//!
//! A swarm owns every detector registered for its domain. Detection runs
//! concurrently with a per-detector timeout; a detector that errors or
//! times out yields a zero-confidence failure finding instead of aborting
//! the cycle, and never leaks partial results into it.

use std::sync::Arc;

use futures::future::join_all;
use tokio::time::timeout;
use tracing::{info, warn};

use guardian_chaindata::SnapshotBundle;

use crate::config::GuardianConfig;
use crate::detectors::{
    Detector, LiquidityMonitor, MempoolScanner, PortfolioRiskAnalyzer, ProposalAnalyzer,
    SandwichDetector, SentimentMonitor, TxOptimizer, VolatilityTracker, VotingOptimizer,
};
use crate::error::{GuardianError, Result};
use crate::scorer::Scorer;
use crate::types::{Domain, RawFinding};

/// A group of detectors sharing one protection domain
pub struct DomainSwarm {
    domain: Domain,
    detectors: Vec<Arc<dyn Detector>>,
    timeout: std::time::Duration,
}

impl DomainSwarm {
    /// Create an empty swarm for the given domain
    pub fn new(domain: Domain, config: &GuardianConfig) -> Self {
        Self {
            domain,
            detectors: Vec::new(),
            timeout: config.detector_timeout(),
        }
    }

    /// The swarm's protection domain
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Registered detector count
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    /// Whether the swarm has no detectors
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Register a detector; its specialization must match the swarm's domain
    pub fn register(&mut self, detector: Arc<dyn Detector>) -> Result<()> {
        if detector.domain() != self.domain {
            return Err(GuardianError::invalid_config(format!(
                "detector '{}' belongs to domain '{}', not '{}'",
                detector.id(),
                detector.domain(),
                self.domain
            )));
        }
        self.detectors.push(detector);
        Ok(())
    }

    /// Run every registered detector over the bundle, concurrently
    ///
    /// Always returns one finding per detector. Errors and timeouts become
    /// failure findings, so the output length is fixed at registration time.
    pub async fn run(&self, bundle: &SnapshotBundle) -> Vec<RawFinding> {
        let evaluations = self.detectors.iter().map(|detector| {
            let detector = detector.clone();
            async move {
                match timeout(self.timeout, detector.evaluate(bundle)).await {
                    Ok(Ok(finding)) => finding,
                    Ok(Err(e)) => {
                        warn!(
                            detector = detector.id(),
                            domain = %self.domain,
                            error = %e,
                            "Detector evaluation failed"
                        );
                        RawFinding::failure(
                            detector.id(),
                            detector.domain(),
                            detector.specialization(),
                            e.to_string(),
                        )
                    }
                    Err(_) => {
                        let e = GuardianError::DetectorTimeout {
                            detector: detector.id().to_string(),
                            timeout_secs: self.timeout.as_secs(),
                        };
                        warn!(
                            detector = detector.id(),
                            domain = %self.domain,
                            category = e.category(),
                            "Detector evaluation timed out"
                        );
                        RawFinding::failure(
                            detector.id(),
                            detector.domain(),
                            detector.specialization(),
                            e.to_string(),
                        )
                    }
                }
            }
        });

        let findings = join_all(evaluations).await;
        info!(
            domain = %self.domain,
            findings = findings.len(),
            failures = findings.iter().filter(|f| f.is_failure()).count(),
            "Swarm detection complete"
        );
        findings
    }
}

/// Assemble the risk swarm from configuration
pub fn build_risk_swarm(config: &GuardianConfig) -> Result<DomainSwarm> {
    let mut swarm = DomainSwarm::new(Domain::Risk, config);
    let tuning = &config.detectors;

    if config.detector_enabled("portfolio-risk-analyzer") {
        swarm.register(Arc::new(PortfolioRiskAnalyzer::new(tuning.risk.clone())))?;
    }
    if config.detector_enabled("liquidity-monitor") {
        swarm.register(Arc::new(LiquidityMonitor::new(tuning.slippage.clone())))?;
    }
    if config.detector_enabled("volatility-tracker") {
        swarm.register(Arc::new(VolatilityTracker::new()))?;
    }
    Ok(swarm)
}

/// Assemble the MEV swarm from configuration
pub fn build_mev_swarm(config: &GuardianConfig) -> Result<DomainSwarm> {
    let mut swarm = DomainSwarm::new(Domain::Mev, config);
    let tuning = &config.detectors;

    if config.detector_enabled("mempool-scanner") {
        swarm.register(Arc::new(MempoolScanner::new(tuning.mev.clone())))?;
    }
    if config.detector_enabled("sandwich-detector") {
        swarm.register(Arc::new(SandwichDetector::new(tuning.mev.clone())))?;
    }
    if config.detector_enabled("tx-optimizer") {
        swarm.register(Arc::new(TxOptimizer::new(tuning.mev.clone())))?;
    }
    Ok(swarm)
}

/// Assemble the governance swarm from configuration
pub fn build_governance_swarm(
    config: &GuardianConfig,
    scorer: Arc<dyn Scorer>,
) -> Result<DomainSwarm> {
    let mut swarm = DomainSwarm::new(Domain::Governance, config);
    let tuning = &config.detectors;

    if config.detector_enabled("proposal-analyzer") {
        swarm.register(Arc::new(ProposalAnalyzer::new(
            scorer.clone(),
            tuning.governance.clone(),
        )))?;
    }
    if config.detector_enabled("sentiment-monitor") {
        swarm.register(Arc::new(SentimentMonitor::new(
            scorer,
            tuning.governance.clone(),
        )))?;
    }
    if config.detector_enabled("voting-optimizer") {
        swarm.register(Arc::new(VotingOptimizer::new(tuning.governance.clone())))?;
    }
    Ok(swarm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Specialization;
    use async_trait::async_trait;
    use guardian_chaindata::Network;

    struct FailingDetector;

    #[async_trait]
    impl Detector for FailingDetector {
        fn id(&self) -> &str {
            "portfolio-risk-analyzer"
        }

        fn specialization(&self) -> Specialization {
            Specialization::PortfolioRisk
        }

        async fn evaluate(&self, _bundle: &SnapshotBundle) -> Result<RawFinding> {
            Err(GuardianError::detection("simulated failure"))
        }
    }

    struct SlowDetector;

    #[async_trait]
    impl Detector for SlowDetector {
        fn id(&self) -> &str {
            "volatility-tracker"
        }

        fn specialization(&self) -> Specialization {
            Specialization::VolatilityTracking
        }

        async fn evaluate(&self, _bundle: &SnapshotBundle) -> Result<RawFinding> {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            unreachable!("sleep outlives the detector timeout")
        }
    }

    #[test]
    fn test_wrong_domain_registration_rejected() {
        let config = GuardianConfig::default();
        let mut swarm = DomainSwarm::new(Domain::Mev, &config);

        let result = swarm.register(Arc::new(FailingDetector));
        assert!(result.is_err());
        assert!(swarm.is_empty());
    }

    #[tokio::test]
    async fn test_failing_detector_becomes_failure_finding() {
        let config = GuardianConfig::default();
        let mut swarm = DomainSwarm::new(Domain::Risk, &config);
        swarm.register(Arc::new(FailingDetector)).unwrap();

        let findings = swarm.run(&SnapshotBundle::new(Network::MainnetBeta)).await;
        assert_eq!(findings.len(), 1);
        assert!(findings[0].is_failure());
        assert_eq!(findings[0].confidence, 0.0);
    }

    #[tokio::test]
    async fn test_failed_detector_does_not_block_siblings() {
        let config = GuardianConfig::default();
        let mut swarm = DomainSwarm::new(Domain::Risk, &config);
        swarm.register(Arc::new(FailingDetector)).unwrap();
        swarm
            .register(Arc::new(crate::detectors::VolatilityTracker::new()))
            .unwrap();

        let mut bundle = SnapshotBundle::new(Network::MainnetBeta);
        bundle.portfolio = Some(guardian_chaindata::PortfolioSnapshot {
            wallet: "test-wallet".to_string(),
            network: Network::MainnetBeta,
            positions: vec![guardian_chaindata::TokenPosition {
                mint: "So11111111111111111111111111111111111111112".to_string(),
                symbol: "SOL".to_string(),
                amount: "10.0".to_string(),
                value_usd: 1_500.0,
                allocation: 1.0,
            }],
            total_value_usd: 1_500.0,
            volatility_7d: 0.6,
            age_days: 30,
            taken_at: chrono::Utc::now(),
        });

        let findings = swarm.run(&bundle).await;
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().any(|f| f.is_failure()));
        assert!(findings
            .iter()
            .any(|f| !f.is_failure() && f.detector_id == "volatility-tracker"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_detector_times_out() {
        let config = GuardianConfig::default();
        let mut swarm = DomainSwarm::new(Domain::Risk, &config);
        swarm.register(Arc::new(SlowDetector)).unwrap();

        let findings = swarm.run(&SnapshotBundle::new(Network::MainnetBeta)).await;
        assert_eq!(findings.len(), 1);
        assert!(findings[0].is_failure());
        assert!(findings[0]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("timed out")));
    }

    #[tokio::test]
    async fn test_disabled_detector_left_out_of_assembly() {
        let mut config = GuardianConfig::default();
        config
            .disabled_detectors
            .push("volatility-tracker".to_string());

        let swarm = build_risk_swarm(&config).unwrap();
        assert_eq!(swarm.len(), 2);
    }

    #[tokio::test]
    async fn test_full_assembly_counts() {
        let config = GuardianConfig::default();
        assert_eq!(build_risk_swarm(&config).unwrap().len(), 3);
        assert_eq!(build_mev_swarm(&config).unwrap().len(), 3);
        assert_eq!(
            build_governance_swarm(&config, Arc::new(crate::scorer::StaticScorer::new()))
                .unwrap()
                .len(),
            3
        );
    }
}
