//! Normalizer - raw findings in, canonical signals out
//!
//! The only place detector vocabularies are interpreted. Each domain has a
//! fixed label table; anything outside it degrades to MEDIUM with a
//! confidence penalty rather than being dropped or guessed at. Suppression
//! happens here too, so the coordinator only ever sees signals worth
//! ranking.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::GuardianConfig;
use crate::types::{Domain, RawFinding, Severity, Signal};

/// Confidence penalty applied when a label misses the domain table
const DEGRADE_PENALTY: f64 = 0.1;

/// Maps detector vocabularies onto the canonical severity scale
pub struct Normalizer {
    suppression_threshold: f64,
}

impl Normalizer {
    /// Create a normalizer with the configured suppression threshold
    pub fn new(config: &GuardianConfig) -> Self {
        Self {
            suppression_threshold: config.suppression_threshold,
        }
    }

    /// Look up a severity label in the domain's vocabulary table
    fn map_label(domain: Domain, label: &str) -> Option<Severity> {
        let label = label.trim().to_ascii_lowercase();
        match domain {
            Domain::Risk => match label.as_str() {
                "low" => Some(Severity::Low),
                "medium" => Some(Severity::Medium),
                "high" => Some(Severity::High),
                "critical" => Some(Severity::Critical),
                _ => None,
            },
            Domain::Mev => match label.as_str() {
                "safe" => Some(Severity::Low),
                "caution" => Some(Severity::Medium),
                // Two provider levels collapse onto canonical HIGH
                "elevated" | "high" => Some(Severity::High),
                "critical" => Some(Severity::Critical),
                _ => None,
            },
            Domain::Governance => match label.as_str() {
                "routine" => Some(Severity::Low),
                "contested" => Some(Severity::Medium),
                "urgent" => Some(Severity::High),
                "critical" => Some(Severity::Critical),
                _ => None,
            },
        }
    }

    /// Normalize one finding into a signal, or suppress it
    ///
    /// Returns `None` for findings below the suppression threshold,
    /// including every failure finding (their confidence is 0.0).
    pub fn normalize(&self, finding: &RawFinding, snapshot_id: Uuid) -> Option<Signal> {
        let (severity, confidence) = match Self::map_label(finding.domain, &finding.severity_label)
        {
            Some(severity) => (severity, finding.confidence),
            None => {
                warn!(
                    detector = %finding.detector_id,
                    domain = %finding.domain,
                    label = %finding.severity_label,
                    "Unmapped severity label, degrading to MEDIUM"
                );
                (
                    Severity::Medium,
                    (finding.confidence - DEGRADE_PENALTY).max(0.0),
                )
            }
        };

        if confidence < self.suppression_threshold {
            debug!(
                detector = %finding.detector_id,
                confidence,
                threshold = self.suppression_threshold,
                "Signal suppressed below confidence threshold"
            );
            return None;
        }

        Some(Signal {
            id: Signal::derive_id(&finding.detector_id, snapshot_id),
            domain: finding.domain,
            specialization: finding.specialization,
            severity,
            confidence,
            proposed_actions: finding.proposed_actions.clone(),
            rationale: finding.rationale.clone(),
            detected_at: finding.detected_at,
        })
    }

    /// Normalize a batch of findings, dropping suppressed ones
    pub fn normalize_all(&self, findings: &[RawFinding], snapshot_id: Uuid) -> Vec<Signal> {
        findings
            .iter()
            .filter_map(|finding| self.normalize(finding, snapshot_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionKind, Specialization};
    use chrono::Utc;

    fn finding(domain: Domain, label: &str, confidence: f64) -> RawFinding {
        let specialization = match domain {
            Domain::Risk => Specialization::PortfolioRisk,
            Domain::Mev => Specialization::MempoolThreatDetection,
            Domain::Governance => Specialization::ProposalEvaluation,
        };
        RawFinding {
            detector_id: "test-detector".to_string(),
            domain,
            specialization,
            severity_label: label.to_string(),
            confidence,
            rationale: "test".to_string(),
            proposed_actions: vec![ActionKind::AlertUser],
            error: None,
            detected_at: Utc::now(),
        }
    }

    fn normalizer() -> Normalizer {
        Normalizer::new(&GuardianConfig::default())
    }

    #[test]
    fn test_domain_vocabularies_map() {
        let n = normalizer();
        let id = Uuid::new_v4();

        let risk = n.normalize(&finding(Domain::Risk, "high", 0.9), id).unwrap();
        assert_eq!(risk.severity, Severity::High);

        let mev = n.normalize(&finding(Domain::Mev, "safe", 0.9), id).unwrap();
        assert_eq!(mev.severity, Severity::Low);

        let gov = n
            .normalize(&finding(Domain::Governance, "urgent", 0.9), id)
            .unwrap();
        assert_eq!(gov.severity, Severity::High);
    }

    #[test]
    fn test_mev_elevated_and_high_collapse() {
        let n = normalizer();
        let id = Uuid::new_v4();

        let elevated = n.normalize(&finding(Domain::Mev, "elevated", 0.9), id).unwrap();
        let high = n.normalize(&finding(Domain::Mev, "high", 0.9), id).unwrap();
        assert_eq!(elevated.severity, high.severity);
    }

    #[test]
    fn test_unknown_label_degrades_with_penalty() {
        let n = normalizer();
        let signal = n
            .normalize(&finding(Domain::Risk, "VERY BAD INDEED", 0.9), Uuid::new_v4())
            .unwrap();

        assert_eq!(signal.severity, Severity::Medium);
        assert!((signal.confidence - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_degrade_penalty_can_push_below_suppression() {
        let n = normalizer();
        // 0.55 mapped would pass; 0.55 - 0.1 = 0.45 must not
        let result = n.normalize(&finding(Domain::Risk, "novel label", 0.55), Uuid::new_v4());
        assert!(result.is_none());
    }

    #[test]
    fn test_low_confidence_suppressed() {
        let n = normalizer();
        let result = n.normalize(&finding(Domain::Risk, "high", 0.49), Uuid::new_v4());
        assert!(result.is_none());
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let n = normalizer();
        let result = n.normalize(&finding(Domain::Risk, "high", 0.5), Uuid::new_v4());
        assert!(result.is_some());
    }

    #[test]
    fn test_failure_findings_are_suppressed() {
        let n = normalizer();
        let failure = RawFinding::failure(
            "test-detector",
            Domain::Risk,
            Specialization::PortfolioRisk,
            "boom",
        );
        assert!(n.normalize(&failure, Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_signal_id_is_deterministic() {
        let n = normalizer();
        let snapshot_id = Uuid::new_v4();

        let a = n.normalize(&finding(Domain::Risk, "high", 0.9), snapshot_id).unwrap();
        let b = n.normalize(&finding(Domain::Risk, "high", 0.9), snapshot_id).unwrap();
        assert_eq!(a.id, b.id);

        let other = n
            .normalize(&finding(Domain::Risk, "high", 0.9), Uuid::new_v4())
            .unwrap();
        assert_ne!(a.id, other.id);
    }
}
