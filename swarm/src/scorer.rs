//! Scorer boundary
//!
//! The seam where natural-language judgement enters the system. A `Scorer`
//! takes a task description and a structured payload and returns an
//! assessment whose `severity_label` may be anything, including free text:
//! the normalizer's default-degrade rule copes with unmapped labels, so a
//! scorer can never crash a cycle. Ranking decisions never come from here;
//! the scorer is strictly a detector-level input.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Structured-or-free-text assessment returned by a scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Severity in the scorer's own vocabulary; not guaranteed canonical
    pub severity_label: String,

    /// Scorer confidence, 0.0 to 1.0
    pub confidence: f64,

    /// Free-text summary of the judgement
    pub summary: String,
}

/// Black-box assessment boundary (LLM in production, rules here)
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Assess a task over a structured payload
    async fn assess(&self, task: &str, payload: &Value) -> Result<Assessment>;
}

/// Deterministic rule-based scorer
///
/// Stands in for the LLM so every evaluation cycle is reproducible. Speaks
/// the governance vocabulary (routine/contested/urgent/critical) for tasks
/// it recognizes and plain prose for ones it does not, which exercises the
/// normalizer's degrade path exactly like a chatty model would.
pub struct StaticScorer;

impl StaticScorer {
    /// Create a new static scorer
    pub fn new() -> Self {
        Self
    }

    fn field(payload: &Value, key: &str) -> f64 {
        payload.get(key).and_then(Value::as_f64).unwrap_or(0.0)
    }
}

impl Default for StaticScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scorer for StaticScorer {
    async fn assess(&self, task: &str, payload: &Value) -> Result<Assessment> {
        if task.contains("proposal") {
            let treasury_pct = Self::field(payload, "treasury_pct");
            let support_ratio = Self::field(payload, "support_ratio");

            let (severity_label, confidence, summary) = if treasury_pct >= 0.25 {
                (
                    "critical",
                    0.85,
                    format!(
                        "proposal commits {:.1}% of treasury in a single motion",
                        treasury_pct * 100.0
                    ),
                )
            } else if treasury_pct >= 0.1 {
                (
                    "urgent",
                    0.8,
                    format!("treasury commitment {:.1}% warrants review", treasury_pct * 100.0),
                )
            } else if (0.4..=0.6).contains(&support_ratio) {
                (
                    "contested",
                    0.7,
                    format!("vote is split at {:.1}% support", support_ratio * 100.0),
                )
            } else {
                (
                    "routine",
                    0.62,
                    format!(
                        "modest treasury impact with {:.1}% support",
                        support_ratio * 100.0
                    ),
                )
            };

            return Ok(Assessment {
                severity_label: severity_label.to_string(),
                confidence,
                summary,
            });
        }

        if task.contains("sentiment") {
            let support_ratio = Self::field(payload, "support_ratio");
            let (severity_label, confidence, summary) = if (0.4..=0.6).contains(&support_ratio) {
                (
                    "contested",
                    0.66,
                    "community is split on this motion".to_string(),
                )
            } else if support_ratio < 0.35 {
                (
                    "urgent",
                    0.72,
                    "community sentiment is strongly negative".to_string(),
                )
            } else {
                (
                    "routine",
                    0.58,
                    "sentiment is aligned with the proposal".to_string(),
                )
            };

            return Ok(Assessment {
                severity_label: severity_label.to_string(),
                confidence,
                summary,
            });
        }

        // Unrecognized task: answer in prose, the way a model off-script
        // would. The normalizer degrades this to Medium with a penalty.
        Ok(Assessment {
            severity_label: "needs manual review".to_string(),
            confidence: 0.45,
            summary: format!("no scoring rule for task '{}'", task),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_routine_proposal() {
        let scorer = StaticScorer::new();
        let assessment = scorer
            .assess(
                "evaluate_dao_proposal",
                &json!({ "treasury_pct": 0.033, "support_ratio": 0.65 }),
            )
            .await
            .unwrap();
        assert_eq!(assessment.severity_label, "routine");
        assert!(assessment.confidence >= 0.5);
    }

    #[tokio::test]
    async fn test_large_treasury_commitment_is_urgent() {
        let scorer = StaticScorer::new();
        let assessment = scorer
            .assess(
                "evaluate_dao_proposal",
                &json!({ "treasury_pct": 0.15, "support_ratio": 0.7 }),
            )
            .await
            .unwrap();
        assert_eq!(assessment.severity_label, "urgent");
    }

    #[tokio::test]
    async fn test_contested_sentiment() {
        let scorer = StaticScorer::new();
        let assessment = scorer
            .assess("community_sentiment", &json!({ "support_ratio": 0.52 }))
            .await
            .unwrap();
        assert_eq!(assessment.severity_label, "contested");
    }

    #[tokio::test]
    async fn test_unknown_task_returns_free_text() {
        let scorer = StaticScorer::new();
        let assessment = scorer.assess("read_tea_leaves", &json!({})).await.unwrap();
        assert_eq!(assessment.severity_label, "needs manual review");
        assert!(assessment.confidence < 0.5);
    }
}
