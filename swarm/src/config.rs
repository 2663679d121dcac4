//! Configuration for the Guardian swarm
//!
//! Everything the coordinator's policy reads at runtime lives here and is
//! validated once at startup; configuration is read-only during a cycle and
//! changes take effect only at the next cycle boundary. A policy violation
//! found by `validate()` is the only fatal error path in the crate.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::time::Duration;

use crate::detectors::DETECTOR_IDS;
use crate::error::{GuardianError, Result};
use crate::types::{ActionKind, Domain};

/// Top-level swarm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardianConfig {
    /// Signals below this confidence never reach the coordinator
    pub suppression_threshold: f64,

    /// Minimum aggregate confidence for a HIGH/CRITICAL-led plan to be
    /// confirmed rather than advisory
    pub consensus_threshold: f64,

    /// Priority weight per domain; higher wins ranking ties
    pub domain_weights: HashMap<Domain, u32>,

    /// Conflict precedence: each action supersedes the listed actions
    pub conflict_precedence: HashMap<ActionKind, BTreeSet<ActionKind>>,

    /// Per-detector evaluation timeout in seconds
    pub detector_timeout_secs: u64,

    /// Evaluation cycle settings
    pub cycle: CycleConfig,

    /// Detector tuning thresholds
    pub detectors: DetectorTuning,

    /// Detector ids excluded from swarm assembly
    pub disabled_detectors: Vec<String>,
}

/// Evaluation cycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    /// How often to run an evaluation cycle (seconds)
    pub interval_secs: u64,

    /// Maximum signals the coordinator accepts per cycle
    pub max_signals_per_cycle: usize,
}

/// Threshold tuning for the nine detectors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorTuning {
    pub risk: RiskThresholds,
    pub slippage: SlippageThresholds,
    pub mev: MevTuning,
    pub governance: GovernanceTuning,
}

/// Portfolio concentration thresholds (fraction of total value)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

/// Pool price-impact thresholds for liquidity screening
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlippageThresholds {
    pub warning: f64,
    pub critical: f64,
}

/// MEV screening thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MevTuning {
    /// Minimum price impact before a transaction is worth attacking
    pub min_impact_threshold: f64,

    /// Slippage-tolerance headroom above pool impact that exposes the
    /// caller to sandwiching
    pub sandwich_exposure: f64,

    /// Priority fee above this is treated as contention (lamports)
    pub priority_fee_ceiling_lamports: u64,
}

/// Governance screening thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceTuning {
    /// Treasury commitment fraction above which a proposal always alerts
    pub treasury_alert_pct: f64,

    /// Support-ratio band considered contested
    pub contested_low: f64,
    pub contested_high: f64,

    /// Voting deadlines inside this window are urgent (hours)
    pub urgent_window_hours: i64,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        let mut domain_weights = HashMap::new();
        // Irreversible-loss-first ordering: MEV outranks risk outranks governance
        domain_weights.insert(Domain::Mev, 3);
        domain_weights.insert(Domain::Risk, 2);
        domain_weights.insert(Domain::Governance, 1);

        let mut conflict_precedence = HashMap::new();
        conflict_precedence.insert(
            ActionKind::EmergencyStop,
            BTreeSet::from([ActionKind::RebalancePortfolio, ActionKind::UpdateStrategy]),
        );

        Self {
            suppression_threshold: 0.5,
            consensus_threshold: 0.7,
            domain_weights,
            conflict_precedence,
            detector_timeout_secs: 5,
            cycle: CycleConfig {
                interval_secs: 30,
                max_signals_per_cycle: 64,
            },
            detectors: DetectorTuning {
                risk: RiskThresholds {
                    high: 0.8,
                    medium: 0.5,
                    low: 0.2,
                },
                slippage: SlippageThresholds {
                    warning: 0.01,
                    critical: 0.05,
                },
                mev: MevTuning {
                    min_impact_threshold: 0.01,
                    sandwich_exposure: 0.02,
                    priority_fee_ceiling_lamports: 100_000,
                },
                governance: GovernanceTuning {
                    treasury_alert_pct: 0.1,
                    contested_low: 0.4,
                    contested_high: 0.6,
                    urgent_window_hours: 24,
                },
            },
            disabled_detectors: Vec::new(),
        }
    }
}

impl GuardianConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GuardianError::Config(config::ConfigError::Foreign(Box::new(e))))?;

        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| GuardianError::Config(config::ConfigError::Foreign(Box::new(e))))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from the `GUARDIAN_CONFIG_PATH` env var, falling back to defaults
    pub fn from_env_or_default() -> Result<Self> {
        if let Ok(config_path) = std::env::var("GUARDIAN_CONFIG_PATH") {
            tracing::info!("Loading guardian config from: {}", config_path);
            return Self::from_file(config_path);
        }

        tracing::info!("Using default guardian configuration");
        Ok(Self::default())
    }

    /// Save configuration to a YAML file (for generating examples)
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| GuardianError::internal(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, yaml).map_err(GuardianError::Io)?;

        Ok(())
    }

    /// Validate static policy before any cycle runs
    ///
    /// Runs once at startup; every violation here is fatal, and nothing
    /// validated here is allowed to fail later inside a cycle.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.suppression_threshold) {
            return Err(GuardianError::invalid_config(format!(
                "suppression_threshold must be within [0, 1], got {}",
                self.suppression_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.consensus_threshold) {
            return Err(GuardianError::invalid_config(format!(
                "consensus_threshold must be within [0, 1], got {}",
                self.consensus_threshold
            )));
        }

        for domain in Domain::all() {
            if !self.domain_weights.contains_key(&domain) {
                return Err(GuardianError::invalid_config(format!(
                    "domain_weights missing entry for domain '{}'",
                    domain
                )));
            }
        }

        for (winner, superseded) in &self.conflict_precedence {
            if superseded.contains(winner) {
                return Err(GuardianError::invalid_config(format!(
                    "conflict_precedence: '{}' cannot supersede itself",
                    winner
                )));
            }
            for loser in superseded {
                if self
                    .conflict_precedence
                    .get(loser)
                    .is_some_and(|s| s.contains(winner))
                {
                    return Err(GuardianError::invalid_config(format!(
                        "conflict_precedence: '{}' and '{}' supersede each other",
                        winner, loser
                    )));
                }
            }
        }

        if self.detector_timeout_secs == 0 {
            return Err(GuardianError::invalid_config(
                "detector_timeout_secs must be at least 1",
            ));
        }
        if self.cycle.interval_secs == 0 {
            return Err(GuardianError::invalid_config(
                "cycle.interval_secs must be at least 1",
            ));
        }
        if self.cycle.max_signals_per_cycle == 0 {
            return Err(GuardianError::invalid_config(
                "cycle.max_signals_per_cycle must be at least 1",
            ));
        }

        let risk = &self.detectors.risk;
        if !(risk.low < risk.medium && risk.medium < risk.high) || risk.high > 1.0 || risk.low < 0.0
        {
            return Err(GuardianError::invalid_config(format!(
                "risk thresholds must satisfy 0 <= low < medium < high <= 1, got {}/{}/{}",
                risk.low, risk.medium, risk.high
            )));
        }

        let slippage = &self.detectors.slippage;
        if !(0.0 <= slippage.warning && slippage.warning < slippage.critical && slippage.critical <= 1.0)
        {
            return Err(GuardianError::invalid_config(format!(
                "slippage thresholds must satisfy 0 <= warning < critical <= 1, got {}/{}",
                slippage.warning, slippage.critical
            )));
        }

        let governance = &self.detectors.governance;
        if !(0.0 <= governance.contested_low
            && governance.contested_low < governance.contested_high
            && governance.contested_high <= 1.0)
        {
            return Err(GuardianError::invalid_config(
                "governance contested band must satisfy 0 <= low < high <= 1",
            ));
        }
        if !(0.0..=1.0).contains(&governance.treasury_alert_pct) {
            return Err(GuardianError::invalid_config(
                "governance treasury_alert_pct must be within [0, 1]",
            ));
        }

        for id in &self.disabled_detectors {
            if !DETECTOR_IDS.contains(&id.as_str()) {
                return Err(GuardianError::invalid_config(format!(
                    "disabled_detectors references unknown detector '{}'",
                    id
                )));
            }
        }

        Ok(())
    }

    /// Priority weight for a domain (validated present at startup)
    pub fn domain_weight(&self, domain: Domain) -> u32 {
        self.domain_weights.get(&domain).copied().unwrap_or(0)
    }

    /// Whether `winner` supersedes `loser` under the conflict table
    pub fn supersedes(&self, winner: ActionKind, loser: ActionKind) -> bool {
        self.conflict_precedence
            .get(&winner)
            .is_some_and(|s| s.contains(&loser))
    }

    /// Per-detector evaluation timeout
    pub fn detector_timeout(&self) -> Duration {
        Duration::from_secs(self.detector_timeout_secs)
    }

    /// Whether a detector is enabled for swarm assembly
    pub fn detector_enabled(&self, id: &str) -> bool {
        !self.disabled_detectors.iter().any(|d| d == id)
    }
}
