//! Guardian Swarm Layer
//!
//! The brain of the DeFi guardian - converts chaindata snapshots into a
//! ranked, deduplicated action plan through three protection domains.
//!
//! ## Pipeline:
//! 1. **Swarms**: risk, MEV and governance detectors fan out per cycle
//! 2. **Normalizer**: detector vocabularies map onto canonical severity,
//!    weak signals are suppressed
//! 3. **Coordinator**: deterministic merge, rank, conflict resolution and
//!    consensus gating
//!
//! ## Output:
//! - **ActionPlan**: ranked unique actions with justification trails

pub mod config;
pub mod coordinator;
pub mod detectors;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod scorer;
pub mod swarm;
pub mod types;

pub use config::{CycleConfig, DetectorTuning, GuardianConfig};
pub use coordinator::{Coordinator, CyclePhase};
pub use detectors::{Detector, DETECTOR_IDS};
pub use engine::GuardianEngine;
pub use error::{GuardianError, Result};
pub use normalize::Normalizer;
pub use scorer::{Assessment, Scorer, StaticScorer};
pub use swarm::{build_governance_swarm, build_mev_swarm, build_risk_swarm, DomainSwarm};
pub use types::*;

/// Version of the swarm layer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
