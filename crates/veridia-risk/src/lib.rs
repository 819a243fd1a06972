//! Veridia Risk Evaluation Library
//!
//! Adaptive risk and trust evaluation for the Veridia IAM platform. Every
//! sensitive access request is scored in real time from identity, device,
//! network, and behavioral signals, then mapped to an enforcement
//! recommendation (`allow`, `monitor`, `challenge`, `deny`).
//!
//! # Modules
//!
//! - [`engine`] - The [`RiskEngine`] evaluation pipeline
//! - [`types`] - Request/result types, risk levels, sensitivity metadata
//! - [`signals`] - Concurrent trust signal acquisition with per-signal timeouts
//! - [`anomaly`] - Pure behavioral anomaly detection over access history
//! - [`registry`] - Hot-swappable market rule and compliance registry
//! - [`scoring`] - Weighted score aggregation and level thresholds
//! - [`decision`] - Recommendation composition and audit metadata
//! - [`config`] - Engine configuration with environment loading
//! - [`error`] - Error taxonomy
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use veridia_risk::{RiskEngine, RuleRegistryHandle};
//! # use veridia_risk::signals::TrustSignalProvider;
//! # fn run(provider: Arc<dyn TrustSignalProvider>) {
//! let registry = RuleRegistryHandle::new();
//! let engine = RiskEngine::new(provider, registry);
//! # let _ = engine;
//! # }
//! ```
//!
//! Evaluations are deterministic: identical requests against identical
//! provider and registry state serialize to identical bytes. Degraded
//! signal acquisition lowers confidence via the `degraded` flag rather
//! than failing the evaluation; only a total signal blackout or deadline
//! overrun is an error, and callers must treat errors as a denial.

pub mod anomaly;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod registry;
pub mod scoring;
pub mod signals;
pub mod types;

// Re-export main types for convenient access
pub use config::{ConfigError, RiskEngineConfig};
pub use engine::RiskEngine;
pub use error::{Result, RiskError};
pub use registry::{RegistrySnapshot, RuleRegistryHandle};
pub use scoring::{RiskThresholds, ScoringWeights};
pub use signals::{SignalError, SignalSet, TrustSignalProvider};
pub use types::{
    AccessPattern, ContextCheck, FrequencyBucket, MitigatingFactor, Recommendation,
    ResourceSensitivity, RiskEvaluationRequest, RiskEvaluationResult, RiskFactor, RiskLevel,
    SensitivityLevel, UserRiskProfile,
};
