//! Core type definitions for risk evaluation.
//!
//! This module provides the fundamental types used throughout the risk engine:
//!
//! - [`RiskLevel`]: Discrete risk categories derived from the numeric score
//! - [`Recommendation`]: The enforcement recommendation for the caller
//! - [`SensitivityLevel`]: Resource sensitivity classification
//! - [`FrequencyBucket`]: Historical access-pattern frequency
//! - [`RiskEvaluationRequest`] / [`RiskEvaluationResult`]: engine input/output
//!
//! # Serialization
//!
//! All enums implement `Serialize` and `Deserialize` with `snake_case` naming:
//!
//! ```rust
//! use veridia_risk::types::{RiskLevel, Recommendation};
//!
//! let json = serde_json::to_string(&RiskLevel::Critical).unwrap();
//! assert_eq!(json, "\"critical\"");
//!
//! let rec: Recommendation = serde_json::from_str("\"challenge\"").unwrap();
//! assert_eq!(rec, Recommendation::Challenge);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use veridia_core::{DeviceId, ResourceId, SubjectId, TenantAware, TenantId};

use crate::error::RiskError;

/// Discrete risk level derived from a numeric risk score.
///
/// Scores are normalized to the 0.0-1.0 range and then categorized into
/// discrete levels for enforcement and reporting. This enum implements
/// [`Ord`], so risk levels can be compared directly.
///
/// ```rust
/// use veridia_risk::types::RiskLevel;
///
/// assert!(RiskLevel::Low < RiskLevel::Medium);
/// assert!(RiskLevel::High < RiskLevel::Critical);
/// assert!(RiskLevel::High.should_alert());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Low risk: no additional friction required.
    Low,
    /// Medium risk: step-up authentication recommended.
    Medium,
    /// High risk: step-up authentication required, triggers alerts.
    High,
    /// Critical risk: access should be denied.
    Critical,
}

impl RiskLevel {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// Returns true if this risk level should trigger security alerts.
    #[must_use]
    pub fn should_alert(&self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            _ => Err(ParseEnumError {
                kind: "risk level",
                value: s.to_string(),
                expected: "low, medium, high, critical",
            }),
        }
    }
}

/// The enforcement recommendation attached to an evaluation result.
///
/// Advisory for the caller: the caller owns the fail-closed policy and must
/// never interpret an evaluation *error* as `Allow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Grant access without friction.
    Allow,
    /// Grant access but flag the session for security review.
    Monitor,
    /// Require step-up authentication before granting access.
    Challenge,
    /// Refuse access.
    Deny,
}

impl Recommendation {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Allow => "allow",
            Recommendation::Monitor => "monitor",
            Recommendation::Challenge => "challenge",
            Recommendation::Deny => "deny",
        }
    }

    /// Returns true if the caller must not grant access as-is.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        matches!(self, Recommendation::Challenge | Recommendation::Deny)
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Recommendation {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow" => Ok(Recommendation::Allow),
            "monitor" => Ok(Recommendation::Monitor),
            "challenge" => Ok(Recommendation::Challenge),
            "deny" => Ok(Recommendation::Deny),
            _ => Err(ParseEnumError {
                kind: "recommendation",
                value: s.to_string(),
                expected: "allow, monitor, challenge, deny",
            }),
        }
    }
}

/// Sensitivity classification of a protected resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityLevel {
    /// Low sensitivity (e.g. public or internal reference data).
    Low,
    /// Medium sensitivity (default for unclassified resources).
    Medium,
    /// High sensitivity (restricted data, privileged operations).
    High,
}

impl SensitivityLevel {
    /// Returns the base risk contribution for this sensitivity level.
    #[must_use]
    pub fn base_score(&self) -> f64 {
        match self {
            SensitivityLevel::Low => 0.1,
            SensitivityLevel::Medium => 0.4,
            SensitivityLevel::High => 0.8,
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityLevel::Low => "low",
            SensitivityLevel::Medium => "medium",
            SensitivityLevel::High => "high",
        }
    }
}

impl fmt::Display for SensitivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SensitivityLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(SensitivityLevel::Low),
            "medium" => Ok(SensitivityLevel::Medium),
            "high" => Ok(SensitivityLevel::High),
            _ => Err(ParseEnumError {
                kind: "sensitivity level",
                value: s.to_string(),
                expected: "low, medium, high",
            }),
        }
    }
}

/// How often a subject has historically performed a given
/// (resource type, action) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyBucket {
    /// Seen once or twice, ever.
    VeryLow,
    /// Occasional access.
    Low,
    /// Regular access.
    Medium,
    /// Part of the subject's routine.
    High,
}

impl FrequencyBucket {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FrequencyBucket::VeryLow => "very_low",
            FrequencyBucket::Low => "low",
            FrequencyBucket::Medium => "medium",
            FrequencyBucket::High => "high",
        }
    }
}

impl fmt::Display for FrequencyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FrequencyBucket {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "very_low" | "verylow" => Ok(FrequencyBucket::VeryLow),
            "low" => Ok(FrequencyBucket::Low),
            "medium" => Ok(FrequencyBucket::Medium),
            "high" => Ok(FrequencyBucket::High),
            _ => Err(ParseEnumError {
                kind: "frequency bucket",
                value: s.to_string(),
                expected: "very_low, low, medium, high",
            }),
        }
    }
}

/// Error returned when parsing an invalid enum string.
#[derive(Debug, Clone)]
pub struct ParseEnumError {
    /// Human-readable name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// The accepted values.
    pub expected: &'static str,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} '{}': expected one of: {}",
            self.kind, self.value, self.expected
        )
    }
}

impl std::error::Error for ParseEnumError {}

/// A contextual check the resource owner requires before access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextCheck {
    /// Access should normally happen during business hours.
    BusinessHours,
    /// Originating location must be verified.
    LocationCheck,
    /// Originating device must be verified.
    DeviceCheck,
}

/// One entry in a subject's historical access pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPattern {
    /// Resource type accessed (e.g. "account", "customer_record").
    pub resource_type: String,
    /// Action performed (e.g. "read", "transfer").
    pub action: String,
    /// How often this pair appears in the subject's history.
    pub frequency: FrequencyBucket,
}

/// Per-subject risk state fetched from the profile provider.
///
/// Read-only to the engine; mutated only by the authentication subsystem
/// that observes login outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRiskProfile {
    /// Base risk score in 0.0-1.0, lower = more trusted.
    pub base_risk_score: f64,
    /// Anomaly score above which a pattern is flagged for this subject.
    pub anomaly_threshold: f64,
    /// Authentication failures observed in the recent window.
    pub recent_auth_failures: u32,
    /// Timestamp of the last successful authentication, if any.
    pub last_successful_auth: Option<DateTime<Utc>>,
    /// Historical access patterns, ordered by the provider.
    pub access_patterns: Vec<AccessPattern>,
}

impl UserRiskProfile {
    /// Neutral profile substituted when the provider is unavailable.
    ///
    /// Base risk sits at the midpoint and the threshold is low enough that
    /// an unseen access pattern still registers as anomalous.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            base_risk_score: 0.5,
            anomaly_threshold: 0.6,
            recent_auth_failures: 0,
            last_successful_auth: None,
            access_patterns: Vec::new(),
        }
    }
}

/// Per-resource sensitivity metadata fetched from the resource provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSensitivity {
    /// Sensitivity level driving the base resource contribution.
    pub level: SensitivityLevel,
    /// Classification label (e.g. "public", "internal", "restricted").
    pub classification: String,
    /// Whether multi-factor authentication is mandatory for this resource.
    pub mfa_required: bool,
    /// Contextual checks the resource owner requires.
    pub context_checks: Vec<ContextCheck>,
    /// Compliance-requirement tags (e.g. "pci", "personal_data").
    pub compliance_tags: Vec<String>,
}

impl ResourceSensitivity {
    /// Neutral sensitivity substituted when the provider is unavailable.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            level: SensitivityLevel::Medium,
            classification: "internal".to_string(),
            mfa_required: false,
            context_checks: Vec::new(),
            compliance_tags: Vec::new(),
        }
    }

    /// Returns true if the given context check is required.
    #[must_use]
    pub fn requires_check(&self, check: ContextCheck) -> bool {
        self.context_checks.contains(&check)
    }
}

/// Input to a single risk evaluation. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskEvaluationRequest {
    /// Tenant the request is scoped to.
    pub tenant_id: TenantId,
    /// Subject whose access is being evaluated.
    pub subject_id: SubjectId,
    /// Resource being accessed.
    pub resource_id: ResourceId,
    /// Resource type, matched against the subject's access history.
    pub resource_type: String,
    /// Action being attempted.
    pub action: String,
    /// Market/region code driving rule selection (e.g. "AO", "PT", "EU").
    pub market: String,
    /// Originating location (city or region label from geo resolution).
    pub location: String,
    /// Originating IP address.
    pub ip_address: String,
    /// Originating device.
    pub device_id: DeviceId,
    /// Wall-clock time of the access attempt.
    pub accessed_at: DateTime<Utc>,
    /// Whether the device was previously recognized for this subject.
    pub device_recognized: bool,
    /// Free-form contextual attributes (amount, data classification, purpose).
    /// BTreeMap keeps serialization order stable across evaluations.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl RiskEvaluationRequest {
    /// Validates the request before any provider call.
    ///
    /// Subject, resource, and device identifiers are typed and therefore
    /// always present; the string fields that drive scoring and rule
    /// selection must be non-empty.
    pub fn validate(&self) -> Result<(), RiskError> {
        for (field, value) in [
            ("resource_type", &self.resource_type),
            ("action", &self.action),
            ("market", &self.market),
        ] {
            if value.trim().is_empty() {
                return Err(RiskError::InvalidRequest {
                    field: field.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the "amount" attribute as a float, if present.
    #[must_use]
    pub fn amount(&self) -> Option<f64> {
        self.attributes.get("amount").and_then(serde_json::Value::as_f64)
    }
}

impl TenantAware for RiskEvaluationRequest {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// A named contributor to the final risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    /// Stable factor name (e.g. "resource_sensitivity").
    pub name: String,
    /// Configured weight of this factor.
    pub weight: f64,
    /// Weighted contribution actually added to the score.
    pub contribution: f64,
}

/// A named contributor that reduced the risk score or confirmed trust.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigatingFactor {
    /// Stable factor name (e.g. "recognized_device").
    pub name: String,
    /// Human-readable detail for audit display.
    pub detail: String,
}

/// Output of a single risk evaluation.
///
/// This is a value object: produced fresh per call, never mutated after
/// construction, and free of per-call randomness or timing so identical
/// inputs serialize to identical bytes. An auditor can reconstruct the
/// score from `risk_factors` and `mitigating_factors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskEvaluationResult {
    /// Final risk score, clamped to 0.0-1.0.
    pub risk_score: f64,
    /// Discrete level derived from the score.
    pub risk_level: RiskLevel,
    /// Ordered list of factors that drove the score.
    pub risk_factors: Vec<RiskFactor>,
    /// Ordered list of factors that reduced risk.
    pub mitigating_factors: Vec<MitigatingFactor>,
    /// Enforcement recommendation for the caller.
    pub recommendation: Recommendation,
    /// True when the caller must obtain additional authentication.
    pub require_additional_auth: bool,
    /// Market/regulatory rule identifiers that applied.
    pub applied_rules: Vec<String>,
    /// Compliance-check identifiers that applied.
    pub compliance_checks: Vec<String>,
    /// Advisory, human-readable security recommendations.
    pub security_recommendations: Vec<String>,
    /// Audit metadata. Contains `compliance_framework` whenever
    /// `compliance_checks` is non-empty.
    pub audit_metadata: BTreeMap<String, String>,
    /// True when one or more signals were substituted with neutral
    /// defaults or the rule registry was unavailable.
    pub degraded: bool,
}
