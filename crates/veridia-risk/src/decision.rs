//! Decision and recommendation composition.
//!
//! Turns a scored breakdown plus the applied rule/compliance sets into the
//! final [`RiskEvaluationResult`]. The mapping is state-free:
//!
//! 1. `deny` — level critical, or recent auth failures above the hard limit
//! 2. `challenge` — level medium/high, or the resource mandates MFA
//! 3. `monitor` — anomaly flagged at low level (allow but log for review)
//! 4. `allow` — everything else
//!
//! Security recommendations are generated from the factor list and are
//! advisory only; they never change the decision path.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::anomaly::AnomalyAssessment;
use crate::registry::ComplianceMatch;
use crate::scoring::ScoreBreakdown;
use crate::signals::SignalSet;
use crate::types::{
    Recommendation, RiskEvaluationRequest, RiskEvaluationResult, RiskLevel,
};

/// Inputs gathered during evaluation, handed to the composer.
pub struct DecisionContext<'a> {
    /// The original request.
    pub request: &'a RiskEvaluationRequest,
    /// The (possibly degraded) signal set the score was computed from.
    pub signals: &'a SignalSet,
    /// Anomaly assessment for the request.
    pub anomaly: AnomalyAssessment,
    /// Scored breakdown from the aggregator.
    pub breakdown: ScoreBreakdown,
    /// Market/regulatory rule identifiers that applied.
    pub applied_rules: Vec<String>,
    /// Compliance checks that applied.
    pub compliance: Vec<ComplianceMatch>,
    /// True when the rule registry had no loaded snapshot.
    pub registry_degraded: bool,
    /// Failures at or above which the recommendation is always `deny`.
    pub auth_failure_limit: u32,
}

/// Composes the final evaluation result.
#[must_use]
pub fn compose(ctx: DecisionContext<'_>) -> RiskEvaluationResult {
    let level = ctx.breakdown.level;
    let mfa_required = ctx.signals.sensitivity.mfa_required;
    let over_failure_limit =
        ctx.signals.profile.recent_auth_failures > ctx.auth_failure_limit;

    let recommendation = if level == RiskLevel::Critical || over_failure_limit {
        Recommendation::Deny
    } else if level >= RiskLevel::Medium || mfa_required {
        Recommendation::Challenge
    } else if ctx.anomaly.is_anomaly {
        Recommendation::Monitor
    } else {
        Recommendation::Allow
    };

    let require_additional_auth =
        level >= RiskLevel::Medium || mfa_required || ctx.anomaly.is_anomaly;

    let security_recommendations = security_recommendations(&ctx);
    let audit_metadata = audit_metadata(&ctx, recommendation);

    let compliance_checks: Vec<String> =
        ctx.compliance.iter().map(|c| c.id.clone()).collect();

    RiskEvaluationResult {
        risk_score: ctx.breakdown.score,
        risk_level: level,
        risk_factors: ctx.breakdown.risk_factors,
        mitigating_factors: ctx.breakdown.mitigating_factors,
        recommendation,
        require_additional_auth,
        applied_rules: ctx.applied_rules,
        compliance_checks,
        security_recommendations,
        audit_metadata,
        degraded: ctx.signals.is_degraded() || ctx.registry_degraded,
    }
}

/// Advisory free-text guidance derived from the factor list.
fn security_recommendations(ctx: &DecisionContext<'_>) -> Vec<String> {
    let mut out = Vec::new();
    let has_factor =
        |name: &str| ctx.breakdown.risk_factors.iter().any(|f| f.name == name);

    if !ctx.request.device_recognized && ctx.signals.mean_trust() < 0.5 {
        out.push(
            "unrecognized device from untrusted network; recommend device re-enrollment"
                .to_string(),
        );
    } else if !ctx.request.device_recognized {
        out.push("unrecognized device; recommend device verification".to_string());
    }

    if ctx.anomaly.is_anomaly {
        out.push(
            "access pattern unusual for this subject; review recent account activity"
                .to_string(),
        );
    }

    if has_factor("off_hours_access") {
        out.push("access outside business hours; verify user intent".to_string());
    }

    if has_factor("recent_auth_failures") {
        out.push(
            "recent authentication failures on this account; consider credential reset"
                .to_string(),
        );
    }

    out
}

/// Audit metadata for the result. Ordered map so serialization is stable.
fn audit_metadata(
    ctx: &DecisionContext<'_>,
    recommendation: Recommendation,
) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    metadata.insert("tenant_id".to_string(), ctx.request.tenant_id.to_string());
    metadata.insert("market".to_string(), ctx.request.market.clone());
    metadata.insert(
        "recommendation".to_string(),
        recommendation.as_str().to_string(),
    );
    metadata.insert(
        "risk_level".to_string(),
        ctx.breakdown.level.as_str().to_string(),
    );

    if !ctx.compliance.is_empty() {
        let frameworks: BTreeSet<&str> =
            ctx.compliance.iter().map(|c| c.framework.as_str()).collect();
        metadata.insert(
            "compliance_framework".to_string(),
            frameworks.into_iter().collect::<Vec<_>>().join(","),
        );
    }

    if ctx.signals.is_degraded() {
        metadata.insert(
            "degraded_signals".to_string(),
            ctx.signals.degraded.join(","),
        );
    }

    if ctx.registry_degraded {
        metadata.insert("registry_degraded".to_string(), "true".to_string());
    }

    metadata
}
