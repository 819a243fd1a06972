//! Weighted risk score aggregation.
//!
//! Combines base user risk, resource sensitivity, inverted trust signals,
//! the anomaly score, and temporal/behavioral penalties into a single
//! 0.0-1.0 score, then maps it to a discrete [`RiskLevel`].
//!
//! Every non-zero contributor is recorded as a named [`RiskFactor`] with its
//! weighted contribution, and every trust-confirming observation as a
//! [`MitigatingFactor`], so an auditor can reconstruct the score from the
//! result alone.
//!
//! Weights and thresholds are configuration, not business logic: the
//! defaults below are a tuned starting point, overridable per deployment.

use chrono::Duration as ChronoDuration;
use serde::{Deserialize, Serialize};

use crate::anomaly::AnomalyAssessment;
use crate::signals::SignalSet;
use crate::types::{
    ContextCheck, MitigatingFactor, RiskEvaluationRequest, RiskFactor, RiskLevel,
};

/// Mean trust at or above which the trust signals count as mitigating.
const TRUSTED_SIGNAL_FLOOR: f64 = 0.7;

/// Weights of the score formula. All contributions are summed and the
/// result clamped to 0.0-1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Weight of the subject's base risk score.
    pub user_risk: f64,
    /// Weight of the resource sensitivity contribution.
    pub sensitivity: f64,
    /// Weight of the inverted mean trust signal.
    pub trust: f64,
    /// Weight of the anomaly score.
    pub anomaly: f64,
    /// Flat penalty when access happens outside business hours and the
    /// resource requires the business-hours check.
    pub off_hours_penalty: f64,
    /// Penalty per recent authentication failure.
    pub failure_penalty: f64,
    /// Cap on the total authentication-failure penalty.
    pub failure_penalty_cap: f64,
    /// Bonus subtracted when the subject authenticated successfully within
    /// the last hour.
    pub recency_bonus: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            user_risk: 0.25,
            sensitivity: 0.25,
            trust: 0.20,
            anomaly: 0.20,
            off_hours_penalty: 0.10,
            failure_penalty: 0.05,
            failure_penalty_cap: 0.15,
            recency_bonus: 0.05,
        }
    }
}

/// Score boundaries between discrete risk levels.
///
/// The mapping is monotonic by construction: a higher score can never map
/// to a lower level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Scores below this are low risk.
    pub medium: f64,
    /// Scores below this (and at or above `medium`) are medium risk.
    pub high: f64,
    /// Scores below this (and at or above `high`) are high risk;
    /// at or above, critical.
    pub critical: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: 0.35,
            high: 0.65,
            critical: 0.85,
        }
    }
}

impl RiskThresholds {
    /// Maps a clamped score to its discrete level.
    #[must_use]
    pub fn level_for(&self, score: f64) -> RiskLevel {
        if score < self.medium {
            RiskLevel::Low
        } else if score < self.high {
            RiskLevel::Medium
        } else if score < self.critical {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    /// Checks the boundaries are strictly increasing within 0.0-1.0.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0 < self.medium && self.medium < self.high && self.high < self.critical
            && self.critical <= 1.0)
        {
            return Err(format!(
                "thresholds must satisfy 0 < medium < high < critical <= 1, got {}/{}/{}",
                self.medium, self.high, self.critical
            ));
        }
        Ok(())
    }
}

/// Aggregated score with full factor traceability.
#[derive(Debug, Clone)]
pub struct ScoreBreakdown {
    /// Final score, clamped to 0.0-1.0.
    pub score: f64,
    /// Discrete level for the score.
    pub level: RiskLevel,
    /// Non-zero contributors, in formula order.
    pub risk_factors: Vec<RiskFactor>,
    /// Trust-confirming observations.
    pub mitigating_factors: Vec<MitigatingFactor>,
}

/// Aggregates the signal set and anomaly assessment into a scored breakdown.
#[must_use]
pub fn aggregate(
    request: &RiskEvaluationRequest,
    signals: &SignalSet,
    anomaly: AnomalyAssessment,
    weights: &ScoringWeights,
    thresholds: &RiskThresholds,
) -> ScoreBreakdown {
    let mut factors = Vec::new();
    let mut mitigating = Vec::new();
    let mut score = 0.0;

    let mut contribute = |factors: &mut Vec<RiskFactor>, name: &str, weight: f64, value: f64| {
        let contribution = weight * value;
        if contribution > 0.0 {
            factors.push(RiskFactor {
                name: name.to_string(),
                weight,
                contribution,
            });
        }
        contribution
    };

    score += contribute(
        &mut factors,
        "base_user_risk",
        weights.user_risk,
        signals.profile.base_risk_score,
    );
    score += contribute(
        &mut factors,
        "resource_sensitivity",
        weights.sensitivity,
        signals.sensitivity.level.base_score(),
    );

    let mean_trust = signals.mean_trust();
    score += contribute(
        &mut factors,
        "untrusted_signals",
        weights.trust,
        1.0 - mean_trust,
    );
    score += contribute(
        &mut factors,
        "anomalous_access",
        weights.anomaly,
        anomaly.score,
    );

    let off_hours = signals.sensitivity.requires_check(ContextCheck::BusinessHours)
        && !signals.business_hours;
    if off_hours {
        score += contribute(
            &mut factors,
            "off_hours_access",
            weights.off_hours_penalty,
            1.0,
        );
    }

    let failures = signals.profile.recent_auth_failures;
    if failures > 0 {
        let penalty =
            (f64::from(failures) * weights.failure_penalty).min(weights.failure_penalty_cap);
        factors.push(RiskFactor {
            name: "recent_auth_failures".to_string(),
            weight: weights.failure_penalty,
            contribution: penalty,
        });
        score += penalty;
    }

    if mean_trust >= TRUSTED_SIGNAL_FLOOR {
        mitigating.push(MitigatingFactor {
            name: "trusted_signals".to_string(),
            detail: format!(
                "mean trust {mean_trust:.2} across location, IP, and device"
            ),
        });
    }

    if request.device_recognized {
        mitigating.push(MitigatingFactor {
            name: "recognized_device".to_string(),
            detail: "device previously recognized for this subject".to_string(),
        });
    }

    let recently_authenticated = signals
        .profile
        .last_successful_auth
        .is_some_and(|at| request.accessed_at - at <= ChronoDuration::hours(1) && at <= request.accessed_at);
    if recently_authenticated {
        score -= weights.recency_bonus;
        mitigating.push(MitigatingFactor {
            name: "recent_successful_auth".to_string(),
            detail: "successful authentication within the last hour".to_string(),
        });
    }

    let score = score.clamp(0.0, 1.0);
    ScoreBreakdown {
        score,
        level: thresholds.level_for(score),
        risk_factors: factors,
        mitigating_factors: mitigating,
    }
}
