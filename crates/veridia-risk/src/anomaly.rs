//! Access-pattern anomaly detection.
//!
//! Compares the current (resource type, action) pair against the subject's
//! historical access-pattern frequency buckets and produces an anomaly score.
//!
//! # Algorithm
//!
//! | Case | Score |
//! |------|-------|
//! | Exact (resource type, action) match | bucket familiarity: high 0.1, medium 0.3, low 0.5, very_low 0.8 |
//! | Resource type seen, action novel | most familiar matching bucket + 0.2, capped at 0.8 |
//! | Pair never seen | 0.7 |
//!
//! The pair is flagged as an anomaly when the score exceeds the subject's
//! anomaly threshold. This module is pure and does no I/O.
//!
//! # Example
//!
//! ```rust
//! use veridia_risk::anomaly::{assess, AnomalyAssessment};
//! use veridia_risk::types::{AccessPattern, FrequencyBucket};
//!
//! let history = vec![AccessPattern {
//!     resource_type: "account".to_string(),
//!     action: "read".to_string(),
//!     frequency: FrequencyBucket::High,
//! }];
//!
//! let routine = assess(&history, "account", "read", 0.6);
//! assert_eq!(routine.score, 0.1);
//! assert!(!routine.is_anomaly);
//!
//! let unseen = assess(&history, "payment", "transfer", 0.6);
//! assert_eq!(unseen.score, 0.7);
//! assert!(unseen.is_anomaly);
//! ```

use crate::types::{AccessPattern, FrequencyBucket};

/// Scoring constants for anomaly detection.
pub mod weights {
    /// Familiarity score for a routinely-seen pair.
    pub const FAMILIARITY_HIGH: f64 = 0.1;

    /// Familiarity score for a regularly-seen pair.
    pub const FAMILIARITY_MEDIUM: f64 = 0.3;

    /// Familiarity score for an occasionally-seen pair.
    pub const FAMILIARITY_LOW: f64 = 0.5;

    /// Familiarity score for a pair seen once or twice.
    pub const FAMILIARITY_VERY_LOW: f64 = 0.8;

    /// Penalty added when the resource type is known but the action is new.
    pub const NOVEL_ACTION_PENALTY: f64 = 0.2;

    /// Cap applied after the novel-action penalty.
    pub const FAMILIAR_SCORE_CAP: f64 = 0.8;

    /// Fixed score for a (resource type, action) pair never seen before.
    pub const UNSEEN_PAIR_SCORE: f64 = 0.7;
}

/// Result of anomaly assessment for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyAssessment {
    /// Anomaly score in 0.0-1.0; higher = more unusual for this subject.
    pub score: f64,
    /// True when `score` exceeds the subject's anomaly threshold.
    pub is_anomaly: bool,
}

/// Returns the familiarity score for a frequency bucket.
fn familiarity(frequency: FrequencyBucket) -> f64 {
    match frequency {
        FrequencyBucket::High => weights::FAMILIARITY_HIGH,
        FrequencyBucket::Medium => weights::FAMILIARITY_MEDIUM,
        FrequencyBucket::Low => weights::FAMILIARITY_LOW,
        FrequencyBucket::VeryLow => weights::FAMILIARITY_VERY_LOW,
    }
}

/// Assesses how anomalous the current (resource type, action) pair is for a
/// subject with the given history and anomaly threshold.
#[must_use]
pub fn assess(
    history: &[AccessPattern],
    resource_type: &str,
    action: &str,
    threshold: f64,
) -> AnomalyAssessment {
    let score = anomaly_score(history, resource_type, action);
    AnomalyAssessment {
        score,
        is_anomaly: score > threshold,
    }
}

/// Computes the raw anomaly score without applying the subject threshold.
#[must_use]
pub fn anomaly_score(history: &[AccessPattern], resource_type: &str, action: &str) -> f64 {
    if let Some(exact) = history
        .iter()
        .find(|p| p.resource_type == resource_type && p.action == action)
    {
        return familiarity(exact.frequency);
    }

    // Resource type seen but the action is new: start from the most familiar
    // bucket observed for that resource type.
    let best_for_type = history
        .iter()
        .filter(|p| p.resource_type == resource_type)
        .map(|p| familiarity(p.frequency))
        .fold(None::<f64>, |acc, score| {
            Some(acc.map_or(score, |best| best.min(score)))
        });

    match best_for_type {
        Some(base) => (base + weights::NOVEL_ACTION_PENALTY).min(weights::FAMILIAR_SCORE_CAP),
        None => weights::UNSEEN_PAIR_SCORE,
    }
}
