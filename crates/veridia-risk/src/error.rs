//! Error types for the risk evaluation engine.

use thiserror::Error;

/// Errors that can occur during risk evaluation.
///
/// Callers must fail closed: an error from the engine is never an "allow".
#[derive(Debug, Error)]
pub enum RiskError {
    /// The request is missing a required field; rejected before any
    /// provider call.
    #[error("Invalid request: field '{field}' {message}")]
    InvalidRequest {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// Every signal provider failed. The caller must treat this as
    /// highest-risk and challenge or deny.
    #[error("All signal providers unavailable")]
    SignalUnavailable,

    /// The evaluation could not complete within its time budget.
    /// Partial results are never returned.
    #[error("Risk evaluation exceeded its {budget_ms}ms budget")]
    DeadlineExceeded {
        /// The budget that was exceeded, in milliseconds.
        budget_ms: u64,
    },

    /// A rule-registry snapshot could not be loaded or parsed.
    ///
    /// Within an evaluation a missing registry degrades the result instead
    /// of failing; this variant is returned to registry owners loading
    /// snapshots.
    #[error("Rule registry unavailable: {0}")]
    RegistryUnavailable(String),
}

/// Convenience Result type for the risk engine.
pub type Result<T> = std::result::Result<T, RiskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_display() {
        let err = RiskError::InvalidRequest {
            field: "action".to_string(),
            message: "must not be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid request: field 'action' must not be empty"
        );
    }

    #[test]
    fn test_deadline_display_includes_budget() {
        let err = RiskError::DeadlineExceeded { budget_ms: 40 };
        assert!(err.to_string().contains("40ms"));
    }

    #[test]
    fn test_is_std_error() {
        let err = RiskError::SignalUnavailable;
        let _: &dyn std::error::Error = &err;
    }
}
