//! Trust signal acquisition.
//!
//! The engine consumes six trust signals per evaluation: user risk profile,
//! resource sensitivity, location/IP/device trust scores, and business-hours
//! status. All six are fetched concurrently, each bound by an individual
//! timeout. A failed or slow signal is substituted with a neutral default and
//! recorded as degraded; the evaluation only fails outright when every signal
//! is lost.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};
use veridia_core::{DeviceId, ResourceId, SubjectId};

use crate::error::RiskError;
use crate::types::{ResourceSensitivity, RiskEvaluationRequest, UserRiskProfile};

/// Neutral trust score substituted when a trust signal is unavailable.
pub const NEUTRAL_TRUST: f64 = 0.5;

/// Error returned by a signal provider.
#[derive(Debug, Clone, Error)]
#[error("signal provider error: {0}")]
pub struct SignalError(pub String);

impl SignalError {
    /// Creates a provider error from any displayable cause.
    pub fn new(cause: impl std::fmt::Display) -> Self {
        Self(cause.to_string())
    }
}

/// External source of trust signals, implemented by the surrounding platform.
///
/// All methods may be called concurrently; implementations must be cheap to
/// share behind an `Arc`.
#[async_trait]
pub trait TrustSignalProvider: Send + Sync {
    /// Fetch the subject's risk profile.
    async fn get_user_risk_profile(
        &self,
        subject_id: SubjectId,
    ) -> Result<UserRiskProfile, SignalError>;

    /// Fetch the resource's sensitivity metadata.
    async fn get_resource_sensitivity(
        &self,
        resource_id: ResourceId,
    ) -> Result<ResourceSensitivity, SignalError>;

    /// Trust score (0.0-1.0, higher = more trusted) for a location.
    async fn get_location_trust(&self, location: &str) -> Result<f64, SignalError>;

    /// Trust score (0.0-1.0) for an IP address.
    async fn get_ip_trust(&self, ip_address: &str) -> Result<f64, SignalError>;

    /// Trust score (0.0-1.0) for a device.
    async fn get_device_trust(&self, device_id: DeviceId) -> Result<f64, SignalError>;

    /// Whether the given instant falls within business hours at a location.
    async fn is_business_hours(
        &self,
        at: DateTime<Utc>,
        location: &str,
    ) -> Result<bool, SignalError>;
}

/// The joined signal set an evaluation runs on.
///
/// Missing signals are already substituted with neutral defaults; their
/// names are listed in `degraded`.
#[derive(Debug, Clone)]
pub struct SignalSet {
    /// Subject risk profile (neutral when the fetch failed).
    pub profile: UserRiskProfile,
    /// Resource sensitivity (medium/neutral when the fetch failed).
    pub sensitivity: ResourceSensitivity,
    /// Location trust score.
    pub location_trust: f64,
    /// IP trust score.
    pub ip_trust: f64,
    /// Device trust score.
    pub device_trust: f64,
    /// Business-hours status (false when unknown).
    pub business_hours: bool,
    /// Names of the signals that were substituted with defaults.
    pub degraded: Vec<&'static str>,
}

impl SignalSet {
    /// Mean of the three trust scores.
    #[must_use]
    pub fn mean_trust(&self) -> f64 {
        (self.location_trust + self.ip_trust + self.device_trust) / 3.0
    }

    /// True if any signal was substituted with a neutral default.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Outcome of one timed signal fetch.
enum FetchOutcome<T> {
    Ok(T),
    TimedOut,
    Failed(String),
}

/// Runs one provider call under its individual timeout.
async fn fetch<T, F>(future: F, timeout: Duration) -> FetchOutcome<T>
where
    F: Future<Output = Result<T, SignalError>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(Ok(value)) => FetchOutcome::Ok(value),
        Ok(Err(e)) => FetchOutcome::Failed(e.to_string()),
        Err(_) => FetchOutcome::TimedOut,
    }
}

/// Bookkeeping while folding fetch outcomes into a [`SignalSet`].
#[derive(Default)]
struct FoldState {
    degraded: Vec<&'static str>,
    failures: u32,
    timeouts: u32,
}

impl FoldState {
    fn resolve<T>(&mut self, name: &'static str, outcome: FetchOutcome<T>, default: T) -> T {
        match outcome {
            FetchOutcome::Ok(value) => value,
            FetchOutcome::TimedOut => {
                warn!(target: "risk", signal = name, "signal timed out, using neutral default");
                self.degraded.push(name);
                self.failures += 1;
                self.timeouts += 1;
                default
            }
            FetchOutcome::Failed(cause) => {
                warn!(
                    target: "risk",
                    signal = name,
                    error = %cause,
                    "signal fetch failed, using neutral default"
                );
                self.degraded.push(name);
                self.failures += 1;
                default
            }
        }
    }
}

/// Concurrently fetches all six signals for a request.
///
/// Each fetch is bound by `signal_timeout`. Partial failures degrade to
/// neutral defaults. If every fetch fails the call returns
/// [`RiskError::SignalUnavailable`], or [`RiskError::DeadlineExceeded`]
/// when every failure was a timeout; `total_budget` is the evaluation
/// budget reported in that error.
pub async fn acquire_signals(
    provider: &dyn TrustSignalProvider,
    request: &RiskEvaluationRequest,
    signal_timeout: Duration,
    total_budget: Duration,
) -> Result<SignalSet, RiskError> {
    let (profile, sensitivity, location_trust, ip_trust, device_trust, business_hours) = tokio::join!(
        fetch(
            provider.get_user_risk_profile(request.subject_id),
            signal_timeout
        ),
        fetch(
            provider.get_resource_sensitivity(request.resource_id),
            signal_timeout
        ),
        fetch(
            provider.get_location_trust(&request.location),
            signal_timeout
        ),
        fetch(provider.get_ip_trust(&request.ip_address), signal_timeout),
        fetch(
            provider.get_device_trust(request.device_id),
            signal_timeout
        ),
        fetch(
            provider.is_business_hours(request.accessed_at, &request.location),
            signal_timeout
        ),
    );

    let mut state = FoldState::default();
    let set = SignalSet {
        profile: state.resolve("user_risk_profile", profile, UserRiskProfile::neutral()),
        sensitivity: state.resolve(
            "resource_sensitivity",
            sensitivity,
            ResourceSensitivity::neutral(),
        ),
        location_trust: state.resolve("location_trust", location_trust, NEUTRAL_TRUST),
        ip_trust: state.resolve("ip_trust", ip_trust, NEUTRAL_TRUST),
        device_trust: state.resolve("device_trust", device_trust, NEUTRAL_TRUST),
        business_hours: state.resolve("business_hours", business_hours, false),
        degraded: Vec::new(),
    };

    const SIGNAL_COUNT: u32 = 6;
    if state.failures == SIGNAL_COUNT {
        error!(target: "risk", timeouts = state.timeouts, "all signal providers failed");
        if state.timeouts == SIGNAL_COUNT {
            return Err(RiskError::DeadlineExceeded {
                budget_ms: total_budget.as_millis() as u64,
            });
        }
        return Err(RiskError::SignalUnavailable);
    }

    Ok(SignalSet {
        degraded: state.degraded,
        ..set
    })
}
