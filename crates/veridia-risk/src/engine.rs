//! Risk evaluation engine.
//!
//! [`RiskEngine::evaluate`] is the single entry point: it validates the
//! request, gathers trust signals concurrently, runs behavioral anomaly
//! detection, resolves market rules from the current registry snapshot,
//! aggregates the weighted score, and composes the final recommendation.
//!
//! The whole evaluation runs under the configured total budget. On overrun
//! the caller gets [`RiskError::DeadlineExceeded`] and must fail closed;
//! the engine never fabricates a partial result after the deadline.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::anomaly;
use crate::config::RiskEngineConfig;
use crate::decision::{self, DecisionContext};
use crate::error::{Result, RiskError};
use crate::registry::RuleRegistryHandle;
use crate::scoring;
use crate::signals::{self, TrustSignalProvider};
use crate::types::{RiskEvaluationRequest, RiskEvaluationResult};

/// Adaptive risk and trust evaluation engine.
///
/// Cheap to clone; the provider and registry handle are shared. All
/// mutable state lives behind the registry's atomic snapshot swap, so
/// concurrent evaluations never observe a half-updated rule set.
#[derive(Clone)]
pub struct RiskEngine {
    provider: Arc<dyn TrustSignalProvider>,
    registry: RuleRegistryHandle,
    config: RiskEngineConfig,
}

impl RiskEngine {
    /// Creates an engine with the default configuration.
    pub fn new(provider: Arc<dyn TrustSignalProvider>, registry: RuleRegistryHandle) -> Self {
        Self::with_config(provider, registry, RiskEngineConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    pub fn with_config(
        provider: Arc<dyn TrustSignalProvider>,
        registry: RuleRegistryHandle,
        config: RiskEngineConfig,
    ) -> Self {
        Self {
            provider,
            registry,
            config,
        }
    }

    /// The registry handle, for hot-reloading rule snapshots.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistryHandle {
        &self.registry
    }

    /// Evaluates the risk of an access request.
    ///
    /// Identical requests against identical provider and registry state
    /// produce identical results; anything observation-only (latency,
    /// timings) goes to the log, not the result.
    #[instrument(
        skip(self, request),
        fields(
            tenant_id = %request.tenant_id,
            subject_id = %request.subject_id,
            resource_type = %request.resource_type,
            action = %request.action,
            market = %request.market,
        )
    )]
    pub async fn evaluate(&self, request: &RiskEvaluationRequest) -> Result<RiskEvaluationResult> {
        request.validate()?;

        let started = Instant::now();
        let result = tokio::time::timeout(self.config.total_budget(), self.evaluate_inner(request))
            .await
            .map_err(|_| RiskError::DeadlineExceeded {
                budget_ms: self.config.total_budget_ms,
            })??;

        info!(
            risk_score = result.risk_score,
            risk_level = %result.risk_level,
            recommendation = %result.recommendation,
            degraded = result.degraded,
            latency_ms = started.elapsed().as_millis() as u64,
            "risk evaluation complete"
        );

        Ok(result)
    }

    async fn evaluate_inner(
        &self,
        request: &RiskEvaluationRequest,
    ) -> Result<RiskEvaluationResult> {
        let signals = signals::acquire_signals(
            self.provider.as_ref(),
            request,
            self.config.signal_timeout(),
            self.config.total_budget(),
        )
        .await?;

        let anomaly = anomaly::assess(
            &signals.profile.access_patterns,
            &request.resource_type,
            &request.action,
            signals.profile.anomaly_threshold,
        );
        debug!(
            anomaly_score = anomaly.score,
            is_anomaly = anomaly.is_anomaly,
            "anomaly assessment"
        );

        let snapshot = self.registry.load();
        let registry_degraded = snapshot.is_none();
        if registry_degraded {
            warn!("no rule registry snapshot loaded, evaluating without market rules");
        }

        let (applied_rules, compliance) = match snapshot {
            Some(snapshot) => (
                snapshot.lookup_rules(
                    &request.market,
                    &signals.sensitivity.classification,
                    &request.action,
                    request.amount(),
                ),
                snapshot
                    .lookup_compliance_checks(&request.market, &signals.sensitivity.compliance_tags),
            ),
            None => (Vec::new(), Vec::new()),
        };

        let breakdown = scoring::aggregate(
            request,
            &signals,
            anomaly,
            &self.config.weights,
            &self.config.thresholds,
        );

        Ok(decision::compose(DecisionContext {
            request,
            signals: &signals,
            anomaly,
            breakdown,
            applied_rules,
            compliance,
            registry_degraded,
            auth_failure_limit: self.config.auth_failure_limit,
        }))
    }
}

impl std::fmt::Debug for RiskEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
