//! End-to-end tests for the risk evaluation engine.
//!
//! Each test wires a mock signal provider and a rule registry snapshot into
//! a [`RiskEngine`] and asserts on the full evaluation result.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use veridia_core::{DeviceId, ResourceId, SubjectId, TenantId};
use veridia_risk::signals::SignalError;
use veridia_risk::types::{
    AccessPattern, ContextCheck, FrequencyBucket, SensitivityLevel,
};
use veridia_risk::{
    Recommendation, RegistrySnapshot, ResourceSensitivity, RiskEngine, RiskEngineConfig,
    RiskError, RiskEvaluationRequest, RiskLevel, RuleRegistryHandle, TrustSignalProvider,
    UserRiskProfile,
};

/// Provider returning canned signals, with optional failure/latency modes.
#[derive(Clone)]
struct MockProvider {
    profile: UserRiskProfile,
    sensitivity: ResourceSensitivity,
    location_trust: f64,
    ip_trust: f64,
    device_trust: f64,
    business_hours: bool,
    fail_all: bool,
    fail_profile: bool,
    delay: Option<Duration>,
    delay_ip: Option<Duration>,
}

impl MockProvider {
    /// A well-behaved subject on a trusted network reading a low-value
    /// resource they touch every day.
    fn trusted() -> Self {
        Self {
            profile: UserRiskProfile {
                base_risk_score: 0.1,
                anomaly_threshold: 0.6,
                recent_auth_failures: 0,
                last_successful_auth: Some(accessed_at() - chrono::Duration::minutes(10)),
                access_patterns: vec![AccessPattern {
                    resource_type: "account".to_string(),
                    action: "read".to_string(),
                    frequency: FrequencyBucket::High,
                }],
            },
            sensitivity: ResourceSensitivity {
                level: SensitivityLevel::Low,
                classification: "internal".to_string(),
                mfa_required: false,
                context_checks: Vec::new(),
                compliance_tags: Vec::new(),
            },
            location_trust: 0.9,
            ip_trust: 0.9,
            device_trust: 0.9,
            business_hours: true,
            fail_all: false,
            fail_profile: false,
            delay: None,
            delay_ip: None,
        }
    }

    async fn maybe_delay(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl TrustSignalProvider for MockProvider {
    async fn get_user_risk_profile(
        &self,
        _subject_id: SubjectId,
    ) -> Result<UserRiskProfile, SignalError> {
        self.maybe_delay().await;
        if self.fail_all || self.fail_profile {
            return Err(SignalError::new("profile store unavailable"));
        }
        Ok(self.profile.clone())
    }

    async fn get_resource_sensitivity(
        &self,
        _resource_id: ResourceId,
    ) -> Result<ResourceSensitivity, SignalError> {
        self.maybe_delay().await;
        if self.fail_all {
            return Err(SignalError::new("resource store unavailable"));
        }
        Ok(self.sensitivity.clone())
    }

    async fn get_location_trust(&self, _location: &str) -> Result<f64, SignalError> {
        self.maybe_delay().await;
        if self.fail_all {
            return Err(SignalError::new("geo service unavailable"));
        }
        Ok(self.location_trust)
    }

    async fn get_ip_trust(&self, _ip_address: &str) -> Result<f64, SignalError> {
        self.maybe_delay().await;
        if let Some(delay) = self.delay_ip {
            tokio::time::sleep(delay).await;
        }
        if self.fail_all {
            return Err(SignalError::new("ip reputation unavailable"));
        }
        Ok(self.ip_trust)
    }

    async fn get_device_trust(&self, _device_id: DeviceId) -> Result<f64, SignalError> {
        self.maybe_delay().await;
        if self.fail_all {
            return Err(SignalError::new("device registry unavailable"));
        }
        Ok(self.device_trust)
    }

    async fn is_business_hours(
        &self,
        _at: DateTime<Utc>,
        _location: &str,
    ) -> Result<bool, SignalError> {
        self.maybe_delay().await;
        if self.fail_all {
            return Err(SignalError::new("calendar service unavailable"));
        }
        Ok(self.business_hours)
    }
}

fn accessed_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 17, 14, 30, 0).unwrap()
}

fn request() -> RiskEvaluationRequest {
    RiskEvaluationRequest {
        tenant_id: TenantId::new(),
        subject_id: SubjectId::new(),
        resource_id: ResourceId::new(),
        resource_type: "account".to_string(),
        action: "read".to_string(),
        market: "PT".to_string(),
        location: "Lisbon".to_string(),
        ip_address: "203.0.113.10".to_string(),
        device_id: DeviceId::new(),
        accessed_at: accessed_at(),
        device_recognized: true,
        attributes: BTreeMap::new(),
    }
}

fn registry() -> RuleRegistryHandle {
    let snapshot = RegistrySnapshot::from_json(
        r#"{
            "markets": {
                "AO": { "rules": [
                    { "id": "aml_angola_basic", "actions": ["transfer", "payment"] },
                    { "id": "bna_reporting", "actions": ["transfer"], "min_amount": 5000.0 }
                ]},
                "global": { "rules": [
                    { "id": "kyc_standard" }
                ]}
            },
            "compliance": [
                { "id": "gdpr_consent", "framework": "GDPR", "tags": ["personal_data"], "markets": ["EU", "PT"] },
                { "id": "pci_handling", "framework": "PCI-DSS", "tags": ["card_data"] }
            ]
        }"#,
    )
    .unwrap();
    RuleRegistryHandle::with_snapshot(snapshot)
}

fn engine(provider: MockProvider) -> RiskEngine {
    // Generous budgets so tests are not flaky under load.
    let config = RiskEngineConfig {
        total_budget_ms: 2_000,
        signal_timeout_ms: 1_000,
        ..RiskEngineConfig::default()
    };
    RiskEngine::with_config(Arc::new(provider), registry(), config)
}

#[tokio::test]
async fn test_trusted_subject_low_risk_allow() {
    let engine = engine(MockProvider::trusted());
    let result = engine.evaluate(&request()).await.unwrap();

    assert_eq!(result.risk_level, RiskLevel::Low);
    assert_eq!(result.recommendation, Recommendation::Allow);
    assert!(!result.require_additional_auth);
    assert!(!result.degraded);
    assert!(result.risk_score < 0.2, "score was {}", result.risk_score);
    // Global fallback still applies.
    assert_eq!(result.applied_rules, vec!["kyc_standard"]);
    assert!(result
        .mitigating_factors
        .iter()
        .any(|m| m.name == "recent_successful_auth"));
}

#[tokio::test]
async fn test_unseen_pattern_elevates_to_challenge() {
    let mut provider = MockProvider::trusted();
    provider.profile.base_risk_score = 0.3;
    provider.profile.last_successful_auth = None;
    provider.sensitivity.level = SensitivityLevel::Medium;
    provider.location_trust = 0.5;
    provider.ip_trust = 0.5;
    provider.device_trust = 0.5;
    let engine = engine(provider);

    let mut request = request();
    // No history for this pair, so the anomaly score is 0.7.
    request.resource_type = "payment_instrument".to_string();
    request.action = "export".to_string();
    let result = engine.evaluate(&request).await.unwrap();

    assert_eq!(result.risk_level, RiskLevel::Medium);
    assert_eq!(result.recommendation, Recommendation::Challenge);
    assert!(result.require_additional_auth);
    assert!(result
        .risk_factors
        .iter()
        .any(|f| f.name == "anomalous_access"));
    assert!(result
        .security_recommendations
        .iter()
        .any(|r| r.contains("unusual")));
}

#[tokio::test]
async fn test_hostile_context_critical_deny() {
    let mut provider = MockProvider::trusted();
    provider.profile.base_risk_score = 0.9;
    provider.profile.recent_auth_failures = 3;
    provider.profile.last_successful_auth = None;
    provider.profile.access_patterns.clear();
    provider.sensitivity.level = SensitivityLevel::High;
    provider.sensitivity.context_checks = vec![ContextCheck::BusinessHours];
    provider.location_trust = 0.1;
    provider.ip_trust = 0.1;
    provider.device_trust = 0.1;
    provider.business_hours = false;
    let engine = engine(provider);

    let mut request = request();
    request.device_recognized = false;
    let result = engine.evaluate(&request).await.unwrap();

    assert_eq!(result.risk_level, RiskLevel::Critical);
    assert_eq!(result.recommendation, Recommendation::Deny);
    assert!(result.require_additional_auth);
    assert!(result
        .risk_factors
        .iter()
        .any(|f| f.name == "off_hours_access"));
}

#[tokio::test]
async fn test_auth_failure_limit_denies_even_at_low_score() {
    let mut provider = MockProvider::trusted();
    provider.profile.recent_auth_failures = 7;
    provider.profile.last_successful_auth = None;
    let engine = engine(provider);

    let result = engine.evaluate(&request()).await.unwrap();

    assert_eq!(result.risk_level, RiskLevel::Low);
    assert_eq!(result.recommendation, Recommendation::Deny);
}

#[tokio::test]
async fn test_mfa_required_forces_challenge() {
    let mut provider = MockProvider::trusted();
    provider.sensitivity.mfa_required = true;
    let engine = engine(provider);

    let result = engine.evaluate(&request()).await.unwrap();

    assert_eq!(result.risk_level, RiskLevel::Low);
    assert_eq!(result.recommendation, Recommendation::Challenge);
    assert!(result.require_additional_auth);
}

#[tokio::test]
async fn test_identical_requests_serialize_identically() {
    let engine = engine(MockProvider::trusted());
    let request = request();

    let first = engine.evaluate(&request).await.unwrap();
    let second = engine.evaluate(&request).await.unwrap();

    let first_json = serde_json::to_string(&first).unwrap();
    let second_json = serde_json::to_string(&second).unwrap();
    assert_eq!(first_json, second_json);
}

#[tokio::test]
async fn test_partial_signal_failure_degrades_but_completes() {
    let mut provider = MockProvider::trusted();
    provider.fail_profile = true;
    let engine = engine(provider);

    let result = engine.evaluate(&request()).await.unwrap();

    assert!(result.degraded);
    assert_eq!(
        result.audit_metadata.get("degraded_signals").map(String::as_str),
        Some("user_risk_profile")
    );
    // Neutral base risk 0.5 replaces the lost profile.
    assert!(result
        .risk_factors
        .iter()
        .any(|f| f.name == "base_user_risk" && (f.contribution - 0.125).abs() < 1e-9));
}

#[tokio::test]
async fn test_single_slow_signal_degrades_but_completes() {
    let mut provider = MockProvider::trusted();
    provider.delay_ip = Some(Duration::from_millis(300));
    let config = RiskEngineConfig {
        total_budget_ms: 1_000,
        signal_timeout_ms: 50,
        ..RiskEngineConfig::default()
    };
    let engine = RiskEngine::with_config(Arc::new(provider), registry(), config);

    let result = engine.evaluate(&request()).await.unwrap();

    assert!(result.degraded);
    assert_eq!(
        result.audit_metadata.get("degraded_signals").map(String::as_str),
        Some("ip_trust")
    );
    // The lost signal contributes its neutral default, not a failure.
    assert_eq!(result.risk_level, RiskLevel::Low);
    assert_eq!(result.recommendation, Recommendation::Allow);
}

#[tokio::test]
async fn test_total_signal_blackout_is_an_error() {
    let mut provider = MockProvider::trusted();
    provider.fail_all = true;
    let engine = engine(provider);

    let err = engine.evaluate(&request()).await.unwrap_err();
    assert!(matches!(err, RiskError::SignalUnavailable));
}

#[tokio::test]
async fn test_slow_provider_exceeds_deadline() {
    let mut provider = MockProvider::trusted();
    provider.delay = Some(Duration::from_millis(200));
    let config = RiskEngineConfig {
        total_budget_ms: 40,
        signal_timeout_ms: 30,
        ..RiskEngineConfig::default()
    };
    let engine = RiskEngine::with_config(Arc::new(provider), registry(), config);

    let err = engine.evaluate(&request()).await.unwrap_err();
    assert!(matches!(err, RiskError::DeadlineExceeded { .. }));
}

#[tokio::test]
async fn test_angola_transfer_applies_market_rules() {
    let mut provider = MockProvider::trusted();
    provider.sensitivity.classification = "restricted".to_string();
    let engine = engine(provider);

    let mut request = request();
    request.market = "AO".to_string();
    request.action = "transfer".to_string();
    request
        .attributes
        .insert("amount".to_string(), serde_json::json!(8000.0));
    let result = engine.evaluate(&request).await.unwrap();

    assert_eq!(
        result.applied_rules,
        vec!["aml_angola_basic", "bna_reporting"]
    );
}

#[tokio::test]
async fn test_market_rules_do_not_change_score() {
    let engine = engine(MockProvider::trusted());

    let mut pt = request();
    pt.market = "PT".to_string();
    let mut ao = request();
    ao.market = "AO".to_string();

    let pt_result = engine.evaluate(&pt).await.unwrap();
    let ao_result = engine.evaluate(&ao).await.unwrap();

    assert_eq!(pt_result.risk_score, ao_result.risk_score);
    assert_eq!(pt_result.risk_level, ao_result.risk_level);
}

#[tokio::test]
async fn test_compliance_checks_from_resource_tags() {
    let mut provider = MockProvider::trusted();
    provider.sensitivity.compliance_tags = vec!["personal_data".to_string()];
    let engine = engine(provider);

    let result = engine.evaluate(&request()).await.unwrap();

    assert_eq!(result.compliance_checks, vec!["gdpr_consent"]);
    assert_eq!(
        result.audit_metadata.get("compliance_framework").map(String::as_str),
        Some("GDPR")
    );
}

#[tokio::test]
async fn test_missing_registry_degrades_without_rules() {
    let config = RiskEngineConfig {
        total_budget_ms: 2_000,
        signal_timeout_ms: 1_000,
        ..RiskEngineConfig::default()
    };
    let engine = RiskEngine::with_config(
        Arc::new(MockProvider::trusted()),
        RuleRegistryHandle::new(),
        config,
    );

    let result = engine.evaluate(&request()).await.unwrap();

    assert!(result.degraded);
    assert!(result.applied_rules.is_empty());
    assert!(result.compliance_checks.is_empty());
    assert_eq!(
        result.audit_metadata.get("registry_degraded").map(String::as_str),
        Some("true")
    );
}

#[tokio::test]
async fn test_registry_hot_swap_changes_applied_rules() {
    let engine = engine(MockProvider::trusted());

    let before = engine.evaluate(&request()).await.unwrap();
    assert_eq!(before.applied_rules, vec!["kyc_standard"]);

    engine.registry().replace(
        RegistrySnapshot::from_json(
            r#"{ "markets": { "global": { "rules": [ { "id": "kyc_enhanced" } ] } } }"#,
        )
        .unwrap(),
    );

    let after = engine.evaluate(&request()).await.unwrap();
    assert_eq!(after.applied_rules, vec!["kyc_enhanced"]);
}

#[tokio::test]
async fn test_blank_action_rejected() {
    let engine = engine(MockProvider::trusted());

    let mut request = request();
    request.action = "  ".to_string();
    let err = engine.evaluate(&request).await.unwrap_err();

    assert!(matches!(err, RiskError::InvalidRequest { ref field, .. } if field == "action"));
}
