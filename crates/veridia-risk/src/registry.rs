//! Market rule and compliance-check registry.
//!
//! The registry maps (market, resource classification, action, attributes)
//! to the regulatory rule identifiers and compliance-check identifiers that
//! apply to a request. Dispatch is data-driven: adding a market or framework
//! is a snapshot change, not a code change.
//!
//! Snapshots are immutable. The engine reads one consistent [`Arc`]'d
//! snapshot per evaluation through a [`RuleRegistryHandle`]; the registry
//! owner may swap in a new snapshot at any time without blocking in-flight
//! evaluations.
//!
//! # Snapshot format
//!
//! ```rust
//! use veridia_risk::registry::RegistrySnapshot;
//!
//! let snapshot = RegistrySnapshot::from_json(r#"{
//!     "markets": {
//!         "AO": { "rules": [
//!             { "id": "aml_angola_basic", "actions": ["transfer", "payment"] },
//!             { "id": "bna_reporting", "actions": ["transfer"], "min_amount": 5000.0 }
//!         ]},
//!         "global": { "rules": [
//!             { "id": "kyc_standard" }
//!         ]}
//!     },
//!     "compliance": [
//!         { "id": "gdpr_consent", "framework": "GDPR", "tags": ["personal_data"], "markets": ["EU", "PT"] },
//!         { "id": "pci_handling", "framework": "PCI-DSS", "tags": ["card_data"] }
//!     ]
//! }"#).unwrap();
//!
//! let rules = snapshot.lookup_rules("AO", "restricted", "transfer", Some(10_000.0));
//! assert_eq!(rules, vec!["aml_angola_basic", "bna_reporting"]);
//!
//! // Unknown market falls back to the global rule set.
//! let fallback = snapshot.lookup_rules("ZZ", "internal", "read", None);
//! assert_eq!(fallback, vec!["kyc_standard"]);
//! ```

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::RiskError;

/// Market key used when a request's market has no dedicated rule set.
pub const GLOBAL_MARKET: &str = "global";

/// One regulatory rule in a market rule set.
///
/// A rule applies when every present constraint matches; absent constraints
/// match anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Stable rule identifier surfaced in evaluation results.
    pub id: String,
    /// Actions the rule applies to. `None` matches every action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
    /// Resource classifications the rule applies to. `None` matches all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifications: Option<Vec<String>>,
    /// Minimum monetary amount (from the request's "amount" attribute)
    /// required for the rule to apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
}

impl RuleSpec {
    /// Returns true when the rule applies to the given request context.
    #[must_use]
    pub fn matches(&self, classification: &str, action: &str, amount: Option<f64>) -> bool {
        if let Some(actions) = &self.actions {
            if !actions.iter().any(|a| a == action) {
                return false;
            }
        }
        if let Some(classifications) = &self.classifications {
            if !classifications.iter().any(|c| c == classification) {
                return false;
            }
        }
        if let Some(min) = self.min_amount {
            match amount {
                Some(value) if value >= min => {}
                _ => return false,
            }
        }
        true
    }
}

/// The rules configured for one market.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketRuleSet {
    /// Rules in declaration order; lookups preserve this order.
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// One compliance check definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceSpec {
    /// Stable check identifier surfaced in evaluation results.
    pub id: String,
    /// Regulatory framework this check belongs to (e.g. "GDPR", "PCI-DSS").
    pub framework: String,
    /// Resource compliance tags that activate this check.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Markets the check applies in. `None` applies everywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markets: Option<Vec<String>>,
}

impl ComplianceSpec {
    /// Returns true when the check applies to a resource with the given
    /// compliance tags in the given market.
    #[must_use]
    pub fn matches(&self, market: &str, resource_tags: &[String]) -> bool {
        if let Some(markets) = &self.markets {
            if !markets.iter().any(|m| m == market) {
                return false;
            }
        }
        self.tags.iter().any(|t| resource_tags.contains(t))
    }
}

/// A matched compliance check with its framework label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceMatch {
    /// Check identifier.
    pub id: String,
    /// Framework the check belongs to.
    pub framework: String,
}

/// An immutable generation of the rule registry.
///
/// Lookups are deterministic: identical inputs against the same snapshot
/// always yield identical, declaration-ordered results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Market code → rule set. The `"global"` entry is the fallback for
    /// markets with no dedicated set.
    #[serde(default)]
    pub markets: BTreeMap<String, MarketRuleSet>,
    /// Compliance checks, consulted for every market.
    #[serde(default)]
    pub compliance: Vec<ComplianceSpec>,
}

impl RegistrySnapshot {
    /// Parses a snapshot from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, RiskError> {
        serde_json::from_str(json).map_err(|e| RiskError::RegistryUnavailable(e.to_string()))
    }

    /// Returns the identifiers of the rules that apply to a request.
    ///
    /// Uses the market's rule set when one exists, otherwise the
    /// [`GLOBAL_MARKET`] set; an absent global set yields no rules.
    #[must_use]
    pub fn lookup_rules(
        &self,
        market: &str,
        classification: &str,
        action: &str,
        amount: Option<f64>,
    ) -> Vec<String> {
        let rule_set = self
            .markets
            .get(market)
            .or_else(|| self.markets.get(GLOBAL_MARKET));

        rule_set
            .map(|set| {
                set.rules
                    .iter()
                    .filter(|rule| rule.matches(classification, action, amount))
                    .map(|rule| rule.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the compliance checks that apply to a resource's compliance
    /// tags in a market, in declaration order.
    #[must_use]
    pub fn lookup_compliance_checks(
        &self,
        market: &str,
        resource_tags: &[String],
    ) -> Vec<ComplianceMatch> {
        self.compliance
            .iter()
            .filter(|spec| spec.matches(market, resource_tags))
            .map(|spec| ComplianceMatch {
                id: spec.id.clone(),
                framework: spec.framework.clone(),
            })
            .collect()
    }
}

/// Shared handle to the current registry snapshot.
///
/// Readers clone the inner [`Arc`] under a short read lock, so an evaluation
/// holds exactly one registry generation for its whole lifetime and a
/// concurrent [`replace`](Self::replace) never blocks on, or is blocked by,
/// in-flight evaluations.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistryHandle {
    inner: Arc<RwLock<Option<Arc<RegistrySnapshot>>>>,
}

impl RuleRegistryHandle {
    /// Creates a handle with no snapshot loaded yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a handle pre-loaded with a snapshot.
    #[must_use]
    pub fn with_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(Arc::new(snapshot)))),
        }
    }

    /// Returns the current snapshot, or `None` when no generation has been
    /// loaded; evaluations then degrade to an empty rule set.
    #[must_use]
    pub fn load(&self) -> Option<Arc<RegistrySnapshot>> {
        self.inner.read().clone()
    }

    /// Atomically swaps in a new snapshot generation.
    pub fn replace(&self, snapshot: RegistrySnapshot) {
        *self.inner.write() = Some(Arc::new(snapshot));
    }

    /// Removes the current snapshot; subsequent evaluations degrade.
    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> RegistrySnapshot {
        RegistrySnapshot::from_json(
            r#"{
                "markets": {
                    "AO": { "rules": [
                        { "id": "aml_angola_basic", "actions": ["transfer", "payment"] },
                        { "id": "bna_reporting", "actions": ["transfer"], "min_amount": 5000.0 },
                        { "id": "data_residency_ao", "classifications": ["restricted"] }
                    ]},
                    "EU": { "rules": [
                        { "id": "psd2_sca", "actions": ["transfer", "payment"] }
                    ]},
                    "global": { "rules": [
                        { "id": "kyc_standard" }
                    ]}
                },
                "compliance": [
                    { "id": "gdpr_consent", "framework": "GDPR", "tags": ["personal_data"], "markets": ["EU", "PT"] },
                    { "id": "pci_handling", "framework": "PCI-DSS", "tags": ["card_data"] },
                    { "id": "open_banking_scope", "framework": "Open Banking", "tags": ["account_data"], "markets": ["EU"] }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_angola_transfer_includes_aml_rules() {
        let rules = snapshot().lookup_rules("AO", "internal", "transfer", Some(8000.0));
        assert_eq!(rules, vec!["aml_angola_basic", "bna_reporting"]);
    }

    #[test]
    fn test_min_amount_gate() {
        let snap = snapshot();
        // Below the threshold, the reporting rule does not apply.
        let small = snap.lookup_rules("AO", "internal", "transfer", Some(100.0));
        assert_eq!(small, vec!["aml_angola_basic"]);
        // At or above the threshold it does.
        let large = snap.lookup_rules("AO", "internal", "transfer", Some(5000.0));
        assert_eq!(large, vec!["aml_angola_basic", "bna_reporting"]);
        // No amount attribute at all means the amount-gated rule is skipped.
        let missing = snap.lookup_rules("AO", "internal", "transfer", None);
        assert_eq!(missing, vec!["aml_angola_basic"]);
    }

    #[test]
    fn test_classification_gate() {
        let snap = snapshot();
        let restricted = snap.lookup_rules("AO", "restricted", "read", None);
        assert_eq!(restricted, vec!["data_residency_ao"]);
        let internal = snap.lookup_rules("AO", "internal", "read", None);
        assert!(internal.is_empty());
    }

    #[test]
    fn test_unknown_market_falls_back_to_global() {
        let rules = snapshot().lookup_rules("ZZ", "internal", "read", None);
        assert_eq!(rules, vec!["kyc_standard"]);
    }

    #[test]
    fn test_missing_global_set_yields_empty() {
        let snap = RegistrySnapshot::default();
        assert!(snap.lookup_rules("ZZ", "internal", "read", None).is_empty());
    }

    #[test]
    fn test_compliance_tag_and_market_matching() {
        let snap = snapshot();
        let tags = vec!["personal_data".to_string()];

        let eu = snap.lookup_compliance_checks("EU", &tags);
        assert_eq!(eu.len(), 1);
        assert_eq!(eu[0].id, "gdpr_consent");
        assert_eq!(eu[0].framework, "GDPR");

        // Same tags outside the configured markets: no GDPR check.
        let ao = snap.lookup_compliance_checks("AO", &tags);
        assert!(ao.is_empty());

        // Market-unrestricted check applies everywhere.
        let card = snap.lookup_compliance_checks("AO", &["card_data".to_string()]);
        assert_eq!(card[0].id, "pci_handling");
    }

    #[test]
    fn test_lookups_are_deterministic() {
        let snap = snapshot();
        let a = snap.lookup_rules("AO", "restricted", "transfer", Some(9000.0));
        let b = snap.lookup_rules("AO", "restricted", "transfer", Some(9000.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_json_is_registry_unavailable() {
        let err = RegistrySnapshot::from_json("{ not json").unwrap_err();
        assert!(matches!(err, RiskError::RegistryUnavailable(_)));
    }

    #[test]
    fn test_handle_swap_preserves_loaded_generation() {
        let handle = RuleRegistryHandle::with_snapshot(snapshot());
        let generation_one = handle.load().unwrap();

        // Owner swaps in a new generation mid-evaluation.
        handle.replace(RegistrySnapshot::default());

        // The already-loaded generation still answers consistently.
        let rules = generation_one.lookup_rules("AO", "internal", "payment", None);
        assert_eq!(rules, vec!["aml_angola_basic"]);

        // New loads see the new generation.
        let generation_two = handle.load().unwrap();
        assert!(generation_two
            .lookup_rules("AO", "internal", "payment", None)
            .is_empty());
    }

    #[test]
    fn test_empty_handle_degrades() {
        let handle = RuleRegistryHandle::new();
        assert!(handle.load().is_none());
        handle.replace(snapshot());
        assert!(handle.load().is_some());
        handle.clear();
        assert!(handle.load().is_none());
    }
}
