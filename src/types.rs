//! Request/response contracts and the shared guidance vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::facts::FactCitation;
use crate::snapshot::Snapshot;

/// Fixed guardrail emitted on every successful response.
pub const GUARDRAIL: &str = "ATOS answers are derived only from current platform records.";

// =============================================================================
// Modules
// =============================================================================

/// The business module a guidance request is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Module {
    Intelligence,
    ForensicProperty,
    InsuranceIntelligence,
    ContractorExecution,
    EquityOutcome,
}

impl Module {
    pub const ALL: [Module; 5] = [
        Module::Intelligence,
        Module::ForensicProperty,
        Module::InsuranceIntelligence,
        Module::ContractorExecution,
        Module::EquityOutcome,
    ];

    /// Wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Intelligence => "intelligence",
            Module::ForensicProperty => "forensic-property",
            Module::InsuranceIntelligence => "insurance-intelligence",
            Module::ContractorExecution => "contractor-execution",
            Module::EquityOutcome => "equity-outcome",
        }
    }

    /// Parse a wire label. Unknown labels return `None`; callers decide
    /// whether that is a validation or a configuration failure.
    pub fn parse(s: &str) -> Option<Self> {
        Module::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Provenance / severity / confidence
// =============================================================================

/// Whether snapshot records come from live storage or a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Live,
    Stub,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Live => "live",
            Provenance::Stub => "stub",
        }
    }
}

/// Guidance severity. Variant order is the rank order (`Low` lowest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(alias = "info")]
    Low,
    Medium,
    #[serde(alias = "warning")]
    High,
    Critical,
}

impl Severity {
    /// Critical and high items surface as risks in the brief.
    pub fn is_risk_grade(&self) -> bool {
        *self >= Severity::High
    }
}

/// How well an item is supported by live, complete data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfidenceLabel {
    InsufficientEvidence,
    Partial,
    Grounded,
}

/// Whether a rule reports something to fix or something to leverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuidanceKind {
    Risk,
    Opportunity,
}

// =============================================================================
// Output entities
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedAction {
    pub label: String,
    pub rationale: String,
}

/// One ranked, explainable entry in a guidance response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceItem {
    pub id: String,
    pub severity: Severity,
    pub kind: GuidanceKind,
    pub title: String,
    pub why_this_matters: String,
    pub grounded_facts: Vec<FactCitation>,
    pub recommended_actions: Vec<RecommendedAction>,
    pub confidence_label: ConfidenceLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceBrief {
    pub why_it_matters: String,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
    pub recommended_actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceResponse {
    pub module: Module,
    pub items: Vec<GuidanceItem>,
    pub brief: GuidanceBrief,
    pub confidence_label: ConfidenceLabel,
    /// Present only when the request carried a question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub guardrail: String,
}

// =============================================================================
// Input
// =============================================================================

/// Inbound request from the web/API layer. `module` stays a raw string so
/// an unknown value surfaces as a validation error instead of a parse error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceRequest {
    pub module: String,
    pub snapshot: Snapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_labels_roundtrip() {
        for module in Module::ALL {
            assert_eq!(Module::parse(module.as_str()), Some(module));
            let json = serde_json::to_string(&module).unwrap();
            assert_eq!(json, format!("\"{}\"", module.as_str()));
        }
        assert_eq!(Module::parse("forensic"), None);
    }

    #[test]
    fn test_severity_order_and_aliases() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);

        let warning: Severity = serde_json::from_str("\"warning\"").unwrap();
        let info: Severity = serde_json::from_str("\"info\"").unwrap();
        assert_eq!(warning, Severity::High);
        assert_eq!(info, Severity::Low);
    }

    #[test]
    fn test_confidence_label_wire_format() {
        let json = serde_json::to_string(&ConfidenceLabel::InsufficientEvidence).unwrap();
        assert_eq!(json, "\"insufficient-evidence\"");
        assert!(ConfidenceLabel::InsufficientEvidence < ConfidenceLabel::Partial);
        assert!(ConfidenceLabel::Partial < ConfidenceLabel::Grounded);
    }
}
