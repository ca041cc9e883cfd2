//! Snapshot records supplied by the external data collaborator.
//!
//! A snapshot is already access-controlled (role redaction happens before it
//! reaches the engine) and is only ever borrowed immutably. Any business
//! field the storage layer allows to be null is an `Option` here so the
//! normalizer can tell "no data" apart from "zero".

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Provenance;

/// Immutable, provenance-tagged bundle of records for one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub module: String,
    pub provenance: Provenance,
    /// Reference instant for recency facts. The engine never reads the clock.
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
    /// Focal property for the request, if one was selected.
    #[serde(default)]
    pub property: Option<PropertyRecord>,
    #[serde(default)]
    pub properties: Vec<PropertyRecord>,
    #[serde(default)]
    pub evidence: Vec<EvidenceRecord>,
    #[serde(default)]
    pub claims: Vec<ClaimRecord>,
    #[serde(default)]
    pub carrier_interactions: Vec<CarrierInteraction>,
    #[serde(default)]
    pub scope_discrepancies: Vec<ScopeDiscrepancy>,
    #[serde(default)]
    pub contractors: Vec<ContractorRecord>,
    #[serde(default)]
    pub milestones: Vec<MilestoneRecord>,
    #[serde(default)]
    pub equity_outcomes: Vec<EquityOutcomeRecord>,
}

/// A snapshot record with a stable id, used as a fact source.
pub trait Record {
    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($($ty:ty),* $(,)?) => {
        $(impl Record for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_record!(
    PropertyRecord,
    EvidenceRecord,
    ClaimRecord,
    CarrierInteraction,
    ScopeDiscrepancy,
    ContractorRecord,
    MilestoneRecord,
    EquityOutcomeRecord,
);

// ---------------------------------------------------------------------------
// Property + forensic evidence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl PropertyRecord {
    /// Line 1, city and region are all present and non-blank.
    pub fn has_complete_address(&self) -> bool {
        [&self.address_line1, &self.city, &self.region]
            .iter()
            .all(|f| f.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvidenceKind {
    Photo,
    Video,
    Document,
    Measurement,
    Report,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationStatus {
    Verified,
    Unverified,
    Flagged,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceRecord {
    pub id: String,
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub kind: Option<EvidenceKind>,
    #[serde(default)]
    pub verification_status: Option<VerificationStatus>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
}

impl EvidenceRecord {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

// ---------------------------------------------------------------------------
// Insurance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimStatus {
    Draft,
    Submitted,
    UnderReview,
    AdditionalInfoRequested,
    Approved,
    PartiallyApproved,
    Denied,
    Appealed,
    Settled,
    Closed,
}

impl ClaimStatus {
    /// Settled, closed and denied claims no longer need carrier follow-up.
    pub fn is_open(&self) -> bool {
        !matches!(
            self,
            ClaimStatus::Settled | ClaimStatus::Closed | ClaimStatus::Denied
        )
    }

    /// Claim is parked with the carrier (review, info request or appeal).
    pub fn is_in_review(&self) -> bool {
        matches!(
            self,
            ClaimStatus::UnderReview | ClaimStatus::AdditionalInfoRequested | ClaimStatus::Appealed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    pub id: String,
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub status: Option<ClaimStatus>,
    #[serde(default)]
    pub claimed_amount: Option<f64>,
    #[serde(default)]
    pub approved_amount: Option<f64>,
    #[serde(default)]
    pub paid_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierInteraction {
    pub id: String,
    #[serde(default)]
    pub claim_id: Option<String>,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeDiscrepancy {
    pub id: String,
    #[serde(default)]
    pub claim_id: Option<String>,
    #[serde(default)]
    pub line_item: Option<String>,
    #[serde(default)]
    pub forensic_value_usd: Option<f64>,
    #[serde(default)]
    pub carrier_value_usd: Option<f64>,
    #[serde(default)]
    pub resolved: bool,
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContractorStatus {
    PendingApproval,
    Approved,
    Suspended,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorRecord {
    pub id: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub status: Option<ContractorStatus>,
    #[serde(default)]
    pub license_expires_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MilestoneStatus {
    Pending,
    InProgress,
    Blocked,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRecord {
    pub id: String,
    #[serde(default)]
    pub contractor_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<MilestoneStatus>,
    #[serde(default)]
    pub percent_complete: Option<f64>,
    #[serde(default)]
    pub verified: Option<bool>,
}

// ---------------------------------------------------------------------------
// Equity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityOutcomeRecord {
    pub id: String,
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub claim_submitted_usd: Option<f64>,
    #[serde(default)]
    pub payout_received_usd: Option<f64>,
    #[serde(default)]
    pub projected_equity_gain_usd: Option<f64>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub report_requested: bool,
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::test_utils::*;
    use super::*;

    #[test]
    fn test_snapshot_deserializes_with_defaults() {
        let json = r#"{ "module": "intelligence", "provenance": "stub" }"#;
        let snap: Snapshot = serde_json::from_str(json).expect("minimal snapshot");
        assert_eq!(snap.provenance, Provenance::Stub);
        assert!(snap.property.is_none());
        assert!(snap.as_of.is_none());
        assert!(snap.claims.is_empty());
    }

    #[test]
    fn test_portfolio_properties_ignore_extra_fields() {
        let json = r#"{
            "module": "intelligence",
            "provenance": "live",
            "properties": [
                { "id": "prop-1", "city": "Tampa", "valuationBeforeUsd": 410000 },
                { "id": "prop-2" }
            ]
        }"#;
        let snap: Snapshot = serde_json::from_str(json).expect("portfolio snapshot");
        assert_eq!(snap.properties.len(), 2);
        assert_eq!(snap.properties[0].city.as_deref(), Some("Tampa"));
    }

    #[test]
    fn test_address_completeness() {
        let mut p = property("prop-1");
        assert!(p.has_complete_address());
        p.city = Some("  ".to_string());
        assert!(!p.has_complete_address());
        p.city = None;
        assert!(!p.has_complete_address());
    }

    #[test]
    fn test_claim_status_lifecycle() {
        assert!(ClaimStatus::UnderReview.is_open());
        assert!(ClaimStatus::UnderReview.is_in_review());
        assert!(!ClaimStatus::Settled.is_open());
        assert!(!ClaimStatus::Draft.is_in_review());
        let parsed: ClaimStatus = serde_json::from_str("\"additional-info-requested\"").unwrap();
        assert_eq!(parsed, ClaimStatus::AdditionalInfoRequested);
    }

    #[test]
    fn test_evidence_tags_case_insensitive() {
        let mut ev = evidence("ev-1", EvidenceKind::Photo, VerificationStatus::Verified);
        ev.tags = vec!["Context".to_string()];
        assert!(ev.has_tag("context"));
        assert!(!ev.has_tag("weather"));
    }
}
