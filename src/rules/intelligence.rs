//! Intelligence rules: the cross-module overview of one property.
//!
//! `no-property` and `no-evidence` are shared with the forensic catalogue.

use crate::config::EngineConfig;
use crate::facts::FactSet;
use crate::normalizer::names::*;
use crate::types::Severity;

use super::{GuidanceCandidate, RuleCatalogue, Topic, EVERY_QUESTION};

pub const NO_PROPERTY: &str = "no-property";
pub const MODE_STUB: &str = "mode-stub";
pub const MISSING_ADDRESS: &str = "missing-address";
pub const NO_EVIDENCE: &str = "no-evidence";
pub const UNVERIFIED_EVIDENCE: &str = "unverified-evidence";
pub const CLAIMS_IN_REVIEW: &str = "claims-in-review";
pub const VERIFIED_EVIDENCE_LEVERAGE: &str = "verified-evidence-leverage";

pub fn register(catalogue: &mut RuleCatalogue) {
    catalogue.register(NO_PROPERTY, EVERY_QUESTION, no_property);
    catalogue.register(MODE_STUB, EVERY_QUESTION, mode_stub);
    catalogue.register(MISSING_ADDRESS, &[Topic::Property], missing_address);
    catalogue.register(NO_EVIDENCE, &[Topic::Evidence], no_evidence);
    catalogue.register(UNVERIFIED_EVIDENCE, &[Topic::Evidence], unverified_evidence);
    catalogue.register(CLAIMS_IN_REVIEW, &[Topic::Claims], claims_in_review);
    catalogue.register(
        VERIFIED_EVIDENCE_LEVERAGE,
        &[Topic::Evidence, Topic::Claims],
        verified_evidence_leverage,
    );
}

// ---------------------------------------------------------------------------
// Property
// ---------------------------------------------------------------------------

/// No focal property in the snapshot.
pub fn no_property(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if !facts.is_unknown(PROPERTY_ON_FILE) {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            NO_PROPERTY,
            Severity::Critical,
            "No property selected",
            "Every forensic, insurance, and execution insight is anchored to a property record.",
        )
        .action(
            "Select or create a property",
            "Guidance cannot be grounded until a property is on file.",
        )
        .cite(facts, &[PROPERTY_ON_FILE, PORTFOLIO_PROPERTY_COUNT]),
    )
}

/// Snapshot records are placeholders, not live data.
pub fn mode_stub(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.text(SNAPSHOT_PROVENANCE) != Some("stub") {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            MODE_STUB,
            Severity::High,
            "Running on placeholder data",
            "Records in this view are placeholders, so no guidance can be treated as verified.",
        )
        .action(
            "Connect live records",
            "Switch the data source to live storage before acting on guidance.",
        )
        .cite(facts, &[SNAPSHOT_PROVENANCE]),
    )
}

pub fn missing_address(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.flag(PROPERTY_ADDRESS_COMPLETE) != Some(false) {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            MISSING_ADDRESS,
            Severity::High,
            "Property address is incomplete",
            "Carriers and inspectors match claims to a full street address.",
        )
        .action(
            "Complete the property address",
            "Claim filings need the street line along with city and region.",
        )
        .cite(facts, &[PROPERTY_ADDRESS_COMPLETE]),
    )
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

/// Property is on file but nothing has been captured for it.
pub fn no_evidence(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.flag(PROPERTY_ON_FILE) != Some(true) || facts.count(EVIDENCE_COUNT) != Some(0) {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            NO_EVIDENCE,
            Severity::Critical,
            "No evidence captured",
            "Claims without documented damage are routinely underpaid or denied.",
        )
        .action(
            "Upload damage evidence",
            "Photos, video, and measurements establish the scope of loss.",
        )
        .cite(facts, &[PROPERTY_ON_FILE, EVIDENCE_COUNT]),
    )
}

/// Unverified or flagged evidence on file. Raised as well when evidence
/// exists but none carries a verification status.
pub fn unverified_evidence(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.count(EVIDENCE_UNVERIFIED_COUNT) == Some(0) {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            UNVERIFIED_EVIDENCE,
            Severity::High,
            "Evidence awaiting verification",
            "Unverified evidence carries little weight in carrier negotiations.",
        )
        .action(
            "Verify pending evidence",
            "Verified items can be cited directly in claim packages.",
        )
        .cite(facts, &[EVIDENCE_COUNT, EVIDENCE_UNVERIFIED_COUNT]),
    )
}

pub fn verified_evidence_leverage(
    facts: &FactSet,
    _config: &EngineConfig,
) -> Option<GuidanceCandidate> {
    if facts.count(EVIDENCE_VERIFIED_COUNT).unwrap_or(0) == 0 {
        return None;
    }
    Some(
        GuidanceCandidate::opportunity(
            VERIFIED_EVIDENCE_LEVERAGE,
            Severity::Low,
            "Verified evidence ready to use",
            "Verified items strengthen supplements and appeals.",
        )
        .action(
            "Attach verified evidence to open claims",
            "Verified documentation shortens carrier review.",
        )
        .cite(facts, &[EVIDENCE_VERIFIED_COUNT]),
    )
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

pub fn claims_in_review(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.count(CLAIMS_IN_REVIEW_COUNT) == Some(0) {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            CLAIMS_IN_REVIEW,
            Severity::High,
            "Claims under carrier review",
            "Review windows are when missing documentation costs the most.",
        )
        .action(
            "Confirm the claim file is complete",
            "Carriers decide on what is in the file when review closes.",
        )
        .cite(facts, &[CLAIM_COUNT, CLAIMS_IN_REVIEW_COUNT]),
    )
}
