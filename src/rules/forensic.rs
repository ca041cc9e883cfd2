//! Forensic-property rules: is the evidence file strong enough to carry a
//! claim?

use crate::config::EngineConfig;
use crate::facts::FactSet;
use crate::normalizer::names::*;
use crate::types::Severity;

use super::intelligence;
use super::{GuidanceCandidate, RuleCatalogue, Topic, EVERY_QUESTION};

pub const LOW_EVIDENCE_COVERAGE: &str = "low-evidence-coverage";
pub const REJECTED_EVIDENCE: &str = "rejected-evidence";
pub const NO_MEDIA: &str = "no-media";
pub const NO_MEASUREMENTS: &str = "no-measurements";
pub const NO_DOCUMENTS: &str = "no-documents";
pub const MISSING_CONTEXT_EVIDENCE: &str = "missing-context-evidence";
pub const CUSTODY_GAPS: &str = "custody-gaps";

pub fn register(catalogue: &mut RuleCatalogue) {
    catalogue.register(intelligence::NO_PROPERTY, EVERY_QUESTION, intelligence::no_property);
    catalogue.register(intelligence::NO_EVIDENCE, &[Topic::Evidence], intelligence::no_evidence);
    catalogue.register(LOW_EVIDENCE_COVERAGE, &[Topic::Evidence], low_evidence_coverage);
    catalogue.register(REJECTED_EVIDENCE, &[Topic::Evidence], rejected_evidence);
    catalogue.register(NO_MEDIA, &[Topic::Evidence], no_media);
    catalogue.register(NO_MEASUREMENTS, &[Topic::Evidence, Topic::Scope], no_measurements);
    catalogue.register(NO_DOCUMENTS, &[Topic::Evidence], no_documents);
    catalogue.register(MISSING_CONTEXT_EVIDENCE, &[Topic::Evidence], missing_context_evidence);
    catalogue.register(CUSTODY_GAPS, &[Topic::Evidence, Topic::Data], custody_gaps);
}

/// Evidence exists (so the kind/coverage rules apply at all).
fn has_evidence(facts: &FactSet) -> bool {
    facts.count(EVIDENCE_COUNT).unwrap_or(0) > 0
}

/// Evidence exists and none of it is known to be of the kind counted by
/// `name`. Unknown kinds count as a gap.
fn lacks_kind(facts: &FactSet, name: &str) -> bool {
    has_evidence(facts) && !facts.count(name).is_some_and(|n| n > 0)
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verified share of evidence is below the configured floor. With evidence
/// on file but no verification status anywhere, the ratio is unknown and
/// the candidate is still raised.
pub fn low_evidence_coverage(facts: &FactSet, config: &EngineConfig) -> Option<GuidanceCandidate> {
    if !has_evidence(facts) {
        return None;
    }
    let below_floor = match facts.ratio(EVIDENCE_COVERAGE_RATIO) {
        Some(ratio) => ratio < config.evidence_coverage_floor,
        None => true,
    };
    if !below_floor {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            LOW_EVIDENCE_COVERAGE,
            Severity::High,
            "Evidence coverage is low",
            "Most captured evidence has not been verified, which weakens every downstream claim.",
        )
        .action(
            "Verify captured evidence",
            "Raise verified coverage before submitting or supplementing a claim.",
        )
        .cite(facts, &[EVIDENCE_COUNT, EVIDENCE_COVERAGE_RATIO]),
    )
}

pub fn rejected_evidence(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.count(EVIDENCE_REJECTED_COUNT) == Some(0) {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            REJECTED_EVIDENCE,
            Severity::Medium,
            "Rejected evidence on file",
            "Rejected items leave gaps in the documented scope of loss.",
        )
        .action(
            "Recapture rejected evidence",
            "Replace rejected items with new captures of the same damage.",
        )
        .cite(facts, &[EVIDENCE_REJECTED_COUNT, EVIDENCE_COUNT]),
    )
}

pub fn custody_gaps(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.count(EVIDENCE_MISSING_CAPTURE_TIME_COUNT).unwrap_or(0) == 0 {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            CUSTODY_GAPS,
            Severity::Medium,
            "Evidence missing capture times",
            "Undated evidence cannot be tied to the date of loss.",
        )
        .action(
            "Record capture times",
            "Timestamps keep the chain of custody intact.",
        )
        .cite(facts, &[EVIDENCE_MISSING_CAPTURE_TIME_COUNT]),
    )
}

// ---------------------------------------------------------------------------
// Evidence mix
// ---------------------------------------------------------------------------

pub fn no_media(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if !lacks_kind(facts, EVIDENCE_MEDIA_COUNT) {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            NO_MEDIA,
            Severity::High,
            "No photo or video evidence",
            "Adjusters expect visual documentation of every damaged area.",
        )
        .action(
            "Capture photos and video",
            "Visual evidence is the baseline for any damage assessment.",
        )
        .cite(facts, &[EVIDENCE_COUNT, EVIDENCE_MEDIA_COUNT]),
    )
}

pub fn no_measurements(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if !lacks_kind(facts, EVIDENCE_MEASUREMENT_COUNT) {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            NO_MEASUREMENTS,
            Severity::Medium,
            "No measurements recorded",
            "Scope disputes are settled on measured quantities.",
        )
        .action(
            "Record damage measurements",
            "Measured areas and quantities support line-item pricing.",
        )
        .cite(facts, &[EVIDENCE_COUNT, EVIDENCE_MEASUREMENT_COUNT]),
    )
}

pub fn no_documents(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if !lacks_kind(facts, EVIDENCE_DOCUMENT_COUNT) {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            NO_DOCUMENTS,
            Severity::Low,
            "No supporting documents",
            "Receipts, estimates, and reports back up the visual record.",
        )
        .action(
            "Attach supporting documents",
            "Documents corroborate costs claimed for each line item.",
        )
        .cite(facts, &[EVIDENCE_COUNT, EVIDENCE_DOCUMENT_COUNT]),
    )
}

pub fn missing_context_evidence(
    facts: &FactSet,
    _config: &EngineConfig,
) -> Option<GuidanceCandidate> {
    if !has_evidence(facts) || facts.count(EVIDENCE_CONTEXT_TAGGED_COUNT) != Some(0) {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            MISSING_CONTEXT_EVIDENCE,
            Severity::Medium,
            "No wide-angle context evidence",
            "Close-ups without context shots are easy for a carrier to dispute.",
        )
        .action(
            "Capture context shots",
            "Wide views tie each close-up to its location on the property.",
        )
        .cite(facts, &[EVIDENCE_COUNT, EVIDENCE_CONTEXT_TAGGED_COUNT]),
    )
}
