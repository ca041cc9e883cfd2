//! Grounding classifier.
//!
//! Turns a rule candidate into a `GuidanceItem` with a confidence label.
//! Only the label is decided here; severity, wording and actions pass
//! through untouched.

use crate::facts::{Completeness, FactCitation, FactSet};
use crate::rules::GuidanceCandidate;
use crate::types::{ConfidenceLabel, GuidanceItem, Provenance};

/// Label a candidate and resolve its citations against the invocation's
/// fact set.
pub fn classify(
    candidate: GuidanceCandidate,
    facts: &FactSet,
    provenance: Provenance,
) -> GuidanceItem {
    // Cite from the fact set itself so an item can never carry a value the
    // normalizer did not produce.
    let grounded_facts: Vec<FactCitation> = candidate
        .cited
        .iter()
        .filter_map(|cited| facts.get(&cited.name).map(FactCitation::from))
        .collect();

    let confidence_label = label_for(&grounded_facts, provenance);

    GuidanceItem {
        id: candidate.id,
        severity: candidate.severity,
        kind: candidate.kind,
        title: candidate.title,
        why_this_matters: candidate.why_this_matters,
        grounded_facts,
        recommended_actions: candidate.recommended_actions,
        confidence_label,
    }
}

fn label_for(citations: &[FactCitation], provenance: Provenance) -> ConfidenceLabel {
    if provenance == Provenance::Stub || citations.is_empty() {
        return ConfidenceLabel::InsufficientEvidence;
    }
    if citations
        .iter()
        .any(|c| c.completeness == Completeness::Unknown)
    {
        return ConfidenceLabel::InsufficientEvidence;
    }
    if citations
        .iter()
        .all(|c| c.completeness == Completeness::Complete)
    {
        ConfidenceLabel::Grounded
    } else {
        ConfidenceLabel::Partial
    }
}

/// Response-level label: the weakest item label. A stub snapshot is always
/// insufficient; a live snapshot with nothing to report is grounded.
pub fn overall_label(items: &[GuidanceItem], provenance: Provenance) -> ConfidenceLabel {
    if provenance == Provenance::Stub {
        return ConfidenceLabel::InsufficientEvidence;
    }
    items
        .iter()
        .map(|item| item.confidence_label)
        .min()
        .unwrap_or(ConfidenceLabel::Grounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{Fact, FactValue};
    use crate::types::Severity;

    fn test_facts() -> FactSet {
        let mut facts = FactSet::new();
        facts.insert(Fact::complete("claims-claimed-total", FactValue::Amount(188_300.0), vec!["clm-1".into()]));
        facts.insert(Fact::partial("claim-payout-gap", FactValue::Amount(188_300.0), vec!["clm-1".into()]));
        facts.insert(Fact::complete("claim-count", FactValue::Count(1), vec!["clm-1".into()]));
        facts.insert(Fact::unknown("property-on-file"));
        facts
    }

    fn candidate(facts: &FactSet, cite: &[&str]) -> GuidanceCandidate {
        GuidanceCandidate::risk("payout-shortfall", Severity::High, "Shortfall", "Money.")
            .action("Prepare a supplement", "Recover the gap.")
            .cite(facts, cite)
    }

    #[test]
    fn test_all_complete_is_grounded() {
        let facts = test_facts();
        let item = classify(candidate(&facts, &["claim-count"]), &facts, Provenance::Live);
        assert_eq!(item.confidence_label, ConfidenceLabel::Grounded);
    }

    #[test]
    fn test_mixed_completeness_is_partial() {
        let facts = test_facts();
        let item = classify(
            candidate(&facts, &["claims-claimed-total", "claim-payout-gap"]),
            &facts,
            Provenance::Live,
        );
        assert_eq!(item.confidence_label, ConfidenceLabel::Partial);
        assert_eq!(item.severity, Severity::High);
        assert_eq!(item.recommended_actions.len(), 1);
        assert_eq!(item.grounded_facts[1].fact, "claim-payout-gap");
    }

    #[test]
    fn test_unknown_fact_is_insufficient() {
        let facts = test_facts();
        let item = classify(
            candidate(&facts, &["claim-count", "property-on-file"]),
            &facts,
            Provenance::Live,
        );
        assert_eq!(item.confidence_label, ConfidenceLabel::InsufficientEvidence);
    }

    #[test]
    fn test_stub_is_always_insufficient() {
        let facts = test_facts();
        let item = classify(candidate(&facts, &["claim-count"]), &facts, Provenance::Stub);
        assert_eq!(item.confidence_label, ConfidenceLabel::InsufficientEvidence);
    }

    #[test]
    fn test_citations_come_from_fact_set() {
        let facts = test_facts();
        let mut forged = candidate(&facts, &["claim-count"]);
        forged.cited[0].value = FactValue::Count(99);
        forged.cited.push(Fact::complete("made-up", FactValue::Count(1), vec![]));

        let item = classify(forged, &facts, Provenance::Live);
        assert_eq!(item.grounded_facts.len(), 1);
        assert_eq!(item.grounded_facts[0].value, FactValue::Count(1));
    }

    #[test]
    fn test_overall_label_is_weakest() {
        let facts = test_facts();
        let grounded = classify(candidate(&facts, &["claim-count"]), &facts, Provenance::Live);
        let partial = classify(
            candidate(&facts, &["claims-claimed-total", "claim-payout-gap"]),
            &facts,
            Provenance::Live,
        );
        assert_eq!(
            overall_label(&[grounded.clone(), partial], Provenance::Live),
            ConfidenceLabel::Partial
        );
        assert_eq!(overall_label(&[grounded], Provenance::Live), ConfidenceLabel::Grounded);
        assert_eq!(overall_label(&[], Provenance::Live), ConfidenceLabel::Grounded);
        assert_eq!(overall_label(&[], Provenance::Stub), ConfidenceLabel::InsufficientEvidence);
    }
}
