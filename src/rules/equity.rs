//! Equity-outcome rules: recovery versus claim and the equity story told
//! to owners and lenders.

use crate::config::EngineConfig;
use crate::facts::FactSet;
use crate::normalizer::names::*;
use crate::types::Severity;

use super::{GuidanceCandidate, RuleCatalogue, Topic};

pub const UNVERIFIED_EQUITY_NARRATIVE: &str = "unverified-equity-narrative";
pub const RECOVERY_GAP: &str = "recovery-gap";
pub const UNRECONCILED_PAYOUT: &str = "unreconciled-payout";
pub const EQUITY_GAIN: &str = "equity-gain";

pub fn register(catalogue: &mut RuleCatalogue) {
    catalogue.register(
        UNVERIFIED_EQUITY_NARRATIVE,
        &[Topic::Equity, Topic::Data],
        unverified_equity_narrative,
    );
    catalogue.register(RECOVERY_GAP, &[Topic::Equity, Topic::Claims], recovery_gap);
    catalogue.register(UNRECONCILED_PAYOUT, &[Topic::Equity], unreconciled_payout);
    catalogue.register(EQUITY_GAIN, &[Topic::Equity], equity_gain);
}

/// A report was requested on an outcome that has not been verified, or
/// whose verification is not recorded.
pub fn unverified_equity_narrative(
    facts: &FactSet,
    _config: &EngineConfig,
) -> Option<GuidanceCandidate> {
    if facts.count(EQUITY_REPORT_REQUESTED_COUNT).unwrap_or(0) == 0 {
        return None;
    }
    if facts.count(EQUITY_UNVERIFIED_REPORT_COUNT) == Some(0) {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            UNVERIFIED_EQUITY_NARRATIVE,
            Severity::Medium,
            "Equity report requested on unverified outcome",
            "Reports built on unverified figures can overstate recovered equity.",
        )
        .action(
            "Verify the outcome before issuing the report",
            "Confirm payout and valuation figures against source records.",
        )
        .cite(facts, &[EQUITY_UNVERIFIED_REPORT_COUNT, EQUITY_REPORT_REQUESTED_COUNT]),
    )
}

/// Payout received over claim submitted is under the configured floor.
/// Raised when claims were submitted but no payout is recorded yet.
pub fn recovery_gap(facts: &FactSet, config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.count(EQUITY_CLAIM_SUBMITTED_COUNT).unwrap_or(0) == 0 {
        return None;
    }
    let short = match facts.ratio(EQUITY_RECOVERY_RATIO) {
        Some(ratio) => ratio < config.recovery_ratio_floor,
        None => true,
    };
    if !short {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            RECOVERY_GAP,
            Severity::High,
            "Recovered payout is well below the claim",
            "A low recovery ratio erodes the equity the restoration was meant to protect.",
        )
        .action(
            "Review the claim for supplement or appeal",
            "Unrecovered value may still be recoverable with additional evidence.",
        )
        .cite(facts, &[EQUITY_RECOVERY_RATIO, EQUITY_CLAIM_SUBMITTED_COUNT]),
    )
}

/// Projected gain reported without a payout on file to back it.
pub fn unreconciled_payout(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.count(EQUITY_PAYOUT_UNRECONCILED_COUNT).unwrap_or(0) == 0 {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            UNRECONCILED_PAYOUT,
            Severity::Medium,
            "Projected gain has no payout on file",
            "Projections without a recorded payout may be overstated.",
        )
        .action(
            "Record the payout received",
            "Reconcile projected equity against actual carrier payments.",
        )
        .cite(facts, &[EQUITY_PAYOUT_UNRECONCILED_COUNT]),
    )
}

pub fn equity_gain(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.amount(EQUITY_PROJECTED_GAIN_TOTAL).unwrap_or(0.0) <= 0.0 {
        return None;
    }
    Some(
        GuidanceCandidate::opportunity(
            EQUITY_GAIN,
            Severity::Low,
            "Projected equity gain",
            "A documented gain supports refinancing and resale conversations.",
        )
        .action(
            "Share the equity outcome with the owner",
            "A verified gain is the clearest measure of the restoration's value.",
        )
        .cite(facts, &[EQUITY_PROJECTED_GAIN_TOTAL]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{Completeness, FactValue};
    use crate::normalizer::normalize;
    use crate::snapshot::test_utils::*;
    use crate::types::{GuidanceKind, Module};

    #[test]
    fn test_unverified_narrative_needs_report_request() {
        let mut snap = live(Module::EquityOutcome);
        let mut eq = outcome("eq-1", Some(100_000.0), Some(90_000.0));
        eq.is_verified = Some(false);
        snap.equity_outcomes = vec![eq];
        let facts = normalize(&snap).unwrap();
        assert!(unverified_equity_narrative(&facts, &EngineConfig::default()).is_none());

        snap.equity_outcomes[0].report_requested = true;
        let facts = normalize(&snap).unwrap();
        let candidate = unverified_equity_narrative(&facts, &EngineConfig::default()).unwrap();
        assert_eq!(candidate.severity, Severity::Medium);
        assert_eq!(candidate.cited[0].sources, vec!["eq-1"]);
    }

    #[test]
    fn test_recovery_gap() {
        let mut snap = live(Module::EquityOutcome);
        snap.equity_outcomes = vec![
            outcome("eq-1", Some(100_000.0), Some(60_000.0)),
            outcome("eq-2", Some(100_000.0), Some(80_000.0)),
        ];
        let facts = normalize(&snap).unwrap();
        let candidate = recovery_gap(&facts, &EngineConfig::default()).unwrap();
        assert_eq!(candidate.cited[0].value, FactValue::Ratio(0.7));

        let mut config = EngineConfig::default();
        config.recovery_ratio_floor = 0.6;
        assert!(recovery_gap(&facts, &config).is_none());
    }

    #[test]
    fn test_projected_gain_rules() {
        let mut snap = live(Module::EquityOutcome);
        let mut eq = outcome("eq-1", Some(50_000.0), None);
        eq.projected_equity_gain_usd = Some(42_000.0);
        snap.equity_outcomes = vec![eq];
        let facts = normalize(&snap).unwrap();
        let config = EngineConfig::default();

        let gain = equity_gain(&facts, &config).unwrap();
        assert_eq!(gain.kind, GuidanceKind::Opportunity);
        assert!(unreconciled_payout(&facts, &config).is_some());
        // Submitted with no payout yet: the gap is raised on an unknown ratio.
        let gap = recovery_gap(&facts, &config).unwrap();
        assert_eq!(gap.cited[0].completeness, Completeness::Unknown);
        assert_eq!(gap.cited[1].sources, vec!["eq-1"]);
    }

    #[test]
    fn test_missing_verification_raises_narrative() {
        let mut snap = live(Module::EquityOutcome);
        let mut eq = outcome("eq-1", Some(100_000.0), Some(90_000.0));
        eq.report_requested = true;
        eq.is_verified = None;
        snap.equity_outcomes = vec![eq];
        let facts = normalize(&snap).unwrap();
        let config = EngineConfig::default();

        let candidate = unverified_equity_narrative(&facts, &config).expect("narrative rule raised");
        assert_eq!(candidate.cited[0].completeness, Completeness::Unknown);
        assert_eq!(candidate.cited[1].sources, vec!["eq-1"]);
        assert!(recovery_gap(&facts, &config).is_none());
    }

    #[test]
    fn test_recovery_gap_needs_submitted_claim() {
        let mut snap = live(Module::EquityOutcome);
        snap.equity_outcomes = vec![outcome("eq-1", None, Some(20_000.0))];
        let facts = normalize(&snap).unwrap();
        assert!(recovery_gap(&facts, &EngineConfig::default()).is_none());
    }

    #[test]
    fn test_no_outcomes_no_items() {
        let facts = normalize(&live(Module::EquityOutcome)).unwrap();
        let config = EngineConfig::default();
        assert!(unverified_equity_narrative(&facts, &config).is_none());
        assert!(recovery_gap(&facts, &config).is_none());
        assert!(unreconciled_payout(&facts, &config).is_none());
        assert!(equity_gain(&facts, &config).is_none());
    }
}
