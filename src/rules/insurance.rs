//! Insurance-intelligence rules: payout gaps, carrier follow-up and scope
//! disputes.

use crate::config::EngineConfig;
use crate::facts::FactSet;
use crate::normalizer::names::*;
use crate::types::Severity;

use super::{GuidanceCandidate, RuleCatalogue, Topic};

pub const PAYOUT_SHORTFALL: &str = "payout-shortfall";
pub const STALE_CARRIER_INTERACTION: &str = "stale-carrier-interaction";
pub const CLAIMS_AWAITING_INFO: &str = "claims-awaiting-info";
pub const UNRESOLVED_SCOPE_DISCREPANCIES: &str = "unresolved-scope-discrepancies";
pub const LARGEST_DELTA_FOCUS: &str = "largest-delta-focus";

pub fn register(catalogue: &mut RuleCatalogue) {
    catalogue.register(PAYOUT_SHORTFALL, &[Topic::Claims], payout_shortfall);
    catalogue.register(
        STALE_CARRIER_INTERACTION,
        &[Topic::Carrier, Topic::Claims],
        stale_carrier_interaction,
    );
    catalogue.register(
        CLAIMS_AWAITING_INFO,
        &[Topic::Claims, Topic::Carrier],
        claims_awaiting_info,
    );
    catalogue.register(
        UNRESOLVED_SCOPE_DISCREPANCIES,
        &[Topic::Scope],
        unresolved_scope_discrepancies,
    );
    catalogue.register(LARGEST_DELTA_FOCUS, &[Topic::Scope], largest_delta_focus);
}

// ---------------------------------------------------------------------------
// Payout
// ---------------------------------------------------------------------------

/// Claimed minus approved exceeds the configured threshold. Missing
/// approvals count as zero approved, which leaves the gap partial.
pub fn payout_shortfall(facts: &FactSet, config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.count(CLAIM_COUNT).unwrap_or(0) == 0 {
        return None;
    }
    let over_threshold = match facts.amount(CLAIM_PAYOUT_GAP) {
        Some(gap) => gap > config.payout_shortfall_threshold_usd,
        // Claims exist but none carries a claimed amount.
        None => true,
    };
    if !over_threshold {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            PAYOUT_SHORTFALL,
            Severity::High,
            "Approved payout trails the claimed amount",
            "Unrecovered claim value comes straight out of the owner's repair budget.",
        )
        .action(
            "Prepare a supplement",
            "Document the unapproved line items and resubmit with supporting evidence.",
        )
        .action(
            "Request the carrier's approval breakdown",
            "Line-level approvals show where the shortfall sits.",
        )
        .cite(facts, &[CLAIMS_CLAIMED_TOTAL, CLAIM_PAYOUT_GAP]),
    )
}

// ---------------------------------------------------------------------------
// Carrier
// ---------------------------------------------------------------------------

/// No carrier contact within the configured window while a claim is open.
/// An open claim with no dated interaction at all is raised as well, as are
/// claims whose status is missing.
pub fn stale_carrier_interaction(
    facts: &FactSet,
    config: &EngineConfig,
) -> Option<GuidanceCandidate> {
    if facts.count(OPEN_CLAIM_COUNT) == Some(0) {
        return None;
    }
    let stale = match facts.days(CARRIER_INTERACTION_DAYS_SINCE_LAST) {
        Some(days) => days > config.stale_interaction_days,
        None => true,
    };
    if !stale {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            STALE_CARRIER_INTERACTION,
            Severity::Medium,
            "Carrier follow-up is overdue",
            "Quiet claims drift; carriers prioritize files with active follow-up.",
        )
        .action(
            "Contact the assigned adjuster",
            "Log the call or email so the follow-up clock resets.",
        )
        .cite(facts, &[OPEN_CLAIM_COUNT, CARRIER_INTERACTION_DAYS_SINCE_LAST]),
    )
}

pub fn claims_awaiting_info(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.count(CLAIMS_AWAITING_INFO_COUNT) == Some(0) {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            CLAIMS_AWAITING_INFO,
            Severity::High,
            "Carrier is waiting on information",
            "Claims stall until the requested information is supplied.",
        )
        .action(
            "Answer the carrier's information request",
            "The review clock does not restart until the carrier has what it asked for.",
        )
        .cite(facts, &[CLAIMS_AWAITING_INFO_COUNT, CLAIM_COUNT]),
    )
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// Open discrepancies where the forensic scope exceeds the carrier's.
pub fn unresolved_scope_discrepancies(
    facts: &FactSet,
    _config: &EngineConfig,
) -> Option<GuidanceCandidate> {
    if facts.count(SCOPE_DISCREPANCY_UNRESOLVED_COUNT).unwrap_or(0) == 0 {
        return None;
    }
    let disputed = match facts.amount(SCOPE_DISCREPANCY_UNRESOLVED_TOTAL) {
        Some(total) => total > 0.0,
        None => true,
    };
    if !disputed {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            UNRESOLVED_SCOPE_DISCREPANCIES,
            Severity::High,
            "Scope discrepancies are unresolved",
            "Every open line item is value the carrier has not agreed to pay.",
        )
        .action(
            "Reconcile scope line items",
            "Walk the carrier through forensic findings item by item.",
        )
        .cite(
            facts,
            &[SCOPE_DISCREPANCY_UNRESOLVED_COUNT, SCOPE_DISCREPANCY_UNRESOLVED_TOTAL],
        ),
    )
}

pub fn largest_delta_focus(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.amount(SCOPE_DISCREPANCY_LARGEST_OPEN).unwrap_or(0.0) <= 0.0 {
        return None;
    }
    Some(
        GuidanceCandidate::opportunity(
            LARGEST_DELTA_FOCUS,
            Severity::Low,
            "Largest scope gap is the best lever",
            "Resolving the biggest open discrepancy recovers the most value per negotiation.",
        )
        .action(
            "Lead negotiation with the largest discrepancy",
            "Concentrate evidence on the line item with the widest gap.",
        )
        .cite(facts, &[SCOPE_DISCREPANCY_LARGEST_OPEN]),
    )
}
