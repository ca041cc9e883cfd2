//! Fact normalizer.
//!
//! Converts a module snapshot into the canonical `FactSet` for that module.
//! Pure: the snapshot is only borrowed, nothing is cached between calls.
//! Every module always gets the same fixed set of fact names, so rules can
//! look facts up without guarding for absence.

use chrono::{DateTime, Utc};

use crate::error::AtosError;
use crate::facts::{Fact, FactSet, FactValue};
use crate::snapshot::{
    ClaimStatus, EvidenceKind, MilestoneStatus, Record, Snapshot, VerificationStatus,
};
use crate::types::Module;

/// Canonical fact names.
pub mod names {
    pub const SNAPSHOT_PROVENANCE: &str = "snapshot-provenance";
    pub const SNAPSHOT_AS_OF: &str = "snapshot-as-of";

    pub const PROPERTY_ON_FILE: &str = "property-on-file";
    pub const PROPERTY_ADDRESS_COMPLETE: &str = "property-address-complete";
    pub const PORTFOLIO_PROPERTY_COUNT: &str = "portfolio-property-count";

    pub const EVIDENCE_COUNT: &str = "evidence-count";
    pub const EVIDENCE_VERIFIED_COUNT: &str = "evidence-verified-count";
    pub const EVIDENCE_UNVERIFIED_COUNT: &str = "evidence-unverified-count";
    pub const EVIDENCE_REJECTED_COUNT: &str = "evidence-rejected-count";
    pub const EVIDENCE_COVERAGE_RATIO: &str = "evidence-coverage-ratio";
    pub const EVIDENCE_MEDIA_COUNT: &str = "evidence-media-count";
    pub const EVIDENCE_DOCUMENT_COUNT: &str = "evidence-document-count";
    pub const EVIDENCE_MEASUREMENT_COUNT: &str = "evidence-measurement-count";
    pub const EVIDENCE_CONTEXT_TAGGED_COUNT: &str = "evidence-context-tagged-count";
    pub const EVIDENCE_MISSING_CAPTURE_TIME_COUNT: &str = "evidence-missing-capture-time-count";

    pub const CLAIM_COUNT: &str = "claim-count";
    pub const OPEN_CLAIM_COUNT: &str = "open-claim-count";
    pub const CLAIMS_IN_REVIEW_COUNT: &str = "claims-in-review-count";
    pub const CLAIMS_AWAITING_INFO_COUNT: &str = "claims-awaiting-info-count";
    pub const CLAIMS_CLAIMED_TOTAL: &str = "claims-claimed-total";
    pub const CLAIM_PAYOUT_GAP: &str = "claim-payout-gap";
    pub const SCOPE_DISCREPANCY_UNRESOLVED_COUNT: &str = "scope-discrepancy-unresolved-count";
    pub const SCOPE_DISCREPANCY_UNRESOLVED_TOTAL: &str = "scope-discrepancy-unresolved-total";
    pub const SCOPE_DISCREPANCY_LARGEST_OPEN: &str = "scope-discrepancy-largest-open";
    pub const CARRIER_INTERACTION_DAYS_SINCE_LAST: &str = "carrier-interaction-days-since-last";

    pub const MILESTONE_COUNT: &str = "milestone-count";
    pub const MILESTONE_BLOCKED_COUNT: &str = "milestone-blocked-count";
    pub const MILESTONE_IN_PROGRESS_COUNT: &str = "milestone-in-progress-count";
    pub const MILESTONE_LOWEST_PROGRESS: &str = "milestone-lowest-progress";
    pub const MILESTONE_UNVERIFIED_COMPLETION_COUNT: &str = "milestone-unverified-completion-count";
    pub const MILESTONE_VERIFIED_COUNT: &str = "milestone-verified-count";
    pub const CONTRACTOR_COUNT: &str = "contractor-count";
    pub const CONTRACTOR_LICENSE_EXPIRED_COUNT: &str = "contractor-license-expired-count";

    pub const EQUITY_OUTCOME_COUNT: &str = "equity-outcome-count";
    pub const EQUITY_REPORT_REQUESTED_COUNT: &str = "equity-report-requested-count";
    pub const EQUITY_UNVERIFIED_REPORT_COUNT: &str = "equity-unverified-report-count";
    pub const EQUITY_CLAIM_SUBMITTED_COUNT: &str = "equity-claim-submitted-count";
    pub const EQUITY_RECOVERY_RATIO: &str = "equity-recovery-ratio";
    pub const EQUITY_PROJECTED_GAIN_TOTAL: &str = "equity-projected-gain-total";
    pub const EQUITY_PAYOUT_UNRECONCILED_COUNT: &str = "equity-payout-unreconciled-count";
}

use names::*;

/// Source id used for facts describing the snapshot itself.
const SNAPSHOT_SOURCE: &str = "snapshot";

/// Normalize a snapshot into the fact set for its module.
///
/// Fails with a configuration error when `snapshot.module` is not one of
/// the known modules.
pub fn normalize(snapshot: &Snapshot) -> Result<FactSet, AtosError> {
    let module = Module::parse(&snapshot.module)
        .ok_or_else(|| AtosError::UnsupportedSnapshotModule(snapshot.module.clone()))?;

    let mut facts = FactSet::new();
    snapshot_facts(snapshot, &mut facts);

    match module {
        Module::Intelligence => {
            property_facts(snapshot, &mut facts);
            evidence_facts(snapshot, &mut facts);
            claim_facts(snapshot, &mut facts);
        }
        Module::ForensicProperty => {
            property_facts(snapshot, &mut facts);
            evidence_facts(snapshot, &mut facts);
        }
        Module::InsuranceIntelligence => {
            claim_facts(snapshot, &mut facts);
            discrepancy_facts(snapshot, &mut facts);
            carrier_facts(snapshot, &mut facts);
        }
        Module::ContractorExecution => {
            milestone_facts(snapshot, &mut facts);
            contractor_facts(snapshot, &mut facts);
        }
        Module::EquityOutcome => {
            equity_facts(snapshot, &mut facts);
        }
    }

    log::debug!("Normalized {} snapshot into {} facts", module, facts.len());
    Ok(facts)
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

fn snapshot_facts(snapshot: &Snapshot, facts: &mut FactSet) {
    facts.insert(Fact::complete(
        SNAPSHOT_PROVENANCE,
        FactValue::Text(snapshot.provenance.as_str().to_string()),
        vec![SNAPSHOT_SOURCE.to_string()],
    ));
    facts.insert(match snapshot.as_of {
        Some(ts) => Fact::complete(
            SNAPSHOT_AS_OF,
            FactValue::Text(ts.to_rfc3339()),
            vec![SNAPSHOT_SOURCE.to_string()],
        ),
        None => Fact::unknown(SNAPSHOT_AS_OF),
    });
}

fn property_facts(snapshot: &Snapshot, facts: &mut FactSet) {
    match &snapshot.property {
        Some(p) => {
            facts.insert(Fact::complete(PROPERTY_ON_FILE, FactValue::Flag(true), vec![p.id.clone()]));
            facts.insert(Fact::complete(
                PROPERTY_ADDRESS_COMPLETE,
                FactValue::Flag(p.has_complete_address()),
                vec![p.id.clone()],
            ));
        }
        None => {
            facts.insert(Fact::unknown(PROPERTY_ON_FILE));
            facts.insert(Fact::unknown(PROPERTY_ADDRESS_COMPLETE));
        }
    }
    let portfolio = ids_where(&snapshot.properties, |_| true);
    facts.insert(count_fact(PORTFOLIO_PROPERTY_COUNT, portfolio, false));
}

/// Ids of the records matching `pred`.
fn ids_where<T: Record>(records: &[T], pred: impl Fn(&T) -> bool) -> Vec<String> {
    records
        .iter()
        .filter(|r| pred(r))
        .map(|r| r.id().to_string())
        .collect()
}

fn count_fact(name: &str, ids: Vec<String>, missing: bool) -> Fact {
    Fact::measured(name, FactValue::Count(ids.len() as u64), ids, missing)
}

/// Count of records whose classifying field matched. A zero while some
/// records lack that field is not a real zero, so the fact is unknown.
fn status_count_fact(name: &str, ids: Vec<String>, missing: bool) -> Fact {
    if ids.is_empty() && missing {
        Fact::unknown(name)
    } else {
        count_fact(name, ids, missing)
    }
}

fn days_between(as_of: DateTime<Utc>, then: DateTime<Utc>) -> i64 {
    (as_of - then).num_days()
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

fn evidence_facts(snapshot: &Snapshot, facts: &mut FactSet) {
    let evidence = &snapshot.evidence;

    let all_ids = ids_where(evidence, |_| true);
    facts.insert(count_fact(EVIDENCE_COUNT, all_ids, false));

    let status_missing = evidence.iter().any(|e| e.verification_status.is_none());
    let kind_missing = evidence.iter().any(|e| e.kind.is_none());

    let verified = ids_where(evidence, |e| {
        e.verification_status == Some(VerificationStatus::Verified)
    });
    let unverified = ids_where(evidence, |e| {
        matches!(
            e.verification_status,
            Some(VerificationStatus::Unverified) | Some(VerificationStatus::Flagged)
        )
    });
    let rejected = ids_where(evidence, |e| {
        e.verification_status == Some(VerificationStatus::Rejected)
    });

    let with_status = ids_where(evidence, |e| e.verification_status.is_some());
    facts.insert(if with_status.is_empty() {
        Fact::unknown(EVIDENCE_COVERAGE_RATIO)
    } else {
        let ratio = verified.len() as f64 / with_status.len() as f64;
        Fact::measured(EVIDENCE_COVERAGE_RATIO, FactValue::Ratio(ratio), with_status, status_missing)
    });

    facts.insert(status_count_fact(EVIDENCE_VERIFIED_COUNT, verified, status_missing));
    facts.insert(status_count_fact(EVIDENCE_UNVERIFIED_COUNT, unverified, status_missing));
    facts.insert(status_count_fact(EVIDENCE_REJECTED_COUNT, rejected, status_missing));

    let media = ids_where(evidence, |e| {
        matches!(e.kind, Some(EvidenceKind::Photo) | Some(EvidenceKind::Video))
    });
    let documents = ids_where(evidence, |e| e.kind == Some(EvidenceKind::Document));
    let measurements = ids_where(evidence, |e| e.kind == Some(EvidenceKind::Measurement));
    facts.insert(status_count_fact(EVIDENCE_MEDIA_COUNT, media, kind_missing));
    facts.insert(status_count_fact(EVIDENCE_DOCUMENT_COUNT, documents, kind_missing));
    facts.insert(status_count_fact(EVIDENCE_MEASUREMENT_COUNT, measurements, kind_missing));

    let context = ids_where(evidence, |e| e.has_tag("context"));
    facts.insert(count_fact(EVIDENCE_CONTEXT_TAGGED_COUNT, context, false));

    let undated = ids_where(evidence, |e| e.captured_at.is_none());
    facts.insert(count_fact(EVIDENCE_MISSING_CAPTURE_TIME_COUNT, undated, false));
}

// ---------------------------------------------------------------------------
// Insurance
// ---------------------------------------------------------------------------

fn claim_facts(snapshot: &Snapshot, facts: &mut FactSet) {
    let claims = &snapshot.claims;
    let status_missing = claims.iter().any(|c| c.status.is_none());

    facts.insert(count_fact(CLAIM_COUNT, ids_where(claims, |_| true), false));

    let open = ids_where(claims, |c| c.status.is_some_and(|s| s.is_open()));
    let in_review = ids_where(claims, |c| c.status.is_some_and(|s| s.is_in_review()));
    let awaiting = ids_where(claims, |c| {
        c.status == Some(ClaimStatus::AdditionalInfoRequested)
    });
    facts.insert(status_count_fact(OPEN_CLAIM_COUNT, open, status_missing));
    facts.insert(status_count_fact(CLAIMS_IN_REVIEW_COUNT, in_review, status_missing));
    facts.insert(status_count_fact(CLAIMS_AWAITING_INFO_COUNT, awaiting, status_missing));

    // Claimed total over claims that carry an amount.
    let claimed: Vec<_> = claims.iter().filter(|c| c.claimed_amount.is_some()).collect();
    if claimed.is_empty() {
        facts.insert(Fact::unknown(CLAIMS_CLAIMED_TOTAL));
        facts.insert(Fact::unknown(CLAIM_PAYOUT_GAP));
        return;
    }

    let claimed_missing = claimed.len() < claims.len();
    let total: f64 = claimed.iter().filter_map(|c| c.claimed_amount).sum();
    let claimed_ids: Vec<String> = claimed.iter().map(|c| c.id.clone()).collect();
    facts.insert(Fact::measured(
        CLAIMS_CLAIMED_TOTAL,
        FactValue::Amount(total),
        claimed_ids.clone(),
        claimed_missing,
    ));

    // With no approval on file the whole claimed amount is unapproved; the
    // fact is then partial rather than unknown.
    let approved_missing = claimed.iter().any(|c| c.approved_amount.is_none());
    let gap: f64 = claimed
        .iter()
        .map(|c| {
            let claimed = c.claimed_amount.unwrap_or(0.0);
            let approved = c.approved_amount.unwrap_or(0.0);
            (claimed - approved).max(0.0)
        })
        .sum();
    facts.insert(Fact::measured(
        CLAIM_PAYOUT_GAP,
        FactValue::Amount(gap),
        claimed_ids,
        approved_missing || claimed_missing,
    ));
}

fn discrepancy_facts(snapshot: &Snapshot, facts: &mut FactSet) {
    let discrepancies = &snapshot.scope_discrepancies;
    if discrepancies.is_empty() {
        facts.insert(Fact::unknown(SCOPE_DISCREPANCY_UNRESOLVED_COUNT));
        facts.insert(Fact::unknown(SCOPE_DISCREPANCY_UNRESOLVED_TOTAL));
        facts.insert(Fact::unknown(SCOPE_DISCREPANCY_LARGEST_OPEN));
        return;
    }

    let open: Vec<_> = discrepancies.iter().filter(|d| !d.resolved).collect();
    let open_ids: Vec<String> = open.iter().map(|d| d.id.clone()).collect();
    facts.insert(count_fact(SCOPE_DISCREPANCY_UNRESOLVED_COUNT, open_ids, false));

    let valued: Vec<(&str, f64)> = open
        .iter()
        .filter_map(|d| match (d.forensic_value_usd, d.carrier_value_usd) {
            (Some(forensic), Some(carrier)) => Some((d.id.as_str(), forensic - carrier)),
            _ => None,
        })
        .collect();
    let values_missing = valued.len() < open.len();

    if !open.is_empty() && valued.is_empty() {
        facts.insert(Fact::unknown(SCOPE_DISCREPANCY_UNRESOLVED_TOTAL));
        facts.insert(Fact::unknown(SCOPE_DISCREPANCY_LARGEST_OPEN));
        return;
    }

    let total: f64 = valued.iter().map(|(_, delta)| delta).sum();
    facts.insert(Fact::measured(
        SCOPE_DISCREPANCY_UNRESOLVED_TOTAL,
        FactValue::Amount(total),
        valued.iter().map(|(id, _)| id.to_string()).collect(),
        values_missing,
    ));

    // Largest open delta; ties go to the lower id so the pick is stable.
    let largest = valued.iter().copied().fold(None::<(&str, f64)>, |best, cur| match best {
        Some(b) if b.1 > cur.1 || (b.1 == cur.1 && b.0 <= cur.0) => Some(b),
        _ => Some(cur),
    });
    facts.insert(match largest {
        Some((id, delta)) => Fact::measured(
            SCOPE_DISCREPANCY_LARGEST_OPEN,
            FactValue::Amount(delta),
            vec![id.to_string()],
            values_missing,
        ),
        None => Fact::unknown(SCOPE_DISCREPANCY_LARGEST_OPEN),
    });
}

fn carrier_facts(snapshot: &Snapshot, facts: &mut FactSet) {
    let interactions = &snapshot.carrier_interactions;
    let latest = interactions
        .iter()
        .filter_map(|i| i.occurred_at.map(|ts| (ts, i.id.as_str())))
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)));

    let fact = match (snapshot.as_of, latest) {
        (Some(as_of), Some((ts, id))) => {
            let undated = interactions.iter().any(|i| i.occurred_at.is_none());
            Fact::measured(
                CARRIER_INTERACTION_DAYS_SINCE_LAST,
                FactValue::Days(days_between(as_of, ts)),
                vec![id.to_string()],
                undated,
            )
        }
        _ => Fact::unknown(CARRIER_INTERACTION_DAYS_SINCE_LAST),
    };
    facts.insert(fact);
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

fn milestone_facts(snapshot: &Snapshot, facts: &mut FactSet) {
    let milestones = &snapshot.milestones;
    let status_missing = milestones.iter().any(|m| m.status.is_none());

    facts.insert(count_fact(MILESTONE_COUNT, ids_where(milestones, |_| true), false));

    let blocked = ids_where(milestones, |m| m.status == Some(MilestoneStatus::Blocked));
    facts.insert(status_count_fact(MILESTONE_BLOCKED_COUNT, blocked, status_missing));

    let in_progress: Vec<_> = milestones
        .iter()
        .filter(|m| m.status == Some(MilestoneStatus::InProgress))
        .collect();
    facts.insert(count_fact(
        MILESTONE_IN_PROGRESS_COUNT,
        in_progress.iter().map(|m| m.id.clone()).collect(),
        status_missing,
    ));
    let progress_missing = in_progress.iter().any(|m| m.percent_complete.is_none());
    let lowest = in_progress
        .iter()
        .filter_map(|m| m.percent_complete.map(|p| (p, m.id.as_str())))
        .min_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    facts.insert(match lowest {
        Some((pct, mid)) => Fact::measured(
            MILESTONE_LOWEST_PROGRESS,
            FactValue::Percent(pct),
            vec![mid.to_string()],
            progress_missing,
        ),
        None => Fact::unknown(MILESTONE_LOWEST_PROGRESS),
    });

    let completed: Vec<_> = milestones
        .iter()
        .filter(|m| m.status == Some(MilestoneStatus::Completed))
        .collect();
    let verification_missing = completed.iter().any(|m| m.verified.is_none());
    let unverified: Vec<String> = completed
        .iter()
        .filter(|m| m.verified == Some(false))
        .map(|m| m.id.clone())
        .collect();
    facts.insert(status_count_fact(
        MILESTONE_UNVERIFIED_COMPLETION_COUNT,
        unverified,
        verification_missing,
    ));

    let verified = ids_where(milestones, |m| m.verified == Some(true));
    facts.insert(count_fact(MILESTONE_VERIFIED_COUNT, verified, false));
}

fn contractor_facts(snapshot: &Snapshot, facts: &mut FactSet) {
    let contractors = &snapshot.contractors;
    facts.insert(count_fact(CONTRACTOR_COUNT, ids_where(contractors, |_| true), false));

    let fact = match snapshot.as_of {
        Some(as_of) if !contractors.is_empty() => {
            let today = as_of.date_naive();
            let expired = ids_where(contractors, |c| {
                c.license_expires_on.is_some_and(|d| d < today)
            });
            let undated = contractors.iter().any(|c| c.license_expires_on.is_none());
            count_fact(CONTRACTOR_LICENSE_EXPIRED_COUNT, expired, undated)
        }
        _ => Fact::unknown(CONTRACTOR_LICENSE_EXPIRED_COUNT),
    };
    facts.insert(fact);
}

// ---------------------------------------------------------------------------
// Equity
// ---------------------------------------------------------------------------

fn equity_facts(snapshot: &Snapshot, facts: &mut FactSet) {
    let outcomes = &snapshot.equity_outcomes;
    facts.insert(count_fact(EQUITY_OUTCOME_COUNT, ids_where(outcomes, |_| true), false));

    let requested: Vec<_> = outcomes.iter().filter(|o| o.report_requested).collect();
    facts.insert(count_fact(
        EQUITY_REPORT_REQUESTED_COUNT,
        requested.iter().map(|o| o.id.clone()).collect(),
        false,
    ));
    let verification_missing = requested.iter().any(|o| o.is_verified.is_none());
    let unverified: Vec<String> = requested
        .iter()
        .filter(|o| o.is_verified == Some(false))
        .map(|o| o.id.clone())
        .collect();
    facts.insert(status_count_fact(
        EQUITY_UNVERIFIED_REPORT_COUNT,
        unverified,
        verification_missing,
    ));

    let paired: Vec<_> = outcomes
        .iter()
        .filter(|o| o.claim_submitted_usd.is_some_and(|s| s > 0.0))
        .collect();
    let submitted_missing = outcomes.iter().any(|o| o.claim_submitted_usd.is_none());
    facts.insert(count_fact(
        EQUITY_CLAIM_SUBMITTED_COUNT,
        paired.iter().map(|o| o.id.clone()).collect(),
        submitted_missing,
    ));
    let payout_missing = paired.iter().any(|o| o.payout_received_usd.is_none());
    let reported: Vec<_> = paired.iter().filter(|o| o.payout_received_usd.is_some()).collect();
    facts.insert(if reported.is_empty() {
        Fact::unknown(EQUITY_RECOVERY_RATIO)
    } else {
        let submitted: f64 = reported.iter().filter_map(|o| o.claim_submitted_usd).sum();
        let received: f64 = reported.iter().filter_map(|o| o.payout_received_usd).sum();
        Fact::measured(
            EQUITY_RECOVERY_RATIO,
            FactValue::Ratio(received / submitted),
            reported.iter().map(|o| o.id.clone()).collect(),
            payout_missing,
        )
    });

    let projected: Vec<_> = outcomes
        .iter()
        .filter(|o| o.projected_equity_gain_usd.is_some())
        .collect();
    facts.insert(if projected.is_empty() {
        Fact::unknown(EQUITY_PROJECTED_GAIN_TOTAL)
    } else {
        let total: f64 = projected.iter().filter_map(|o| o.projected_equity_gain_usd).sum();
        Fact::measured(
            EQUITY_PROJECTED_GAIN_TOTAL,
            FactValue::Amount(total),
            projected.iter().map(|o| o.id.clone()).collect(),
            projected.len() < outcomes.len(),
        )
    });

    let unreconciled: Vec<String> = projected
        .iter()
        .filter(|o| o.payout_received_usd.is_none())
        .map(|o| o.id.clone())
        .collect();
    facts.insert(count_fact(EQUITY_PAYOUT_UNRECONCILED_COUNT, unreconciled, false));
}
