//! Contractor-execution rules: milestone progress and contractor compliance.

use crate::config::EngineConfig;
use crate::facts::FactSet;
use crate::normalizer::names::*;
use crate::types::Severity;

use super::{GuidanceCandidate, RuleCatalogue, Topic};

pub const BLOCKED_MILESTONE: &str = "blocked-milestone";
pub const LOW_PROGRESS: &str = "low-progress";
pub const UNVERIFIED_COMPLETION: &str = "unverified-completion";
pub const EXPIRED_CONTRACTOR_LICENSE: &str = "expired-contractor-license";
pub const VERIFIED_CHECKPOINTS: &str = "verified-checkpoints";

pub fn register(catalogue: &mut RuleCatalogue) {
    catalogue.register(BLOCKED_MILESTONE, &[Topic::Execution], blocked_milestone);
    catalogue.register(LOW_PROGRESS, &[Topic::Execution], low_progress);
    catalogue.register(
        UNVERIFIED_COMPLETION,
        &[Topic::Execution, Topic::Compliance],
        unverified_completion,
    );
    catalogue.register(
        EXPIRED_CONTRACTOR_LICENSE,
        &[Topic::Compliance],
        expired_contractor_license,
    );
    catalogue.register(VERIFIED_CHECKPOINTS, &[Topic::Execution], verified_checkpoints);
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

/// Any milestone blocked. Inapplicable when no milestones exist; raised
/// when milestones exist but their status is missing.
pub fn blocked_milestone(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.count(MILESTONE_COUNT).unwrap_or(0) == 0 {
        return None;
    }
    if facts.count(MILESTONE_BLOCKED_COUNT) == Some(0) {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            BLOCKED_MILESTONE,
            Severity::High,
            "Milestone blocked",
            "A blocked milestone holds up every dependent trade and the draw schedule.",
        )
        .action(
            "Clear the blocker with the contractor",
            "Agree an owner and a date for the blocking issue.",
        )
        .cite(facts, &[MILESTONE_COUNT, MILESTONE_BLOCKED_COUNT]),
    )
}

/// Lowest in-progress milestone is under the configured percent. Raised
/// when milestones are in progress but none reports a percent.
pub fn low_progress(facts: &FactSet, config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.count(MILESTONE_IN_PROGRESS_COUNT).unwrap_or(0) == 0 {
        return None;
    }
    let behind = match facts.percent(MILESTONE_LOWEST_PROGRESS) {
        Some(lowest) => lowest < config.low_progress_percent,
        None => true,
    };
    if !behind {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            LOW_PROGRESS,
            Severity::Medium,
            "Milestone progress is behind",
            "Slow milestones push out completion and tie up recovered funds.",
        )
        .action(
            "Review the schedule with the contractor",
            "Confirm crew and materials for the lagging milestone.",
        )
        .cite(facts, &[MILESTONE_LOWEST_PROGRESS, MILESTONE_IN_PROGRESS_COUNT]),
    )
}

pub fn unverified_completion(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.count(MILESTONE_UNVERIFIED_COMPLETION_COUNT) == Some(0) {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            UNVERIFIED_COMPLETION,
            Severity::Medium,
            "Completed work is unverified",
            "Payment for unverified work is hard to claw back if the work falls short.",
        )
        .action(
            "Schedule a completion inspection",
            "Verify finished milestones before releasing payment.",
        )
        .cite(facts, &[MILESTONE_UNVERIFIED_COMPLETION_COUNT, MILESTONE_COUNT]),
    )
}

pub fn verified_checkpoints(facts: &FactSet, _config: &EngineConfig) -> Option<GuidanceCandidate> {
    if facts.count(MILESTONE_VERIFIED_COUNT).unwrap_or(0) == 0 {
        return None;
    }
    Some(
        GuidanceCandidate::opportunity(
            VERIFIED_CHECKPOINTS,
            Severity::Low,
            "Verified checkpoints support the next draw",
            "Verified milestones are the strongest basis for a payment request.",
        )
        .action(
            "Request the next draw",
            "Cite the verified milestones in the draw request.",
        )
        .cite(facts, &[MILESTONE_VERIFIED_COUNT]),
    )
}

// ---------------------------------------------------------------------------
// Compliance
// ---------------------------------------------------------------------------

/// A contractor's license lapsed before the snapshot date.
pub fn expired_contractor_license(
    facts: &FactSet,
    _config: &EngineConfig,
) -> Option<GuidanceCandidate> {
    if facts.count(CONTRACTOR_COUNT).unwrap_or(0) == 0 {
        return None;
    }
    let expired = match facts.count(CONTRACTOR_LICENSE_EXPIRED_COUNT) {
        Some(n) => n > 0,
        // Contractors on file but no reference date to check against.
        None => true,
    };
    if !expired {
        return None;
    }
    Some(
        GuidanceCandidate::risk(
            EXPIRED_CONTRACTOR_LICENSE,
            Severity::Critical,
            "Contractor license expired",
            "Work by an unlicensed contractor can void permits and insurance coverage.",
        )
        .action(
            "Pause work pending license renewal",
            "Obtain a current license before the contractor continues.",
        )
        .cite(facts, &[CONTRACTOR_COUNT, CONTRACTOR_LICENSE_EXPIRED_COUNT]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::Completeness;
    use crate::normalizer::normalize;
    use crate::snapshot::test_utils::*;
    use crate::snapshot::MilestoneStatus;
    use crate::types::Module;

    #[test]
    fn test_zero_milestones_no_blocked_item() {
        let facts = normalize(&live(Module::ContractorExecution)).unwrap();
        let config = EngineConfig::default();
        assert!(blocked_milestone(&facts, &config).is_none());
        assert!(low_progress(&facts, &config).is_none());
        assert!(unverified_completion(&facts, &config).is_none());
        assert!(verified_checkpoints(&facts, &config).is_none());
    }

    #[test]
    fn test_blocked_milestone() {
        let mut snap = live(Module::ContractorExecution);
        snap.milestones = vec![
            milestone("ms-1", MilestoneStatus::Blocked, Some(10.0)),
            milestone("ms-2", MilestoneStatus::InProgress, Some(70.0)),
        ];
        let facts = normalize(&snap).unwrap();
        let candidate = blocked_milestone(&facts, &EngineConfig::default()).unwrap();
        assert_eq!(candidate.severity, Severity::High);
        assert_eq!(candidate.cited[1].sources, vec!["ms-1"]);
        // Blocked milestones are not "in progress", so 70% is the lowest.
        assert!(low_progress(&facts, &EngineConfig::default()).is_none());
    }

    #[test]
    fn test_low_progress_threshold() {
        let mut snap = live(Module::ContractorExecution);
        snap.milestones = vec![milestone("ms-1", MilestoneStatus::InProgress, Some(35.0))];
        let facts = normalize(&snap).unwrap();
        assert!(low_progress(&facts, &EngineConfig::default()).is_some());

        let mut config = EngineConfig::default();
        config.low_progress_percent = 30.0;
        assert!(low_progress(&facts, &config).is_none());
    }

    #[test]
    fn test_completion_verification() {
        let mut snap = live(Module::ContractorExecution);
        let mut verified = milestone("ms-2", MilestoneStatus::Completed, Some(100.0));
        verified.verified = Some(true);
        snap.milestones = vec![
            milestone("ms-1", MilestoneStatus::Completed, Some(100.0)),
            verified,
        ];
        let facts = normalize(&snap).unwrap();
        let config = EngineConfig::default();

        let unverified = unverified_completion(&facts, &config).unwrap();
        assert_eq!(unverified.cited[0].sources, vec!["ms-1"]);
        let checkpoints = verified_checkpoints(&facts, &config).unwrap();
        assert_eq!(checkpoints.cited[0].sources, vec!["ms-2"]);
    }

    #[test]
    fn test_missing_status_raises_blocked_milestone() {
        let mut snap = live(Module::ContractorExecution);
        let mut no_status = milestone("ms-1", MilestoneStatus::Blocked, Some(10.0));
        no_status.status = None;
        snap.milestones = vec![no_status];
        let facts = normalize(&snap).unwrap();
        let config = EngineConfig::default();

        let candidate = blocked_milestone(&facts, &config).expect("blocked-milestone raised");
        assert_eq!(candidate.cited[0].sources, vec!["ms-1"]);
        assert_eq!(candidate.cited[1].completeness, Completeness::Unknown);
        // No milestone is known to be in progress.
        assert!(low_progress(&facts, &config).is_none());
    }

    #[test]
    fn test_missing_percent_raises_low_progress() {
        let mut snap = live(Module::ContractorExecution);
        snap.milestones = vec![milestone("ms-1", MilestoneStatus::InProgress, None)];
        let facts = normalize(&snap).unwrap();
        let candidate = low_progress(&facts, &EngineConfig::default()).expect("low-progress raised");
        assert_eq!(candidate.cited[0].completeness, Completeness::Unknown);
        assert_eq!(candidate.cited[1].sources, vec!["ms-1"]);
    }

    #[test]
    fn test_missing_verification_raises_unverified_completion() {
        let mut snap = live(Module::ContractorExecution);
        let mut done = milestone("ms-1", MilestoneStatus::Completed, Some(100.0));
        done.verified = None;
        snap.milestones = vec![done];
        let facts = normalize(&snap).unwrap();
        let config = EngineConfig::default();

        let candidate = unverified_completion(&facts, &config).expect("completion rule raised");
        assert_eq!(candidate.cited[0].completeness, Completeness::Unknown);
        assert!(verified_checkpoints(&facts, &config).is_none());
    }

    #[test]
    fn test_expired_license() {
        let mut snap = live(Module::ContractorExecution);
        snap.contractors = vec![contractor("ctr-1", Some("2026-02-28"))];
        let facts = normalize(&snap).unwrap();
        let candidate = expired_contractor_license(&facts, &EngineConfig::default()).unwrap();
        assert_eq!(candidate.severity, Severity::Critical);

        snap.contractors = vec![contractor("ctr-1", Some("2027-02-28"))];
        let facts = normalize(&snap).unwrap();
        assert!(expired_contractor_license(&facts, &EngineConfig::default()).is_none());
    }

    #[test]
    fn test_expired_license_without_reference_date() {
        let mut snap = live(Module::ContractorExecution);
        snap.as_of = None;
        snap.contractors = vec![contractor("ctr-1", Some("2027-02-28"))];
        let facts = normalize(&snap).unwrap();
        let candidate = expired_contractor_license(&facts, &EngineConfig::default()).unwrap();
        assert_eq!(candidate.cited[1].completeness, Completeness::Unknown);
    }
}
