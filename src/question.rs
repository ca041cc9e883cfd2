//! Free-text question handling.
//!
//! A question can only narrow which rules run and pick how the answer line
//! is phrased. It never adds facts, and the answer is built solely from
//! emitted items.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::rules::Topic;
use crate::types::{GuidanceItem, GuidanceKind};

/// Said when a question asks for something the items cannot answer.
pub const NO_SPECULATION: &str =
    "ATOS can only answer from the records in this view and will not speculate beyond them.";

const TOPIC_PATTERNS: &[(Topic, &str)] = &[
    (Topic::Property, r"(?i)\b(property|properties|address|house|home|building)\b"),
    (
        Topic::Evidence,
        r"(?i)\b(evidence|photos?|videos?|documents?|measurements?|proof|inspections?)\b",
    ),
    (
        Topic::Claims,
        r"(?i)\b(claims?|payouts?|payments?|shortfall|supplements?|approv\w*)\b",
    ),
    (Topic::Carrier, r"(?i)\b(carriers?|adjusters?|insurers?|follow[- ]?ups?)\b"),
    (Topic::Scope, r"(?i)\b(scope|discrepanc\w*|line items?|estimates?)\b"),
    (Topic::Execution, r"(?i)\b(milestones?|progress|schedule|blocked|contractors?)\b"),
    (Topic::Compliance, r"(?i)\b(licen[cs]es?|compliance|permits?|contractors?)\b"),
    (Topic::Equity, r"(?i)\b(equity|recovery|valuation|gains?|reports?)\b"),
    (Topic::Data, r"(?i)\b(data|stub|placeholders?)\b"),
];

fn topic_patterns() -> &'static [(Topic, Regex)] {
    static RE: OnceLock<Vec<(Topic, Regex)>> = OnceLock::new();
    RE.get_or_init(|| {
        TOPIC_PATTERNS
            .iter()
            .filter_map(|(topic, pattern)| Regex::new(pattern).ok().map(|re| (*topic, re)))
            .collect()
    })
}

fn gaps_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(gaps?|missing|risks?|problems?|issues?|wrong)\b").ok())
        .as_ref()
}

fn next_steps_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(next|should|actions?|steps?|prioriti[sz]e|todo)\b").ok()
    })
    .as_ref()
}

fn evidence_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(evidence|proof|prove|support\w*|backs?)\b").ok())
        .as_ref()
}

fn matches(re: Option<&Regex>, text: &str) -> bool {
    re.is_some_and(|re| re.is_match(text))
}

/// What a question is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Gaps,
    NextSteps,
    Evidence,
    Other,
}

/// Topics mentioned in the question, in `Topic` order. Empty means the
/// question did not name any subject area.
pub fn topics(question: &str) -> Vec<Topic> {
    let found: BTreeSet<Topic> = topic_patterns()
        .iter()
        .filter(|(_, re)| re.is_match(question))
        .map(|(topic, _)| *topic)
        .collect();
    found.into_iter().collect()
}

pub fn intent(question: &str) -> Intent {
    if matches(gaps_re(), question) {
        Intent::Gaps
    } else if matches(next_steps_re(), question) {
        Intent::NextSteps
    } else if matches(evidence_re(), question) {
        Intent::Evidence
    } else {
        Intent::Other
    }
}

/// Compose the answer line from ranked items only.
pub fn answer(question: &str, items: &[GuidanceItem]) -> String {
    match intent(question) {
        Intent::Gaps => {
            let titles: Vec<&str> = items
                .iter()
                .filter(|i| i.kind == GuidanceKind::Risk)
                .map(|i| i.title.as_str())
                .collect();
            if titles.is_empty() {
                "No gaps were found in the current records.".to_string()
            } else {
                format!("Open gaps: {}.", titles.join("; "))
            }
        }
        Intent::NextSteps => {
            let mut labels: Vec<&str> = Vec::new();
            for action in items.iter().flat_map(|i| &i.recommended_actions) {
                if labels.len() == 3 {
                    break;
                }
                if !labels.contains(&action.label.as_str()) {
                    labels.push(action.label.as_str());
                }
            }
            if labels.is_empty() {
                "No actions are recommended from the current records.".to_string()
            } else {
                format!("Next steps: {}.", labels.join("; "))
            }
        }
        Intent::Evidence => {
            let mut cited: Vec<String> = Vec::new();
            for citation in items.iter().flat_map(|i| &i.grounded_facts) {
                let line = citation.to_string();
                if !cited.contains(&line) {
                    cited.push(line);
                }
            }
            if cited.is_empty() {
                "No facts are cited by the current guidance.".to_string()
            } else {
                format!("Supporting facts: {}.", cited.join("; "))
            }
        }
        Intent::Other => NO_SPECULATION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{Completeness, FactCitation, FactValue};
    use crate::types::{ConfidenceLabel, RecommendedAction, Severity};

    fn item(id: &str, kind: GuidanceKind, actions: &[&str]) -> GuidanceItem {
        GuidanceItem {
            id: id.to_string(),
            severity: Severity::High,
            kind,
            title: format!("Title {}", id),
            why_this_matters: String::new(),
            grounded_facts: vec![FactCitation {
                fact: format!("{}-fact", id),
                value: FactValue::Count(2),
                completeness: Completeness::Complete,
                sources: vec!["rec-1".to_string()],
            }],
            recommended_actions: actions
                .iter()
                .map(|a| RecommendedAction {
                    label: a.to_string(),
                    rationale: String::new(),
                })
                .collect(),
            confidence_label: ConfidenceLabel::Grounded,
        }
    }

    #[test]
    fn test_topics_from_keywords() {
        assert_eq!(topics("Why is the payout so low?"), vec![Topic::Claims]);
        assert_eq!(
            topics("Has the adjuster seen the scope discrepancies?"),
            vec![Topic::Carrier, Topic::Scope]
        );
        assert_eq!(topics("Which milestone is blocked?"), vec![Topic::Execution]);
        assert_eq!(topics("Is the contractor's license current?"), vec![Topic::Execution, Topic::Compliance]);
        assert!(topics("What should I do?").is_empty());
    }

    #[test]
    fn test_intent_detection() {
        assert_eq!(intent("What's missing?"), Intent::Gaps);
        assert_eq!(intent("What should I do next?"), Intent::NextSteps);
        assert_eq!(intent("What proof do we have?"), Intent::Evidence);
        assert_eq!(intent("Will the carrier pay by Friday?"), Intent::Other);
    }

    #[test]
    fn test_gap_answer_lists_risk_titles() {
        let items = vec![
            item("a", GuidanceKind::Risk, &[]),
            item("b", GuidanceKind::Opportunity, &[]),
        ];
        assert_eq!(answer("Any gaps?", &items), "Open gaps: Title a.");
        assert_eq!(answer("Any gaps?", &[]), "No gaps were found in the current records.");
    }

    #[test]
    fn test_next_steps_capped_at_three() {
        let items = vec![
            item("a", GuidanceKind::Risk, &["One", "Two"]),
            item("b", GuidanceKind::Risk, &["Two", "Three", "Four"]),
        ];
        assert_eq!(answer("Next steps?", &items), "Next steps: One; Two; Three.");
    }

    #[test]
    fn test_evidence_answer_cites_facts() {
        let items = vec![item("a", GuidanceKind::Risk, &[])];
        assert_eq!(answer("What supports this?", &items), "Supporting facts: a-fact: 2.");
    }

    #[test]
    fn test_unanswerable_question_refuses() {
        let items = vec![item("a", GuidanceKind::Risk, &["One"])];
        assert_eq!(answer("Will prices rise?", &items), NO_SPECULATION);
    }
}
