//! Guidance emitter: ranked items plus a brief, wrapped in the response
//! contract.

use crate::grounding::overall_label;
use crate::question::answer;
use crate::types::{
    GuidanceBrief, GuidanceItem, GuidanceKind, GuidanceResponse, Module, Provenance, GUARDRAIL,
};

/// Fixed framing sentence for each module's brief.
pub fn why_it_matters(module: Module) -> &'static str {
    match module {
        Module::Intelligence => {
            "The intelligence view lines up evidence, claim posture and execution into one defensible picture of the property."
        }
        Module::ForensicProperty => {
            "Forensic quality decides whether damage holds up under carrier scrutiny and turns into recoverable value."
        }
        Module::InsuranceIntelligence => {
            "Insurance intelligence turns technical damage findings into claim outcomes that can be defended financially."
        }
        Module::ContractorExecution => {
            "Execution quality decides whether approved scope becomes measurable protection of the asset."
        }
        Module::EquityOutcome => {
            "Equity outcomes show whether forensic and operational decisions produced documented financial improvement."
        }
    }
}

fn brief(module: Module, items: &[GuidanceItem]) -> GuidanceBrief {
    let risks = items
        .iter()
        .filter(|i| i.kind == GuidanceKind::Risk && i.severity.is_risk_grade())
        .map(|i| i.title.clone())
        .collect();

    let opportunities = items
        .iter()
        .filter(|i| i.kind == GuidanceKind::Opportunity)
        .map(|i| i.title.clone())
        .collect();

    let mut recommended_actions: Vec<String> = Vec::new();
    for action in items.iter().flat_map(|i| &i.recommended_actions) {
        if !recommended_actions.contains(&action.label) {
            recommended_actions.push(action.label.clone());
        }
    }

    GuidanceBrief {
        why_it_matters: why_it_matters(module).to_string(),
        risks,
        opportunities,
        recommended_actions,
    }
}

/// Assemble the response. `ranked` must already be ordered; it is carried
/// through as-is.
pub fn emit(
    ranked: Vec<GuidanceItem>,
    module: Module,
    provenance: Provenance,
    question: Option<&str>,
) -> GuidanceResponse {
    let answer = question.map(|q| answer(q, &ranked));

    GuidanceResponse {
        module,
        brief: brief(module, &ranked),
        confidence_label: overall_label(&ranked, provenance),
        answer,
        items: ranked,
        guardrail: GUARDRAIL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConfidenceLabel, RecommendedAction, Severity};

    fn item(id: &str, severity: Severity, kind: GuidanceKind, actions: &[&str]) -> GuidanceItem {
        GuidanceItem {
            id: id.to_string(),
            severity,
            kind,
            title: format!("Title {}", id),
            why_this_matters: String::new(),
            grounded_facts: Vec::new(),
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
    fn test_brief_sections() {
        let items = vec![
            item("a", Severity::Critical, GuidanceKind::Risk, &["Fix A", "Shared"]),
            item("b", Severity::Medium, GuidanceKind::Risk, &["Shared"]),
            item("c", Severity::Low, GuidanceKind::Opportunity, &["Use C"]),
        ];
        let response = emit(items, Module::InsuranceIntelligence, Provenance::Live, None);

        assert_eq!(response.brief.risks, vec!["Title a"]);
        assert_eq!(response.brief.opportunities, vec!["Title c"]);
        assert_eq!(response.brief.recommended_actions, vec!["Fix A", "Shared", "Use C"]);
        assert_eq!(response.brief.why_it_matters, why_it_matters(Module::InsuranceIntelligence));
        assert_eq!(response.items.len(), 3);
        assert!(response.answer.is_none());
    }

    #[test]
    fn test_guardrail_and_empty_response() {
        let response = emit(Vec::new(), Module::EquityOutcome, Provenance::Live, None);
        assert_eq!(response.guardrail, GUARDRAIL);
        assert_eq!(response.confidence_label, ConfidenceLabel::Grounded);
        assert!(response.brief.risks.is_empty());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["module"], "equity-outcome");
        assert_eq!(json["confidenceLabel"], "grounded");
        assert!(json.get("answer").is_none());
    }

    #[test]
    fn test_answer_only_when_asked() {
        let items = vec![item("a", Severity::High, GuidanceKind::Risk, &["Fix A"])];
        let response = emit(items, Module::Intelligence, Provenance::Live, Some("What's next?"));
        assert_eq!(response.answer.as_deref(), Some("Next steps: Fix A."));
    }
}
