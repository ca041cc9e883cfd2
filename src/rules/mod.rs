//! Per-module rule catalogues.
//!
//! Each rule is a pure, total function over the module's `FactSet` that
//! returns at most one guidance candidate. Severity, wording, and actions
//! are fixed inside the rule; only the cited facts vary between runs.

pub mod equity;
pub mod execution;
pub mod forensic;
pub mod insurance;
pub mod intelligence;

use crate::config::EngineConfig;
use crate::facts::{Fact, FactSet};
use crate::types::{GuidanceKind, Module, RecommendedAction, Severity};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Subject areas a rule speaks to. A request question narrows evaluation
/// to the rules sharing one of its topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Topic {
    Property,
    Evidence,
    Claims,
    Carrier,
    Scope,
    Execution,
    Compliance,
    Equity,
    Data,
}

/// A rule's output before grounding classification.
#[derive(Debug, Clone, PartialEq)]
pub struct GuidanceCandidate {
    pub id: String,
    pub severity: Severity,
    pub kind: GuidanceKind,
    pub title: String,
    pub why_this_matters: String,
    pub recommended_actions: Vec<RecommendedAction>,
    /// Facts the candidate rests on, in citation order.
    pub cited: Vec<Fact>,
}

impl GuidanceCandidate {
    pub fn risk(id: &str, severity: Severity, title: &str, why: &str) -> Self {
        Self::new(id, severity, GuidanceKind::Risk, title, why)
    }

    pub fn opportunity(id: &str, severity: Severity, title: &str, why: &str) -> Self {
        Self::new(id, severity, GuidanceKind::Opportunity, title, why)
    }

    fn new(id: &str, severity: Severity, kind: GuidanceKind, title: &str, why: &str) -> Self {
        Self {
            id: id.to_string(),
            severity,
            kind,
            title: title.to_string(),
            why_this_matters: why.to_string(),
            recommended_actions: Vec::new(),
            cited: Vec::new(),
        }
    }

    pub fn action(mut self, label: &str, rationale: &str) -> Self {
        self.recommended_actions.push(RecommendedAction {
            label: label.to_string(),
            rationale: rationale.to_string(),
        });
        self
    }

    /// Cite the named facts. Names absent from the set are skipped, so a
    /// candidate can only ever point at facts that actually exist.
    pub fn cite(mut self, facts: &FactSet, names: &[&str]) -> Self {
        self.cited
            .extend(names.iter().filter_map(|name| facts.get(name).cloned()));
        self
    }
}

/// Topic tags for guard rules. A rule registered with no topics runs for
/// every question.
pub const EVERY_QUESTION: &[Topic] = &[];

/// Function signature for a guidance rule.
pub type RuleFn = fn(&FactSet, &EngineConfig) -> Option<GuidanceCandidate>;

/// A registered rule with its topic tags.
pub struct RuleEntry {
    pub id: &'static str,
    pub topics: &'static [Topic],
    pub rule: RuleFn,
}

/// Ordered rules for one module.
pub struct RuleCatalogue {
    module: Module,
    entries: Vec<RuleEntry>,
}

impl RuleCatalogue {
    pub fn new(module: Module) -> Self {
        Self {
            module,
            entries: Vec::new(),
        }
    }

    pub fn module(&self) -> Module {
        self.module
    }

    /// Register a rule with the topics it applies to. Pass
    /// [`EVERY_QUESTION`] to keep it out of question narrowing.
    pub fn register(&mut self, id: &'static str, topics: &'static [Topic], rule: RuleFn) {
        self.entries.push(RuleEntry { id, topics, rule });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// Run the rules sharing a topic with `topics` (all rules when `topics`
    /// is empty), in registration order. Guard rules always run. Candidates
    /// without a single cited fact are dropped.
    pub fn evaluate(
        &self,
        facts: &FactSet,
        config: &EngineConfig,
        topics: &[Topic],
    ) -> Vec<GuidanceCandidate> {
        let mut candidates = Vec::new();

        for entry in &self.entries {
            if !topics.is_empty()
                && !entry.topics.is_empty()
                && !entry.topics.iter().any(|t| topics.contains(t))
            {
                continue;
            }

            let Some(candidate) = (entry.rule)(facts, config) else {
                continue;
            };

            if candidate.cited.is_empty() {
                log::warn!(
                    "{}: dropping candidate with no cited facts from rule '{}'",
                    self.module,
                    entry.id
                );
                continue;
            }

            candidates.push(candidate);
        }

        log::debug!(
            "{}: {} rules registered, {} candidates",
            self.module,
            self.entries.len(),
            candidates.len()
        );
        candidates
    }
}

/// Build the built-in catalogue for a module.
pub fn default_catalogue(module: Module) -> RuleCatalogue {
    let mut catalogue = RuleCatalogue::new(module);
    match module {
        Module::Intelligence => intelligence::register(&mut catalogue),
        Module::ForensicProperty => forensic::register(&mut catalogue),
        Module::InsuranceIntelligence => insurance::register(&mut catalogue),
        Module::ContractorExecution => execution::register(&mut catalogue),
        Module::EquityOutcome => equity::register(&mut catalogue),
    }
    catalogue
}
