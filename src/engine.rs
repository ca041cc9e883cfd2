//! Guidance engine.
//!
//! Holds the per-module rule catalogues and runs the pipeline for one
//! request: validate, normalize, evaluate, classify, rank, emit. The engine
//! keeps no state between requests and can be shared across threads.

use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::emitter::emit;
use crate::error::AtosError;
use crate::facts::FactSet;
use crate::grounding::classify;
use crate::normalizer::normalize;
use crate::question;
use crate::ranking::rank;
use crate::rules::{default_catalogue, GuidanceCandidate, RuleCatalogue, Topic};
use crate::types::{GuidanceItem, GuidanceRequest, GuidanceResponse, Module};

/// The guidance engine.
pub struct AtosEngine {
    config: EngineConfig,
    catalogues: BTreeMap<Module, RuleCatalogue>,
}

impl AtosEngine {
    /// An engine with no catalogues registered.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            catalogues: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register (or replace) the catalogue for its module.
    pub fn register(&mut self, catalogue: RuleCatalogue) {
        self.catalogues.insert(catalogue.module(), catalogue);
    }

    /// Check a request before any work is done. Returns the parsed module.
    pub fn validate(&self, request: &GuidanceRequest) -> Result<Module, AtosError> {
        let result = self.check_request(request);
        if let Err(e) = &result {
            log::warn!("request rejected ({}) for module '{}': {}", e.code(), request.module, e);
        }
        result
    }

    fn check_request(&self, request: &GuidanceRequest) -> Result<Module, AtosError> {
        let module = Module::parse(&request.module)
            .ok_or_else(|| AtosError::UnknownModule(request.module.clone()))?;

        if let Some(q) = &request.question {
            let len = q.chars().count();
            if len > self.config.question_max_chars {
                return Err(AtosError::QuestionTooLong {
                    len,
                    max: self.config.question_max_chars,
                });
            }
        }

        if request.snapshot.module != request.module {
            return Err(AtosError::ModuleMismatch {
                requested: request.module.clone(),
                snapshot: request.snapshot.module.clone(),
            });
        }

        Ok(module)
    }

    /// Run a module's catalogue over its facts, narrowed to `topics` when
    /// any are given.
    pub fn evaluate(
        &self,
        module: Module,
        facts: &FactSet,
        topics: &[Topic],
    ) -> Result<Vec<GuidanceCandidate>, AtosError> {
        let catalogue = self
            .catalogues
            .get(&module)
            .ok_or(AtosError::MissingRuleCatalogue(module))?;
        Ok(catalogue.evaluate(facts, &self.config, topics))
    }

    /// Produce guidance for one request. Either the full response or an
    /// error; never a partial list.
    pub fn run(&self, request: &GuidanceRequest) -> Result<GuidanceResponse, AtosError> {
        let module = self.validate(request)?;
        let snapshot = &request.snapshot;

        // Blank questions are treated as no question at all.
        let asked = request
            .question
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());

        let facts = normalize(snapshot)?;

        let topics = asked.map(question::topics).unwrap_or_default();
        if !topics.is_empty() {
            log::debug!("{}: question narrows rules to {:?}", module, topics);
        }

        let candidates = self.evaluate(module, &facts, &topics)?;
        let items: Vec<GuidanceItem> = candidates
            .into_iter()
            .map(|c| classify(c, &facts, snapshot.provenance))
            .collect();
        let ranked = rank(&items);

        let response = emit(ranked, module, snapshot.provenance, asked);
        log::info!(
            "guidance emitted for {} ({}): {} items, {:?}",
            module,
            snapshot.provenance.as_str(),
            response.items.len(),
            response.confidence_label
        );
        Ok(response)
    }
}

/// Build an engine with the built-in catalogue for every module.
pub fn default_engine(config: EngineConfig) -> AtosEngine {
    let mut engine = AtosEngine::new(config);
    for module in Module::ALL {
        engine.register(default_catalogue(module));
    }
    engine
}
