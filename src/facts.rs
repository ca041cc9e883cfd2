//! Canonical facts derived from snapshot records.
//!
//! A fact is a named observation plus the ids of the records it came from
//! (its grounding set). Facts with no input data are `Unknown`, never zero,
//! so rules can tell "no risk" from "no data".

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum FactValue {
    Unknown,
    Count(u64),
    Amount(f64),
    Ratio(f64),
    Percent(f64),
    Days(i64),
    Flag(bool),
    Text(String),
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Unknown => f.write_str("unknown"),
            FactValue::Count(n) => write!(f, "{}", n),
            FactValue::Amount(v) => write!(f, "${:.2}", v),
            FactValue::Ratio(r) => write!(f, "{:.2}", r),
            FactValue::Percent(p) => write!(f, "{:.0}%", p),
            FactValue::Days(d) => write!(f, "{} days", d),
            FactValue::Flag(b) => f.write_str(if *b { "yes" } else { "no" }),
            FactValue::Text(s) => f.write_str(s),
        }
    }
}

/// How fully a fact's inputs were populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Completeness {
    /// Every input record carried the fields the fact needs.
    Complete,
    /// Input records exist but some required fields were null.
    Partial,
    /// No input data at all.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fact {
    pub name: String,
    pub value: FactValue,
    pub completeness: Completeness,
    pub sources: Vec<String>,
}

impl Fact {
    pub fn complete(name: &str, value: FactValue, sources: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            value,
            completeness: Completeness::Complete,
            sources,
        }
    }

    pub fn partial(name: &str, value: FactValue, sources: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            value,
            completeness: Completeness::Partial,
            sources,
        }
    }

    /// Complete when nothing was missing, partial otherwise.
    pub fn measured(name: &str, value: FactValue, sources: Vec<String>, missing: bool) -> Self {
        if missing {
            Self::partial(name, value, sources)
        } else {
            Self::complete(name, value, sources)
        }
    }

    pub fn unknown(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: FactValue::Unknown,
            completeness: Completeness::Unknown,
            sources: Vec::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.completeness == Completeness::Unknown
    }
}

/// A fact as cited by a guidance item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactCitation {
    pub fact: String,
    pub value: FactValue,
    pub completeness: Completeness,
    pub sources: Vec<String>,
}

impl From<&Fact> for FactCitation {
    fn from(fact: &Fact) -> Self {
        FactCitation {
            fact: fact.name.clone(),
            value: fact.value.clone(),
            completeness: fact.completeness,
            sources: fact.sources.clone(),
        }
    }
}

impl fmt::Display for FactCitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.fact, self.value)
    }
}

/// Facts for one invocation, keyed by name. Ordered so iteration (and
/// anything serialized from it) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FactSet {
    facts: BTreeMap<String, Fact>,
}

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fact: Fact) {
        self.facts.insert(fact.name.clone(), fact);
    }

    pub fn get(&self, name: &str) -> Option<&Fact> {
        self.facts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.facts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.values()
    }

    /// True when the fact is missing or carries no data.
    pub fn is_unknown(&self, name: &str) -> bool {
        self.get(name).map_or(true, Fact::is_unknown)
    }

    pub fn count(&self, name: &str) -> Option<u64> {
        match self.get(name)?.value {
            FactValue::Count(n) => Some(n),
            _ => None,
        }
    }

    pub fn amount(&self, name: &str) -> Option<f64> {
        match self.get(name)?.value {
            FactValue::Amount(v) => Some(v),
            _ => None,
        }
    }

    pub fn ratio(&self, name: &str) -> Option<f64> {
        match self.get(name)?.value {
            FactValue::Ratio(r) => Some(r),
            _ => None,
        }
    }

    pub fn percent(&self, name: &str) -> Option<f64> {
        match self.get(name)?.value {
            FactValue::Percent(p) => Some(p),
            _ => None,
        }
    }

    pub fn days(&self, name: &str) -> Option<i64> {
        match self.get(name)?.value {
            FactValue::Days(d) => Some(d),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.get(name)?.value {
            FactValue::Flag(b) => Some(b),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match &self.get(name)?.value {
            FactValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}
