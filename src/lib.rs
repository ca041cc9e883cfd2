//! ATOS guidance engine.
//!
//! Deterministic, explainable guidance for one business module at a time.
//! A request carries a snapshot of platform records; the engine normalizes
//! them into facts, runs the module's rule catalogue, labels every item by
//! how well its facts are grounded, and returns a ranked response. Nothing
//! is fetched, mutated, or inferred beyond the snapshot.

pub mod config;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod facts;
pub mod grounding;
pub mod normalizer;
pub mod question;
pub mod ranking;
pub mod rules;
pub mod snapshot;
pub mod types;

pub use config::EngineConfig;
pub use engine::{default_engine, AtosEngine};
pub use error::{AtosError, ErrorReport};
pub use types::{GuidanceRequest, GuidanceResponse, Module};
