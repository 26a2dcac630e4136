//! # triage-core
//!
//! Deterministic risk assessment and routing engine.
//!
//! This crate turns self-reported signals into a routing decision:
//! - Does this message contain crisis language?
//! - Which support tier do these questionnaire scores point to?
//! - Why was that tier chosen?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces the same decision (only the timestamp varies)
//! 2. **Crisis override**: A crisis match bypasses routing entirely
//! 3. **Explainable**: Every decision carries its threshold comparisons and basis instrument
//! 4. **Stateless**: Tables are built once; every call is a pure read
//!
//! ## Example
//!
//! ```rust,ignore
//! use triage_core::{detect_crisis, format_crisis_response, score_and_route, CountryResource};
//!
//! if detect_crisis(message) {
//!     println!("{}", format_crisis_response(&resource));
//!     return;
//! }
//!
//! let decision = score_and_route(&phq9_items, &gad7_items, "18+");
//! println!("{} (basis: {})", decision.bucket, decision.explanation.decision.basis);
//! ```

pub mod config;
pub mod crisis;
pub mod engine;
pub mod questionnaire;
pub mod resources;
pub mod routing;
pub mod types;

// Re-export main types at crate root
pub use config::{ConfigError, EngineConfig};
pub use crisis::{CrisisDetector, CrisisMatch, CrisisPhrase, PatternSet, DISCLAIMER};
pub use engine::Engine;
pub use questionnaire::{
    AnswerError, InstrumentDefinition, Instruments, ItemScoreRange, NextQuestion, ThresholdTable,
};
pub use resources::{
    lookup_or_default, BuiltinResources, CountryResource, ResourceDirectory, ResourceError,
    ResourceLookup,
};
pub use routing::Router;
pub use types::{
    Bucket, DecisionSummary, Explanation, InstrumentId, RoutingDecision, ScoreResponse,
    ScoreTotals, Severity, ThresholdComparison, ThresholdEvaluation,
};

use lazy_static::lazy_static;
use thiserror::Error;

/// Errors surfaced by the engine.
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),
}

lazy_static! {
    /// Engine built from the shipped defaults, initialized on first use.
    static ref BUILTIN_ENGINE: Engine =
        Engine::new(EngineConfig::default()).expect("built-in engine config is valid");
}

/// The process-wide engine built from [`EngineConfig::default`].
pub fn builtin_engine() -> &'static Engine {
    &BUILTIN_ENGINE
}

/// Check free text for crisis language using the built-in phrase set.
pub fn detect_crisis(text: &str) -> bool {
    BUILTIN_ENGINE.detect_crisis(text)
}

/// Render the crisis message for a resource record.
pub fn format_crisis_response(resource: &CountryResource) -> String {
    crisis::format_crisis_response(resource)
}

/// Score both item lists and route them with the built-in tables.
///
/// # Arguments
///
/// * `phq9_responses` - PHQ-9 item scores (expected 0..=3 each)
/// * `gad7_responses` - GAD-7 item scores (expected 0..=3 each)
/// * `age_band` - Session age band; only "under 18" changes the outcome
///
/// # Returns
///
/// A `RoutingDecision` containing:
/// - `bucket`: low, moderate or high, `_minor`-suffixed for under-18s
/// - `recommendation`: fixed text for the bucket
/// - `scores`: the two totals
/// - `explanation`: threshold comparisons and the basis instrument
pub fn score_and_route(
    phq9_responses: &[i64],
    gad7_responses: &[i64],
    age_band: &str,
) -> RoutingDecision {
    BUILTIN_ENGINE.score_and_route(phq9_responses, gad7_responses, age_band)
}
