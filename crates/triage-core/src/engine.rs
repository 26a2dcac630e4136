//! The assembled engine: config tables plus the compiled crisis detector.

use crate::config::{ConfigError, EngineConfig};
use crate::crisis::{self, CrisisDetector, CrisisMatch};
use crate::questionnaire::{self, AnswerError, NextQuestion};
use crate::resources::CountryResource;
use crate::routing::Router;
use crate::types::{RoutingDecision, ScoreResponse, ScoreTotals, Severity};
use crate::TriageError;

/// Stateless risk assessment engine.
///
/// Built once from an [`EngineConfig`]; every operation takes `&self` and
/// reads only its arguments and the immutable tables, so one engine can be
/// shared freely across threads.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    detector: CrisisDetector,
    router: Router,
}

impl Engine {
    /// Validate `config` and compile its crisis patterns.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let detector = CrisisDetector::new(&config.pattern_set)?;

        tracing::info!(
            pattern_set = %detector.version(),
            phrases = detector.len(),
            "Triage engine initialized"
        );

        Ok(Self {
            config,
            detector,
            router: Router::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn detector(&self) -> &CrisisDetector {
        &self.detector
    }

    /// True if `text` contains crisis language.
    pub fn detect_crisis(&self, text: &str) -> bool {
        self.detector.detect(text)
    }

    /// Which phrase fired, if any.
    pub fn crisis_match(&self, text: &str) -> Option<CrisisMatch> {
        self.detector.first_match(text)
    }

    pub fn format_crisis_response(&self, resource: &CountryResource) -> String {
        crisis::format_crisis_response(resource)
    }

    /// Prompts for an instrument, looked up case-insensitively.
    pub fn questions(&self, instrument: &str) -> Result<&[String], TriageError> {
        let (_, definition) = self.config.instruments.lookup(instrument)?;
        Ok(&definition.questions)
    }

    /// The first question of `instrument` without a recorded answer.
    pub fn next_question(
        &self,
        instrument: &str,
        answered: &[ScoreResponse],
    ) -> Result<Option<NextQuestion>, TriageError> {
        let (id, definition) = self.config.instruments.lookup(instrument)?;
        Ok(questionnaire::next_question(id, definition, answered))
    }

    pub fn validate_answer(&self, response: &ScoreResponse) -> Result<(), AnswerError> {
        questionnaire::validate_answer(
            &self.config.instruments,
            &self.config.item_score_range,
            response,
        )
    }

    pub fn classify(&self, phq9_total: i64, gad7_total: i64) -> Severity {
        questionnaire::classify(
            phq9_total,
            gad7_total,
            &self.config.instruments.phq9.thresholds,
            &self.config.instruments.gad7.thresholds,
        )
    }

    pub fn route(&self, phq9_total: i64, gad7_total: i64, age_band: &str) -> RoutingDecision {
        self.router.route(
            &self.config.instruments,
            ScoreTotals::new(phq9_total, gad7_total),
            age_band,
        )
    }

    /// Sum both item lists and route the totals.
    pub fn score_and_route(
        &self,
        phq9_responses: &[i64],
        gad7_responses: &[i64],
        age_band: &str,
    ) -> RoutingDecision {
        self.route(
            questionnaire::score(phq9_responses),
            questionnaire::score(gad7_responses),
            age_band,
        )
    }

    /// Aggregate recorded answers per instrument and route the totals.
    pub fn route_responses(&self, responses: &[ScoreResponse], age_band: &str) -> RoutingDecision {
        let totals = questionnaire::totals(responses);
        self.router.route(&self.config.instruments, totals, age_band)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crisis::{CrisisPhrase, PatternSet};
    use crate::types::{Bucket, InstrumentId};

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_unknown_instrument_is_surfaced() {
        let engine = engine();
        assert!(matches!(
            engine.questions("bdi2"),
            Err(TriageError::UnknownInstrument(_))
        ));
        assert!(matches!(
            engine.next_question("bdi2", &[]),
            Err(TriageError::UnknownInstrument(_))
        ));
    }

    #[test]
    fn test_questions_case_insensitive() {
        assert_eq!(engine().questions("PHQ9").unwrap().len(), 9);
    }

    #[test]
    fn test_first_question_when_nothing_answered() {
        let next = engine().next_question("phq9", &[]).unwrap().unwrap();
        assert_eq!(next.questionnaire, InstrumentId::Phq9);
        assert_eq!(next.question_index, 0);
    }

    #[test]
    fn test_score_and_route() {
        let decision = engine().score_and_route(&[2; 9], &[0; 7], "18+");
        assert_eq!(decision.scores, ScoreTotals::new(18, 0));
        assert_eq!(decision.bucket, Bucket::adult(Severity::High));
    }

    #[test]
    fn test_route_responses_matches_score_and_route() {
        let engine = engine();
        let responses: Vec<ScoreResponse> = (0..9)
            .map(|i| ScoreResponse::new("phq9", i, 1))
            .chain((0..7).map(|i| ScoreResponse::new("gad7", i, 2)))
            .collect();

        let from_records = engine.route_responses(&responses, "under 18");
        let from_items = engine.score_and_route(&[1; 9], &[2; 7], "under 18");
        assert!(from_records.same_outcome(&from_items));
        assert_eq!(from_records.bucket, Bucket::minor(Severity::Moderate));
    }

    #[test]
    fn test_custom_pattern_set() {
        let config = EngineConfig {
            pattern_set: PatternSet {
                version: "custom".to_string(),
                phrases: vec![CrisisPhrase {
                    id: "DE1".to_string(),
                    language: "de".to_string(),
                    pattern: "nicht mehr leben".to_string(),
                }],
            },
            ..EngineConfig::default()
        };

        let engine = Engine::new(config).unwrap();
        assert!(engine.detect_crisis("Ich will nicht mehr leben"));
        assert!(!engine.detect_crisis("suicide"));
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }
}
