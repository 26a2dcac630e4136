//! Router: turns two instrument totals into a routing decision.
//!
//! The router applies fixed, non-configurable policy:
//! 1. Bucket severity comes from [`classify`] (either instrument may raise it)
//! 2. The recommendation is one literal per severity
//! 3. An age band of exactly "under 18" (any case) adds the guardian sentence
//!    and marks the bucket `_minor`; every other value is treated as adult
//! 4. The basis is PHQ-9 whenever PHQ-9 itself reaches the bucket severity,
//!    GAD-7 otherwise; low buckets always cite PHQ-9

use chrono::Utc;

use crate::questionnaire::{classify, Instruments};
use crate::types::{
    Bucket, DecisionSummary, Explanation, InstrumentId, RoutingDecision, ScoreTotals, Severity,
    ThresholdEvaluation,
};

const LOW_RECOMMENDATION: &str = "Based on what you shared, here are some self-help options and public resources that may be supportive.";

const MODERATE_RECOMMENDATION: &str =
    "We suggest speaking with a licensed professional or trusted clinician. Here are referral options.";

const HIGH_RECOMMENDATION: &str = "We recommend connecting with professional support as soon as possible. If you feel unsafe, please use crisis resources.";

const MINOR_NOTICE: &str =
    "As you are under 18, please involve a trusted guardian or appropriate youth service.";

const MINOR_AGE_BAND: &str = "under 18";

/// The Router produces explainable routing decisions.
#[derive(Debug)]
pub struct Router;

impl Router {
    pub fn new() -> Self {
        Self
    }

    /// Route a pair of totals.
    ///
    /// Totals are not validated; negative or oversized values are classified
    /// like any other number.
    pub fn route(
        &self,
        instruments: &Instruments,
        totals: ScoreTotals,
        age_band: &str,
    ) -> RoutingDecision {
        let severity = classify(
            totals.phq9,
            totals.gad7,
            &instruments.phq9.thresholds,
            &instruments.gad7.thresholds,
        );

        let mut recommendation = recommendation_for(severity).to_string();
        let bucket = if is_minor(age_band) {
            recommendation.push(' ');
            recommendation.push_str(MINOR_NOTICE);
            Bucket::minor(severity)
        } else {
            Bucket::adult(severity)
        };

        let phq9 = instruments.phq9.thresholds.evaluate(totals.phq9);
        let gad7 = instruments.gad7.thresholds.evaluate(totals.gad7);
        let basis = self.select_basis(severity, &phq9);

        tracing::debug!(
            bucket = %bucket,
            basis = %basis,
            phq9 = totals.phq9,
            gad7 = totals.gad7,
            "Routing decision"
        );

        RoutingDecision {
            bucket,
            recommendation,
            scores: totals,
            timestamp: Utc::now(),
            explanation: Explanation {
                decision: DecisionSummary { bucket, basis },
                phq9,
                gad7,
            },
        }
    }

    /// PHQ-9 is checked first, so it wins when both reach the same level.
    fn select_basis(&self, severity: Severity, phq9: &ThresholdEvaluation) -> InstrumentId {
        match severity {
            Severity::Low => InstrumentId::Phq9,
            level if phq9.highest_met == level => InstrumentId::Phq9,
            _ => InstrumentId::Gad7,
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed recommendation text for a severity.
pub fn recommendation_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => LOW_RECOMMENDATION,
        Severity::Moderate => MODERATE_RECOMMENDATION,
        Severity::High => HIGH_RECOMMENDATION,
    }
}

/// Literal, case-insensitive comparison against "under 18".
///
/// Other youth bands ("13-17") are not recognised.
pub fn is_minor(age_band: &str) -> bool {
    age_band.to_lowercase() == MINOR_AGE_BAND
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn route(phq9: i64, gad7: i64, age_band: &str) -> RoutingDecision {
        Router::new().route(&Instruments::default(), ScoreTotals::new(phq9, gad7), age_band)
    }

    #[test]
    fn test_routing_minor() {
        let result = route(5, 5, "under 18");
        assert!(result.bucket.to_string().ends_with("_minor"));
        assert!(result.recommendation.to_lowercase().contains("guardian"));
    }

    #[test]
    fn test_routing_high() {
        let result = route(20, 5, "18+");
        assert_eq!(result.bucket.to_string(), "high");
        assert!(result.recommendation.to_lowercase().contains("unsafe"));
        assert_eq!(result.explanation.decision.basis, InstrumentId::Phq9);
    }

    #[test]
    fn test_routing_moderate_explanation() {
        let result = route(12, 5, "18+");
        assert!(result.bucket.to_string().starts_with("moderate"));
        assert!(result
            .explanation
            .phq9
            .comparisons
            .iter()
            .any(|c| c.threshold == Severity::Moderate && c.met));
        assert_eq!(result.explanation.decision.basis, InstrumentId::Phq9);
    }

    #[test]
    fn test_gad7_basis_when_phq9_below_level() {
        let result = route(3, 16, "18+");
        assert_eq!(result.bucket, Bucket::adult(Severity::High));
        assert_eq!(result.explanation.decision.basis, InstrumentId::Gad7);

        let result = route(3, 11, "18+");
        assert_eq!(result.bucket, Bucket::adult(Severity::Moderate));
        assert_eq!(result.explanation.decision.basis, InstrumentId::Gad7);
    }

    #[test]
    fn test_phq9_wins_ties() {
        let result = route(16, 20, "18+");
        assert_eq!(result.explanation.decision.basis, InstrumentId::Phq9);

        let result = route(11, 14, "18+");
        assert_eq!(result.explanation.decision.basis, InstrumentId::Phq9);
    }

    #[test]
    fn test_basis_is_gad7_when_phq9_only_moderate_in_high_bucket() {
        // PHQ-9 is moderate, GAD-7 is high: the bucket is high and PHQ-9
        // does not reach it.
        let result = route(12, 18, "18+");
        assert_eq!(result.bucket.severity, Severity::High);
        assert_eq!(result.explanation.decision.basis, InstrumentId::Gad7);
    }

    #[test]
    fn test_low_bucket_cites_phq9() {
        let result = route(0, 9, "18+");
        assert_eq!(result.bucket, Bucket::adult(Severity::Low));
        assert_eq!(result.explanation.decision.basis, InstrumentId::Phq9);
    }

    #[test]
    fn test_age_band_is_a_literal_match() {
        assert!(is_minor("under 18"));
        assert!(is_minor("Under 18"));
        assert!(is_minor("UNDER 18"));
        assert!(!is_minor("13-17"));
        assert!(!is_minor(" under 18"));
        assert!(!is_minor("under18"));
        assert!(!is_minor(""));
    }

    #[test]
    fn test_adult_recommendation_is_unchanged() {
        let result = route(12, 0, "teen");
        assert_eq!(result.recommendation, MODERATE_RECOMMENDATION);
        assert!(!result.bucket.minor);
    }

    #[test]
    fn test_explanation_bucket_matches_decision() {
        let result = route(20, 20, "under 18");
        assert_eq!(result.explanation.decision.bucket, result.bucket);
    }

    #[test]
    fn test_explanation_json_shape() {
        let json = serde_json::to_value(route(12, 5, "18+")).unwrap();
        assert_eq!(json["bucket"], "moderate");
        assert_eq!(json["scores"]["phq9"], 12);
        assert_eq!(json["explanation"]["decision"]["basis"], "phq9");
        assert_eq!(
            json["explanation"]["phq9"]["comparisons"][1],
            serde_json::json!({"threshold": "moderate", "cutoff": 10, "met": true})
        );
        assert_eq!(json["explanation"]["gad7"]["highest_met"], "low");
    }

    proptest! {
        #[test]
        fn prop_under_18_always_minor(phq9 in 0i64..=27, gad7 in 0i64..=21) {
            let result = route(phq9, gad7, "under 18");
            prop_assert!(result.bucket.to_string().ends_with("_minor"));
            prop_assert!(result.recommendation.contains("guardian"));
            prop_assert!(result.recommendation.contains("youth service"));
        }

        #[test]
        fn prop_route_is_idempotent(
            phq9 in -3i64..40,
            gad7 in -3i64..40,
            minor in any::<bool>(),
        ) {
            let band = if minor { "under 18" } else { "18+" };
            let first = route(phq9, gad7, band);
            let second = route(phq9, gad7, band);
            prop_assert!(first.same_outcome(&second));
        }

        #[test]
        fn prop_basis_reaches_bucket_severity(phq9 in 0i64..=27, gad7 in 0i64..=21) {
            let result = route(phq9, gad7, "18+");
            let basis = result.explanation.decision.basis;
            if result.bucket.severity != Severity::Low {
                prop_assert_eq!(
                    result.explanation.evaluation(basis).highest_met,
                    result.bucket.severity
                );
            }
        }
    }
}
