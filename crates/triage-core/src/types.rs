//! Core types for triage evaluation.
//!
//! Everything here is plain data: severities, buckets, score records and the
//! explanation attached to every routing decision. All types serialize to the
//! JSON shapes the request layer hands back to callers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::TriageError;

/// Severity levels, ordered by ascending cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    /// All levels in evaluation order (low → moderate → high).
    pub const ASCENDING: [Severity; 3] = [Severity::Low, Severity::Moderate, Severity::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two screening instruments the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentId {
    Phq9,
    Gad7,
}

impl InstrumentId {
    /// Instruments in priority order. PHQ-9 wins ties on basis selection.
    pub const ALL: [InstrumentId; 2] = [InstrumentId::Phq9, InstrumentId::Gad7];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentId::Phq9 => "phq9",
            InstrumentId::Gad7 => "gad7",
        }
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentId {
    type Err = TriageError;

    /// Case-insensitive lookup; anything else is `UnknownInstrument`.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_lowercase().as_str() {
            "phq9" => Ok(InstrumentId::Phq9),
            "gad7" => Ok(InstrumentId::Gad7),
            _ => Err(TriageError::UnknownInstrument(name.to_string())),
        }
    }
}

/// A routing tier, optionally marked as applying to a minor.
///
/// Serialized as a single string: `low`, `moderate`, `high`, or one of those
/// with a `_minor` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bucket {
    pub severity: Severity,
    pub minor: bool,
}

impl Bucket {
    const MINOR_SUFFIX: &'static str = "_minor";

    pub fn adult(severity: Severity) -> Self {
        Self {
            severity,
            minor: false,
        }
    }

    pub fn minor(severity: Severity) -> Self {
        Self {
            severity,
            minor: true,
        }
    }

    /// Parse a bucket string such as `"moderate_minor"`.
    pub fn parse(value: &str) -> Option<Self> {
        let (base, minor) = match value.strip_suffix(Self::MINOR_SUFFIX) {
            Some(base) => (base, true),
            None => (value, false),
        };

        let severity = Severity::ASCENDING
            .into_iter()
            .find(|s| s.as_str() == base)?;

        Some(Self { severity, minor })
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minor {
            write!(f, "{}{}", self.severity, Self::MINOR_SUFFIX)
        } else {
            write!(f, "{}", self.severity)
        }
    }
}

impl Serialize for Bucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Bucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Bucket::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid bucket: {}", raw)))
    }
}

/// A single recorded questionnaire answer.
///
/// The instrument is kept as the caller supplied it; it is only resolved to an
/// [`InstrumentId`] when validated or aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub instrument: String,
    pub question_index: usize,
    pub score: i64,
}

impl ScoreResponse {
    pub fn new(instrument: impl Into<String>, question_index: usize, score: i64) -> Self {
        Self {
            instrument: instrument.into(),
            question_index,
            score,
        }
    }
}

/// Instrument totals that feed the classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTotals {
    pub phq9: i64,
    pub gad7: i64,
}

impl ScoreTotals {
    pub fn new(phq9: i64, gad7: i64) -> Self {
        Self { phq9, gad7 }
    }

    pub fn get(&self, instrument: InstrumentId) -> i64 {
        match instrument {
            InstrumentId::Phq9 => self.phq9,
            InstrumentId::Gad7 => self.gad7,
        }
    }
}

/// One row of a threshold evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdComparison {
    pub threshold: Severity,
    pub cutoff: i64,
    pub met: bool,
}

/// How one instrument total compares against its threshold table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdEvaluation {
    pub score: i64,

    /// Comparisons in ascending cutoff order
    pub comparisons: Vec<ThresholdComparison>,

    /// Highest level whose cutoff is satisfied (`low` when none is)
    pub highest_met: Severity,
}

/// The decision part of an explanation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionSummary {
    pub bucket: Bucket,
    pub basis: InstrumentId,
}

/// Why a routing decision came out the way it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub decision: DecisionSummary,
    pub phq9: ThresholdEvaluation,
    pub gad7: ThresholdEvaluation,
}

impl Explanation {
    pub fn evaluation(&self, instrument: InstrumentId) -> &ThresholdEvaluation {
        match instrument {
            InstrumentId::Phq9 => &self.phq9,
            InstrumentId::Gad7 => &self.gad7,
        }
    }
}

/// Output of the routing classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub bucket: Bucket,
    pub recommendation: String,
    pub scores: ScoreTotals,

    /// Time of evaluation, not of the underlying answers
    pub timestamp: DateTime<Utc>,

    pub explanation: Explanation,
}

impl RoutingDecision {
    /// Compare everything except the timestamp.
    pub fn same_outcome(&self, other: &RoutingDecision) -> bool {
        self.bucket == other.bucket
            && self.recommendation == other.recommendation
            && self.scores == other.scores
            && self.explanation == other.explanation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_display() {
        assert_eq!(Bucket::adult(Severity::High).to_string(), "high");
        assert_eq!(Bucket::minor(Severity::Low).to_string(), "low_minor");
    }

    #[test]
    fn test_bucket_parse() {
        assert_eq!(Bucket::parse("moderate"), Some(Bucket::adult(Severity::Moderate)));
        assert_eq!(Bucket::parse("high_minor"), Some(Bucket::minor(Severity::High)));
        assert_eq!(Bucket::parse("severe"), None);
        assert_eq!(Bucket::parse("_minor"), None);
    }

    #[test]
    fn test_bucket_serializes_as_string() {
        let json = serde_json::to_value(Bucket::minor(Severity::Moderate)).unwrap();
        assert_eq!(json, serde_json::json!("moderate_minor"));

        let back: Bucket = serde_json::from_value(json).unwrap();
        assert_eq!(back, Bucket::minor(Severity::Moderate));
    }

    #[test]
    fn test_instrument_from_str_is_case_insensitive() {
        assert_eq!("PHQ9".parse::<InstrumentId>().unwrap(), InstrumentId::Phq9);
        assert_eq!("gad7".parse::<InstrumentId>().unwrap(), InstrumentId::Gad7);
        assert!(matches!(
            "bdi2".parse::<InstrumentId>(),
            Err(TriageError::UnknownInstrument(name)) if name == "bdi2"
        ));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Moderate);
        assert!(Severity::Moderate < Severity::High);
    }
}
