//! Questionnaire scoring, threshold tables and answer bookkeeping.
//!
//! Scoring is a plain sum. Item range checks live in [`validate_answer`],
//! which the boundary accepting individual answers is expected to call;
//! the scorer and classifier accept whatever totals they are given.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    InstrumentId, ScoreResponse, ScoreTotals, Severity, ThresholdComparison, ThresholdEvaluation,
};
use crate::TriageError;

/// Errors from answer validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnswerError {
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("Invalid question index {index} (instrument has {len} questions)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Score {score} outside [{min}, {max}]")]
    ScoreOutOfRange { score: i64, min: i64, max: i64 },
}

/// Minimum inclusive score per severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub low: i64,
    pub moderate: i64,
    pub high: i64,
}

impl ThresholdTable {
    /// The standard PHQ-9 / GAD-7 cutoffs.
    pub const STANDARD: ThresholdTable = ThresholdTable {
        low: 0,
        moderate: 10,
        high: 15,
    };

    pub fn cutoff(&self, level: Severity) -> i64 {
        match level {
            Severity::Low => self.low,
            Severity::Moderate => self.moderate,
            Severity::High => self.high,
        }
    }

    /// Levels paired with their cutoffs, lowest first.
    pub fn levels(&self) -> [(Severity, i64); 3] {
        Severity::ASCENDING.map(|level| (level, self.cutoff(level)))
    }

    pub fn meets(&self, level: Severity, score: i64) -> bool {
        score >= self.cutoff(level)
    }

    /// Compare `score` against every level in ascending order.
    pub fn evaluate(&self, score: i64) -> ThresholdEvaluation {
        let mut highest_met = Severity::Low;
        let mut comparisons = Vec::with_capacity(3);

        for (level, cutoff) in self.levels() {
            let met = score >= cutoff;
            if met {
                highest_met = level;
            }
            comparisons.push(ThresholdComparison {
                threshold: level,
                cutoff,
                met,
            });
        }

        ThresholdEvaluation {
            score,
            comparisons,
            highest_met,
        }
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// A questionnaire: its prompts and its cutoffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentDefinition {
    /// Display name (e.g., "PHQ-9")
    pub name: String,

    /// Prompts in presentation order
    pub questions: Vec<String>,

    #[serde(default)]
    pub thresholds: ThresholdTable,
}

/// The two instruments routing depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruments {
    pub phq9: InstrumentDefinition,
    pub gad7: InstrumentDefinition,
}

impl Instruments {
    pub fn get(&self, id: InstrumentId) -> &InstrumentDefinition {
        match id {
            InstrumentId::Phq9 => &self.phq9,
            InstrumentId::Gad7 => &self.gad7,
        }
    }

    /// Resolve an instrument by (case-insensitive) name.
    pub fn lookup(&self, name: &str) -> Result<(InstrumentId, &InstrumentDefinition), TriageError> {
        let id: InstrumentId = name.parse()?;
        Ok((id, self.get(id)))
    }
}

impl Default for Instruments {
    fn default() -> Self {
        Self {
            phq9: InstrumentDefinition {
                name: "PHQ-9".to_string(),
                questions: PHQ9_QUESTIONS.iter().map(|q| q.to_string()).collect(),
                thresholds: ThresholdTable::STANDARD,
            },
            gad7: InstrumentDefinition {
                name: "GAD-7".to_string(),
                questions: GAD7_QUESTIONS.iter().map(|q| q.to_string()).collect(),
                thresholds: ThresholdTable::STANDARD,
            },
        }
    }
}

const PHQ9_QUESTIONS: [&str; 9] = [
    "Little interest or pleasure in doing things",
    "Feeling down, depressed, or hopeless",
    "Trouble falling or staying asleep, or sleeping too much",
    "Feeling tired or having little energy",
    "Poor appetite or overeating",
    "Feeling bad about yourself — or that you are a failure or have let yourself or your family down",
    "Trouble concentrating on things, such as reading the newspaper or watching television",
    "Moving or speaking so slowly that other people could have noticed? Or the opposite — being so fidgety or restless that you have been moving around a lot more than usual",
    "Thoughts that you would be better off dead or of hurting yourself in some way",
];

const GAD7_QUESTIONS: [&str; 7] = [
    "Feeling nervous, anxious, or on edge",
    "Not being able to stop or control worrying",
    "Worrying too much about different things",
    "Trouble relaxing",
    "Being so restless that it is hard to sit still",
    "Becoming easily annoyed or irritable",
    "Feeling afraid as if something awful might happen",
];

/// Valid per-item score range (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemScoreRange {
    pub min: i64,
    pub max: i64,
}

impl ItemScoreRange {
    pub fn contains(&self, score: i64) -> bool {
        (self.min..=self.max).contains(&score)
    }
}

impl Default for ItemScoreRange {
    /// 4-point Likert: 0..=3.
    fn default() -> Self {
        Self { min: 0, max: 3 }
    }
}

/// The next unanswered question of an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextQuestion {
    pub questionnaire: InstrumentId,
    pub question_index: usize,
    pub question: String,
}

/// Sum item responses into an instrument total.
///
/// Items are not range-checked here. The sum saturates at the `i64` bounds
/// instead of wrapping, so an oversized total still classifies as high.
pub fn score(responses: &[i64]) -> i64 {
    responses.iter().copied().fold(0i64, i64::saturating_add)
}

/// Bucket severity for a pair of totals.
///
/// Either instrument reaching a level is enough: high wins over moderate,
/// moderate over low.
pub fn classify(
    phq9_total: i64,
    gad7_total: i64,
    phq9: &ThresholdTable,
    gad7: &ThresholdTable,
) -> Severity {
    if phq9.meets(Severity::High, phq9_total) || gad7.meets(Severity::High, gad7_total) {
        Severity::High
    } else if phq9.meets(Severity::Moderate, phq9_total)
        || gad7.meets(Severity::Moderate, gad7_total)
    {
        Severity::Moderate
    } else {
        Severity::Low
    }
}

/// Per-instrument totals over every recorded response.
///
/// Responses for other instruments are ignored; repeated answers at the same
/// index are counted as recorded.
pub fn totals(responses: &[ScoreResponse]) -> ScoreTotals {
    let mut totals = ScoreTotals::default();
    for response in responses {
        match response.instrument.parse::<InstrumentId>() {
            Ok(InstrumentId::Phq9) => totals.phq9 = totals.phq9.saturating_add(response.score),
            Ok(InstrumentId::Gad7) => totals.gad7 = totals.gad7.saturating_add(response.score),
            Err(_) => {}
        }
    }
    totals
}

/// First question of `id` with no recorded answer at its index.
pub fn next_question(
    id: InstrumentId,
    definition: &InstrumentDefinition,
    answered: &[ScoreResponse],
) -> Option<NextQuestion> {
    let is_answered = |index: usize| {
        answered.iter().any(|r| {
            r.question_index == index && r.instrument.parse::<InstrumentId>().ok() == Some(id)
        })
    };

    definition
        .questions
        .iter()
        .enumerate()
        .find(|(index, _)| !is_answered(*index))
        .map(|(index, question)| NextQuestion {
            questionnaire: id,
            question_index: index,
            question: question.clone(),
        })
}

/// Check a single answer against the instrument and item range.
pub fn validate_answer(
    instruments: &Instruments,
    range: &ItemScoreRange,
    response: &ScoreResponse,
) -> Result<(), AnswerError> {
    let (_, definition) = instruments
        .lookup(&response.instrument)
        .map_err(|_| AnswerError::UnknownInstrument(response.instrument.clone()))?;

    if response.question_index >= definition.questions.len() {
        return Err(AnswerError::IndexOutOfRange {
            index: response.question_index,
            len: definition.questions.len(),
        });
    }

    if !range.contains(response.score) {
        return Err(AnswerError::ScoreOutOfRange {
            score: response.score,
            min: range.min,
            max: range.max,
        });
    }

    Ok(())
}
