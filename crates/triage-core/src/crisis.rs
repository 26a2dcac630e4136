//! Crisis phrase detection and the crisis response message.
//!
//! Matching is broad: the input is lower-cased and every pattern is searched
//! anywhere in it, not on token boundaries. Lower-casing Turkish `İ` yields
//! `i` plus a combining dot (U+0307); the dot is dropped so `İNTİHAR` reads
//! as `intihar`.
//!
//! Phrases are data. The built-in [`PatternSet`] covers English and Turkish;
//! new phrases or languages are added through configuration, not code.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::resources::CountryResource;

/// First line of every crisis message.
pub const DISCLAIMER: &str = "Not a medical professional. Not a diagnosis. If you are in immediate danger call local emergency services.";

const DETECTED_NOTICE: &str =
    "We detected language about being unsafe. Please contact emergency services immediately.";

const TRUSTED_PERSON: &str = "You can also reach out to someone you trust nearby right now.";

/// Built-in phrases: (id, language, pattern).
const BUILTIN_PHRASES: &[(&str, &str, &str)] = &[
    ("EN1", "en", r"suicide"),
    ("EN2", "en", r"kill myself"),
    ("EN3", "en", r"hurt myself"),
    ("EN4", "en", r"end my life"),
    ("TR1", "tr", r"kendime zarar"),
    ("TR2", "tr", r"intihar"),
    ("TR3", "tr", r"ölmek istiyorum"),
    ("TR4", "tr", r"kendimi öldürmek"),
];

const BUILTIN_VERSION: &str = "1";

const COMBINING_DOT_ABOVE: char = '\u{0307}';

/// A single crisis phrase as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisPhrase {
    /// Stable identifier used in logs (e.g., "EN1")
    pub id: String,

    /// Language tag (e.g., "en", "tr")
    pub language: String,

    /// Regex searched against the lower-cased input
    pub pattern: String,
}

/// A versioned list of crisis phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSet {
    pub version: String,
    pub phrases: Vec<CrisisPhrase>,
}

impl PatternSet {
    /// The English + Turkish phrase list shipped with the engine.
    pub fn builtin() -> Self {
        Self {
            version: BUILTIN_VERSION.to_string(),
            phrases: BUILTIN_PHRASES
                .iter()
                .map(|(id, language, pattern)| CrisisPhrase {
                    id: id.to_string(),
                    language: language.to_string(),
                    pattern: pattern.to_string(),
                })
                .collect(),
        }
    }

    /// Languages covered, in first-seen order.
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = Vec::new();
        for phrase in &self.phrases {
            if !languages.contains(&phrase.language.as_str()) {
                languages.push(&phrase.language);
            }
        }
        languages
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Which phrase fired. Never carries the user's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrisisMatch {
    pub phrase_id: String,
    pub language: String,
}

struct CompiledPhrase {
    id: String,
    language: String,
    regex: Regex,
}

/// Compiled crisis detector. Immutable once built.
pub struct CrisisDetector {
    version: String,
    phrases: Vec<CompiledPhrase>,
}

impl CrisisDetector {
    /// Compile every phrase in the set.
    pub fn new(set: &PatternSet) -> Result<Self, ConfigError> {
        let phrases = set
            .phrases
            .iter()
            .map(|phrase| {
                let regex = RegexBuilder::new(&phrase.pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ConfigError::InvalidPattern {
                        id: phrase.id.clone(),
                        source,
                    })?;

                Ok(CompiledPhrase {
                    id: phrase.id.clone(),
                    language: phrase.language.clone(),
                    regex,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            version: set.version.clone(),
            phrases,
        })
    }

    /// Version of the pattern set this detector was built from.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// True if any phrase matches.
    pub fn detect(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    /// The first phrase (in configured order) found in `text`.
    pub fn first_match(&self, text: &str) -> Option<CrisisMatch> {
        let normalized = normalize(text);

        let phrase = self.phrases.iter().find(|p| p.regex.is_match(&normalized))?;

        tracing::warn!(
            phrase_id = %phrase.id,
            language = %phrase.language,
            pattern_set = %self.version,
            "Crisis language detected"
        );

        Some(CrisisMatch {
            phrase_id: phrase.id.clone(),
            language: phrase.language.clone(),
        })
    }
}

/// Lower-case `text` and drop the combining dot left behind by `İ`.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| *c != COMBINING_DOT_ABOVE)
        .collect()
}

impl std::fmt::Debug for CrisisDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrisisDetector")
            .field("version", &self.version)
            .field("phrases", &self.phrases.len())
            .finish()
    }
}

/// Build the plain-text crisis message for a resource record.
///
/// Line order is fixed: disclaimer, detection notice, emergency number,
/// hotlines (only when there are any), then the trusted-person suggestion.
pub fn format_crisis_response(resource: &CountryResource) -> String {
    let mut lines = vec![
        DISCLAIMER.to_string(),
        DETECTED_NOTICE.to_string(),
        format!("Emergency number: {}", resource.emergency_number()),
    ];

    if !resource.crisis_lines.is_empty() {
        lines.push("Crisis hotlines:".to_string());
        lines.extend(resource.crisis_lines.iter().map(|line| format!("- {}", line)));
    }

    lines.push(TRUSTED_PERSON.to_string());
    lines.join("\n")
}
